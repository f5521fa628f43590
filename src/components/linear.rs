//! Linear passive components.

/// A resistor component.
///
/// The resistance is stored as given; the tableau builder rejects
/// non-positive or non-finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct Resistor {
    pub id: String,
    pub nodes: [String; 2], // [n1, n2], current is positive from n1 to n2
    pub resistance: f64,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(
        id: impl Into<String>,
        n1: impl Into<String>,
        n2: impl Into<String>,
        resistance: f64,
    ) -> Self {
        Self {
            id: id.into(),
            nodes: [n1.into(), n2.into()],
            resistance,
        }
    }

    /// Check the resistance invariant (R > 0, finite).
    pub fn is_valid(&self) -> bool {
        self.resistance.is_finite() && self.resistance > 0.0
    }

    /// Get the conductance (1/R).
    pub fn conductance(&self) -> f64 {
        1.0 / self.resistance
    }

    /// Current flowing from n1 to n2 for the given terminal voltages.
    pub fn current(&self, v1: f64, v2: f64) -> f64 {
        (v1 - v2) / self.resistance
    }
}
