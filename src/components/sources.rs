//! Independent voltage sources.

/// A voltage source component.
///
/// Voltage sources require an extra row/column in the MNA matrix for the
/// branch current. The source enforces: V+ - V- = voltage
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageSource {
    pub id: String,
    pub nodes: [String; 2], // [positive, negative]
    pub voltage: f64,
}

impl VoltageSource {
    /// Create a new voltage source.
    pub fn new(
        id: impl Into<String>,
        positive: impl Into<String>,
        negative: impl Into<String>,
        voltage: f64,
    ) -> Self {
        Self {
            id: id.into(),
            nodes: [positive.into(), negative.into()],
            voltage,
        }
    }

    /// Check the voltage invariant (finite).
    pub fn is_valid(&self) -> bool {
        self.voltage.is_finite()
    }

    /// Positive terminal.
    pub fn positive(&self) -> &str {
        &self.nodes[0]
    }

    /// Negative terminal.
    pub fn negative(&self) -> &str {
        &self.nodes[1]
    }
}
