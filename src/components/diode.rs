//! Ideal diode placeholder.
//!
//! The diode is part of the component model so netlists that contain one
//! still load, but the tableau builder does not stamp it: a diode behaves as
//! an open circuit and its current is not reported. A piecewise-linear model
//! (assume a conduction state, solve, re-check the assumption) would stamp
//! it either as a 0 V source or as nothing.

use std::fmt;
use std::str::FromStr;

/// Conduction direction of an ideal diode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiodePolarity {
    /// Conducts from the first node (anode) to the second (cathode)
    #[default]
    AnodeToCathode,
    /// Conducts from the second node to the first
    CathodeToAnode,
}

/// Parses a polarity keyword (`A_TO_K` / `K_TO_A`, case-insensitive).
impl FromStr for DiodePolarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A_TO_K" | "AK" => Ok(Self::AnodeToCathode),
            "K_TO_A" | "KA" => Ok(Self::CathodeToAnode),
            _ => Err(format!("unknown diode polarity '{}'", s)),
        }
    }
}

impl fmt::Display for DiodePolarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiodePolarity::AnodeToCathode => write!(f, "A_TO_K"),
            DiodePolarity::CathodeToAnode => write!(f, "K_TO_A"),
        }
    }
}

/// An ideal diode component.
#[derive(Debug, Clone, PartialEq)]
pub struct IdealDiode {
    pub id: String,
    pub nodes: [String; 2], // [anode, cathode]
    pub polarity: DiodePolarity,
}

impl IdealDiode {
    /// Create a new ideal diode.
    pub fn new(
        id: impl Into<String>,
        anode: impl Into<String>,
        cathode: impl Into<String>,
        polarity: DiodePolarity,
    ) -> Self {
        Self {
            id: id.into(),
            nodes: [anode.into(), cathode.into()],
            polarity,
        }
    }
}
