//! Core types for circuit representation.

use std::fmt;

/// A node in the circuit, identified by a caller-chosen string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Stable identifier used to key results
    pub id: String,
    /// Whether this node is the 0 V reference
    pub is_ground: bool,
}

impl Node {
    /// Create a new node.
    pub fn new(id: impl Into<String>, is_ground: bool) -> Self {
        Self {
            id: id.into(),
            is_ground,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ground {
            write!(f, "{} (GND)", self.id)
        } else {
            write!(f, "{}", self.id)
        }
    }
}

/// A variable of the MNA solution vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unknown {
    /// Voltage of a non-ground node
    NodeVoltage(String),
    /// Branch current of a voltage source
    SourceCurrent(String),
}

impl fmt::Display for Unknown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unknown::NodeVoltage(id) => write!(f, "V({})", id),
            Unknown::SourceCurrent(id) => write!(f, "I({})", id),
        }
    }
}
