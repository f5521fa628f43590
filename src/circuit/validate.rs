//! Circuit validation.

use std::collections::HashSet;

use super::Topology;
use crate::error::{DcopError, Result};

/// Pre-solve check that rejects structurally invalid topologies.
///
/// Errors returned from [`Validator::validate`] reach the caller of the
/// simulator unchanged.
pub trait Validator {
    /// Validate a topology for simulation.
    fn validate(&self, topology: &Topology) -> Result<()>;
}

impl<F> Validator for F
where
    F: Fn(&Topology) -> Result<()>,
{
    fn validate(&self, topology: &Topology) -> Result<()> {
        self(topology)
    }
}

/// Default validator.
///
/// Checks:
/// - At most one ground node
/// - No duplicate component ids
/// - No component has both terminals on the same node
///
/// A missing ground, an empty circuit and dangling terminals are left to the
/// tableau builder, which reports them as [`TopologyError`]s.
///
/// [`TopologyError`]: crate::error::TopologyError
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl Validator for StructuralValidator {
    fn validate(&self, topology: &Topology) -> Result<()> {
        let grounds: Vec<&str> = topology
            .nodes()
            .iter()
            .filter(|n| n.is_ground)
            .map(|n| n.id.as_str())
            .collect();

        if grounds.len() > 1 {
            return Err(DcopError::validation(format!(
                "the circuit has more than one ground node: {}",
                grounds.join(", ")
            )));
        }

        let mut seen = HashSet::new();
        for component in topology.components() {
            if !seen.insert(component.id()) {
                return Err(DcopError::validation(format!(
                    "duplicate component id '{}'",
                    component.id()
                )));
            }

            let [n1, n2] = component.nodes();
            if n1 == n2 {
                return Err(DcopError::validation(format!(
                    "both terminals of '{}' are connected to node '{}'",
                    component.id(),
                    n1
                )));
            }
        }

        Ok(())
    }
}
