//! Post-solve verification of Kirchhoff's laws.

use std::collections::BTreeMap;

use crate::circuit::Topology;
use crate::components::Component;
use crate::error::{DcopError, Result};
use crate::solver::{CheckResult, Checks, Solution};

/// Default absolute tolerance for law checks (amperes for KCL, volts for KVL).
pub const DEFAULT_CHECK_TOLERANCE: f64 = 1e-6;

/// Verifies a computed solution against circuit laws.
///
/// Failures are not fatal to a simulation: the simulator logs them and
/// returns the solution with an empty checks mapping.
pub trait LawChecker {
    /// Run every check, keyed by law name and then by item id.
    fn run_checks(&self, topology: &Topology, solution: &Solution) -> Result<Checks>;
}

impl<F> LawChecker for F
where
    F: Fn(&Topology, &Solution) -> Result<Checks>,
{
    fn run_checks(&self, topology: &Topology, solution: &Solution) -> Result<Checks> {
        self(topology, solution)
    }
}

/// Checks KCL at every non-ground node and KVL across every voltage source.
#[derive(Debug, Clone, Copy)]
pub struct KirchhoffChecker {
    pub tolerance: f64,
}

impl Default for KirchhoffChecker {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_CHECK_TOLERANCE,
        }
    }
}

impl KirchhoffChecker {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    fn verdict(&self, error: f64, detail: String) -> CheckResult {
        if error.abs() <= self.tolerance {
            CheckResult::pass(detail)
        } else {
            CheckResult::fail(detail)
        }
    }
}

impl LawChecker for KirchhoffChecker {
    fn run_checks(&self, topology: &Topology, solution: &Solution) -> Result<Checks> {
        let voltage = |id: &str| {
            solution
                .voltage(id)
                .ok_or_else(|| DcopError::Verification {
                    message: format!("no voltage for node '{}'", id),
                })
        };
        let current = |id: &str| {
            solution
                .current(id)
                .ok_or_else(|| DcopError::Verification {
                    message: format!("no current for component '{}'", id),
                })
        };

        // Net current leaving each node
        let mut leaving: BTreeMap<&str, f64> = topology
            .nodes()
            .iter()
            .filter(|n| !n.is_ground)
            .map(|n| (n.id.as_str(), 0.0))
            .collect();

        let mut kvl = BTreeMap::new();
        for component in topology.components() {
            let [n1, n2] = component.nodes();
            let i = match component {
                Component::Resistor(r) => current(&r.id)?,
                Component::VoltageSource(vs) => {
                    let error = voltage(vs.positive())? - voltage(vs.negative())? - vs.voltage;
                    kvl.insert(
                        vs.id.clone(),
                        self.verdict(error, format!("loop error {:.3e} V", error)),
                    );
                    current(&vs.id)?
                }
                Component::IdealDiode(_) => continue,
            };

            if let Some(sum) = leaving.get_mut(n1) {
                *sum += i;
            }
            if let Some(sum) = leaving.get_mut(n2) {
                *sum -= i;
            }
        }

        let kcl = leaving
            .into_iter()
            .map(|(node, sum)| {
                let result = self.verdict(sum, format!("net current {:.3e} A", sum));
                (node.to_string(), result)
            })
            .collect();

        let mut checks = Checks::new();
        checks.insert("KCL".to_string(), kcl);
        checks.insert("KVL".to_string(), kvl);
        Ok(checks)
    }
}
