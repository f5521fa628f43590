//! Simulation results.

use std::collections::BTreeMap;

use super::advisory::Advisory;
use super::linear::SolveTier;

/// Outcome of one law check on one item (a node or a loop).
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub ok: bool,
    pub detail: String,
}

impl CheckResult {
    pub fn pass(detail: impl Into<String>) -> Self {
        Self {
            ok: true,
            detail: detail.into(),
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            detail: detail.into(),
        }
    }
}

/// Law name → item id → result.
pub type Checks = BTreeMap<String, BTreeMap<String, CheckResult>>;

/// DC operating point of a circuit.
///
/// Keyed by the topology's own node and component ids. A `Solution` is
/// never modified after the simulator returns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    node_voltages: BTreeMap<String, f64>,
    branch_currents: BTreeMap<String, f64>,
    checks: Checks,
    advisories: Vec<Advisory>,
    tier: Option<SolveTier>,
}

impl Solution {
    pub(crate) fn new(
        node_voltages: BTreeMap<String, f64>,
        branch_currents: BTreeMap<String, f64>,
    ) -> Self {
        Self {
            node_voltages,
            branch_currents,
            checks: Checks::new(),
            advisories: Vec::new(),
            tier: None,
        }
    }

    pub(crate) fn with_checks(mut self, checks: Checks) -> Self {
        self.checks = checks;
        self
    }

    pub(crate) fn with_advisories(mut self, advisories: Vec<Advisory>) -> Self {
        self.advisories = advisories;
        self
    }

    pub(crate) fn with_tier(mut self, tier: SolveTier) -> Self {
        self.tier = Some(tier);
        self
    }

    /// Voltage of every node, ground included, in volts.
    pub fn node_voltages(&self) -> &BTreeMap<String, f64> {
        &self.node_voltages
    }

    /// Current through every resistor and voltage source, in amperes.
    ///
    /// Resistor currents flow from the first terminal to the second. Source
    /// currents are the MNA branch unknowns, so a source delivering power
    /// reports a negative value.
    pub fn branch_currents(&self) -> &BTreeMap<String, f64> {
        &self.branch_currents
    }

    /// Law verification results; empty when verification was skipped or failed.
    pub fn checks(&self) -> &Checks {
        &self.checks
    }

    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    /// Solver tier that produced the solution, if it came from the simulator.
    pub fn tier(&self) -> Option<SolveTier> {
        self.tier
    }

    pub fn voltage(&self, node: &str) -> Option<f64> {
        self.node_voltages.get(node).copied()
    }

    pub fn current(&self, component: &str) -> Option<f64> {
        self.branch_currents.get(component).copied()
    }

    /// True when every check that ran passed.
    pub fn checks_passed(&self) -> bool {
        self.checks
            .values()
            .flat_map(|items| items.values())
            .all(|result| result.ok)
    }
}
