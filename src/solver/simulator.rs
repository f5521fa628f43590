//! Main simulator interface.

use tracing::{debug, warn};

use crate::checks::{KirchhoffChecker, LawChecker};
use crate::circuit::{StructuralValidator, Topology, Validator};
use crate::error::{DcopError, Result};

use super::linear::LinearSolver;
use super::mna::TableauBuilder;
use super::reconstruct::reconstruct;
use super::solution::{Checks, Solution};
use super::{
    DEFAULT_MAX_SVD_ITERATIONS, DEFAULT_MAX_UNKNOWNS, DEFAULT_REGULARIZATION,
    DEFAULT_RESIDUAL_TOLERANCE, DEFAULT_SINGULAR_VALUE_CUTOFF,
};

/// Configuration for the simulator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Maximum residual accepted from the direct solve.
    pub residual_tolerance: f64,
    /// Singular values below this are dropped by the pseudo-inverse.
    pub singular_value_cutoff: f64,
    /// Diagonal shift tried on a rank-deficient matrix.
    pub regularization: f64,
    /// Largest number of unknowns the builder accepts.
    pub max_unknowns: usize,
    /// Iteration cap for SVD decompositions (0 means unlimited).
    pub max_svd_iterations: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            residual_tolerance: DEFAULT_RESIDUAL_TOLERANCE,
            singular_value_cutoff: DEFAULT_SINGULAR_VALUE_CUTOFF,
            regularization: DEFAULT_REGULARIZATION,
            max_unknowns: DEFAULT_MAX_UNKNOWNS,
            max_svd_iterations: DEFAULT_MAX_SVD_ITERATIONS,
        }
    }
}

impl SimulatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the residual tolerance of the direct solve.
    ///
    /// Lowering it makes the solver fall back to least squares more often;
    /// 0.0 rejects every direct solution.
    pub fn with_residual_tolerance(mut self, tolerance: f64) -> Self {
        self.residual_tolerance = tolerance;
        self
    }

    pub fn with_singular_value_cutoff(mut self, cutoff: f64) -> Self {
        self.singular_value_cutoff = cutoff;
        self
    }

    pub fn with_regularization(mut self, epsilon: f64) -> Self {
        self.regularization = epsilon;
        self
    }

    pub fn with_max_unknowns(mut self, limit: usize) -> Self {
        self.max_unknowns = limit;
        self
    }

    pub fn with_max_svd_iterations(mut self, iterations: usize) -> Self {
        self.max_svd_iterations = iterations;
        self
    }
}

/// Runs the DC operating point pipeline on a topology.
///
/// Stages, each gating the next:
///
/// 1. validate (the configured [`Validator`], errors returned unchanged)
/// 2. build the MNA system ([`DcopError::Assembly`] on failure)
/// 3. solve it ([`DcopError::Solve`] on failure)
/// 4. reconstruct named voltages and currents
/// 5. verify (the configured [`LawChecker`]; failures are logged and
///    leave the checks empty)
///
/// Any error whose message mentions singularity is reported as
/// [`DcopError::SingularCircuit`]. The simulator keeps no state between
/// calls, so repeated runs on the same topology return equal solutions.
pub struct Simulator {
    config: SimulatorConfig,
    validator: Box<dyn Validator>,
    checker: Option<Box<dyn LawChecker>>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::with_config(SimulatorConfig::default())
    }
}

impl Simulator {
    /// Create a simulator with the default configuration and collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a simulator with a custom configuration.
    pub fn with_config(config: SimulatorConfig) -> Self {
        Self {
            config,
            validator: Box::new(StructuralValidator),
            checker: Some(Box::new(KirchhoffChecker::default())),
        }
    }

    /// Replace the pre-solve validator.
    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Replace the post-solve law checker.
    pub fn with_checker(mut self, checker: impl LawChecker + 'static) -> Self {
        self.checker = Some(Box::new(checker));
        self
    }

    /// Skip law verification entirely.
    pub fn without_checks(mut self) -> Self {
        self.checker = None;
        self
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Compute the DC operating point of `topology`.
    pub fn simulate(&self, topology: &Topology) -> Result<Solution> {
        self.run(topology).map_err(DcopError::normalize)
    }

    fn run(&self, topology: &Topology) -> Result<Solution> {
        debug!(
            nodes = topology.num_nodes(),
            components = topology.components().len(),
            "validating topology"
        );
        self.validator.validate(topology)?;

        let tableau = TableauBuilder::with_config(&self.config)
            .build(topology)
            .map_err(DcopError::assembly)?;
        debug!(size = tableau.size(), "system assembled");

        let linear = LinearSolver::with_config(&self.config)
            .solve_regularized(&tableau.matrix, &tableau.rhs, tableau.regularization)
            .map_err(DcopError::solve)?;
        debug!(tier = %linear.tier, "system solved");

        let mut advisories = tableau.advisories;
        advisories.extend(linear.advisories);
        for advisory in &advisories {
            warn!(%advisory, "solver advisory");
        }

        let solution = reconstruct(&tableau.index_map, &linear.x)
            .with_advisories(advisories)
            .with_tier(linear.tier);

        let checks = match &self.checker {
            Some(checker) => match checker.run_checks(topology, &solution) {
                Ok(checks) => checks,
                Err(e) => {
                    warn!(error = %e, "verification failed, returning solution without checks");
                    Checks::new()
                }
            },
            None => Checks::new(),
        };

        Ok(solution.with_checks(checks))
    }
}

/// Compute the DC operating point with the default simulator.
pub fn simulate(topology: &Topology) -> Result<Solution> {
    Simulator::new().simulate(topology)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{DiodePolarity, IdealDiode, Resistor, VoltageSource};
    use crate::error::TopologyError;
    use crate::solver::{Advisory, SolveTier};
    use approx::assert_relative_eq;

    fn single_loop() -> Topology {
        let mut topology = Topology::new();
        topology.add_node("G", true);
        topology.add_node("N1", false);
        topology.add_component(Resistor::new("R1", "N1", "G", 1000.0));
        topology.add_component(VoltageSource::new("V1", "N1", "G", 5.0));
        topology
    }

    fn divider() -> Topology {
        let mut topology = Topology::new();
        topology.add_ground("0");
        topology.add_node("in", false);
        topology.add_node("mid", false);
        topology.add_component(VoltageSource::new("V1", "in", "0", 12.0));
        topology.add_component(Resistor::new("R1", "in", "mid", 1000.0));
        topology.add_component(Resistor::new("R2", "mid", "0", 2000.0));
        topology
    }

    #[test]
    fn test_single_loop() {
        let solution = simulate(&single_loop()).unwrap();

        assert_relative_eq!(solution.voltage("N1").unwrap(), 5.0, epsilon = 1e-9);
        assert_eq!(solution.voltage("G"), Some(0.0));
        assert_relative_eq!(solution.current("R1").unwrap(), 0.005, epsilon = 1e-12);
        assert_relative_eq!(solution.current("V1").unwrap(), -0.005, epsilon = 1e-12);
        assert_eq!(solution.tier(), Some(SolveTier::Direct));
        assert!(solution.advisories().is_empty());
    }

    #[test]
    fn test_series_divider() {
        let solution = simulate(&divider()).unwrap();
        let expected = 12.0 * 2000.0 / (1000.0 + 2000.0);
        assert!((solution.voltage("mid").unwrap() - expected).abs() < 1e-6);
        assert_relative_eq!(solution.voltage("in").unwrap(), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_checks_are_populated() {
        let solution = simulate(&divider()).unwrap();
        assert!(solution.checks().contains_key("KCL"));
        assert!(solution.checks().contains_key("KVL"));
        assert!(solution.checks_passed());
    }

    #[test]
    fn test_missing_ground_is_topology_error() {
        let mut topology = Topology::new();
        topology.add_node("N1", false);
        topology.add_node("N2", false);
        topology.add_component(Resistor::new("R1", "N1", "N2", 1000.0));
        topology.add_component(VoltageSource::new("V1", "N1", "N2", 5.0));

        let err = simulate(&topology).unwrap_err();
        assert!(matches!(err, DcopError::Assembly { .. }));
        assert!(matches!(
            err.root(),
            DcopError::Topology(TopologyError::MissingGround)
        ));
    }

    #[test]
    fn test_zero_components_is_topology_error() {
        let mut topology = Topology::new();
        topology.add_ground("0");
        topology.add_node("N1", false);

        let err = simulate(&topology).unwrap_err();
        assert!(matches!(
            err.root(),
            DcopError::Topology(TopologyError::NoUnknowns)
        ));
    }

    #[test]
    fn test_conflicting_sources_are_not_accepted_directly() {
        let mut topology = single_loop();
        topology.add_component(VoltageSource::new("V2", "N1", "G", 3.0));

        let solution = simulate(&topology).unwrap();
        assert_eq!(solution.tier(), Some(SolveTier::LeastSquares));
        assert!(matches!(
            solution.advisories()[0],
            Advisory::Regularized { rank: 2, dimension: 3, .. }
        ));
        assert!(solution.advisories().iter().any(|a| matches!(
            a,
            Advisory::ResidualTooHigh {
                tier: SolveTier::Direct,
                ..
            }
        )));
        // Neither source sees its own voltage
        assert!(!solution.checks()["KVL"]["V1"].ok);
        assert!(!solution.checks()["KVL"]["V2"].ok);
    }

    #[test]
    fn test_conflicting_sources_without_regularization_are_singular() {
        let mut topology = single_loop();
        topology.add_component(VoltageSource::new("V2", "N1", "G", 3.0));

        let config = SimulatorConfig::new().with_regularization(0.0);
        let err = Simulator::with_config(config).simulate(&topology).unwrap_err();
        assert!(matches!(err, DcopError::SingularCircuit));
        assert!(err.to_string().contains("floating nodes"));
    }

    #[test]
    fn test_floating_node_is_regularized() {
        let mut topology = divider();
        topology.add_node("x", false);
        topology.add_node("y", false);
        topology.add_component(Resistor::new("R3", "x", "y", 10.0));

        let solution = simulate(&topology).unwrap();
        assert_eq!(solution.tier(), Some(SolveTier::Direct));
        assert!((solution.voltage("mid").unwrap() - 8.0).abs() < 1e-6);
        assert_relative_eq!(solution.voltage("x").unwrap(), 0.0);
        assert!(matches!(
            solution.advisories(),
            [Advisory::Regularized { rank: 4, dimension: 5, .. }]
        ));
    }

    #[test]
    fn test_ill_conditioned_divider_is_solved() {
        let mut topology = Topology::new();
        topology.add_ground("0");
        topology.add_node("a", false);
        topology.add_node("b", false);
        topology.add_component(VoltageSource::new("V1", "a", "0", 1.0));
        topology.add_component(Resistor::new("R1", "a", "b", 1e18));
        topology.add_component(Resistor::new("R2", "b", "0", 1e18));

        let solution = Simulator::new().without_checks().simulate(&topology).unwrap();
        assert_eq!(solution.tier(), Some(SolveTier::Direct));
        assert_relative_eq!(solution.voltage("a").unwrap(), 1.0, epsilon = 1e-9);
        assert!(matches!(
            solution.advisories(),
            [Advisory::Regularized { .. }]
        ));
    }

    #[test]
    fn test_unsolvable_system_carries_guidance() {
        // Finite inputs whose solution overflows
        let mut topology = Topology::new();
        topology.add_ground("0");
        topology.add_node("a", false);
        topology.add_component(VoltageSource::new("V1", "a", "0", 1e308));
        topology.add_component(Resistor::new("R1", "a", "0", 1e-3));

        let err = simulate(&topology).unwrap_err();
        assert!(matches!(err, DcopError::Solve { .. }));
        assert!(matches!(err.root(), DcopError::UnsolvableSystem { .. }));
        let message = err.to_string();
        assert!(message.contains("design error"));
        assert!(message.contains("floating nodes"));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let topology = divider();
        let simulator = Simulator::new();
        let first = simulator.simulate(&topology).unwrap();
        let second = simulator.simulate(&topology).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_validator_error_propagates_unchanged() {
        let simulator = Simulator::new()
            .with_validator(|_: &Topology| -> Result<()> { Err(DcopError::validation("no thanks")) });

        let err = simulator.simulate(&divider()).unwrap_err();
        assert!(matches!(err, DcopError::Validation { ref message } if message == "no thanks"));
    }

    #[test]
    fn test_verification_failure_keeps_solution() {
        let simulator = Simulator::new().with_checker(
            |_: &Topology, _: &Solution| -> Result<Checks> {
                Err(DcopError::Verification {
                    message: "checker crashed".to_string(),
                })
            },
        );

        let solution = simulator.simulate(&divider()).unwrap();
        assert!(solution.checks().is_empty());
        assert!((solution.voltage("mid").unwrap() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn test_without_checks() {
        let solution = Simulator::new().without_checks().simulate(&divider()).unwrap();
        assert!(solution.checks().is_empty());
    }

    #[test]
    fn test_residual_rejection_still_solves() {
        let config = SimulatorConfig::new().with_residual_tolerance(0.0);
        let solution = Simulator::with_config(config).simulate(&divider()).unwrap();

        assert_eq!(solution.tier(), Some(SolveTier::LeastSquares));
        assert!((solution.voltage("mid").unwrap() - 8.0).abs() < 1e-6);
        assert!(solution
            .advisories()
            .iter()
            .any(|a| matches!(a, Advisory::ResidualTooHigh { .. })));
    }

    #[test]
    fn test_diode_is_reported_as_advisory() {
        let mut topology = divider();
        topology.add_component(IdealDiode::new(
            "D1",
            "mid",
            "0",
            DiodePolarity::AnodeToCathode,
        ));

        let solution = simulate(&topology).unwrap();
        assert!((solution.voltage("mid").unwrap() - 8.0).abs() < 1e-6);
        assert_eq!(solution.current("D1"), None);
        assert!(solution.advisories().contains(&Advisory::UnstampedDiode {
            component: "D1".to_string()
        }));
    }

    #[test]
    fn test_netlist_end_to_end() {
        let netlist = "# divider\nV1 in GND DC 12\nR1 in mid 1k\nR2 mid 0 2k\n";
        let topology = Topology::from_ast(crate::dsl::parse(netlist).unwrap()).unwrap();

        let solution = simulate(&topology).unwrap();
        assert!((solution.voltage("mid").unwrap() - 8.0).abs() < 1e-6);
        assert_relative_eq!(solution.current("R2").unwrap(), 0.004, epsilon = 1e-9);
        assert_eq!(solution.node_voltages().len(), 3);
    }

    #[test]
    fn test_size_guard() {
        let config = SimulatorConfig::new().with_max_unknowns(2);
        let err = Simulator::with_config(config).simulate(&divider()).unwrap_err();
        assert!(matches!(
            err.root(),
            DcopError::Topology(TopologyError::TooLarge { .. })
        ));
    }
}
