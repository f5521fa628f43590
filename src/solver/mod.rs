//! DC operating point solver.
//!
//! This module provides the numerical engine: equation assembly, the
//! layered linear solve, and translation of the solution vector back into
//! named circuit quantities.
//!
//! ## Modified Nodal Analysis
//!
//! MNA assembles a system of equations Ax = b where:
//! - x contains node voltages and voltage source branch currents
//! - A is the conductance/coefficient matrix
//! - b is the source vector
//!
//! The matrix structure is:
//! ```text
//! [ G   B ] [ v ]   [ 0 ]
//! [ Bᵀ  0 ] [ j ] = [ e ]
//! ```
//!
//! where:
//! - G is the conductance matrix (one KCL row per non-ground node)
//! - B places each source current into the KCL rows of its terminals
//! - v is the vector of node voltages
//! - j is the vector of voltage source currents
//! - e is the vector of voltage source values
//!
//! ## Pipeline
//!
//! [`Simulator::simulate`] runs validate → [`TableauBuilder::build`] →
//! [`LinearSolver::solve`] → [`reconstruct`] → verification, returning one
//! immutable [`Solution`] or one error.

mod advisory;
mod linear;
mod mna;
mod reconstruct;
mod simulator;
mod solution;

pub use advisory::Advisory;
pub use linear::{LinearSolution, LinearSolver, SolveTier, TierOutcome};
pub use mna::{build_system, IndexMap, Tableau, TableauBuilder};
pub use reconstruct::reconstruct;
pub use simulator::{simulate, Simulator, SimulatorConfig};
pub use solution::{CheckResult, Checks, Solution};

/// Maximum residual ‖A·x − b‖ for the direct solve to be accepted.
pub const DEFAULT_RESIDUAL_TOLERANCE: f64 = 1e-6;

/// Singular values below this have their inverse treated as 0 by the
/// pseudo-inverse tier.
pub const DEFAULT_SINGULAR_VALUE_CUTOFF: f64 = 1e-10;

/// Diagonal shift applied to a rank-deficient matrix before the recheck.
pub const DEFAULT_REGULARIZATION: f64 = 1e-10;

/// Upper bound on the number of unknowns accepted by the builder.
pub const DEFAULT_MAX_UNKNOWNS: usize = 4096;

/// Iteration cap for SVD decompositions (0 means unlimited).
pub const DEFAULT_MAX_SVD_ITERATIONS: usize = 1000;
