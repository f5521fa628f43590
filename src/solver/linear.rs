//! Layered dense linear solver.
//!
//! Each strategy is tried in turn and its output checked before it is
//! accepted:
//!
//! 1. [`SolveTier::Direct`]: LU with partial pivoting, accepted only when
//!    the residual ‖A·x − b‖ is below the configured tolerance
//! 2. [`SolveTier::LeastSquares`]: minimum-norm SVD solve, accepted whenever
//!    it completes
//! 3. [`SolveTier::PseudoInverse`]: x = V·Σ⁺·Uᵀ·b with small singular values
//!    truncated to zero

use std::fmt;

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use super::advisory::Advisory;
use super::simulator::SimulatorConfig;
use crate::error::{DcopError, Result};

/// Strategy used to obtain a solution vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveTier {
    Direct,
    LeastSquares,
    PseudoInverse,
}

impl SolveTier {
    /// Tier to fall back to when this one does not produce a usable vector.
    pub fn next(self) -> Option<SolveTier> {
        match self {
            SolveTier::Direct => Some(SolveTier::LeastSquares),
            SolveTier::LeastSquares => Some(SolveTier::PseudoInverse),
            SolveTier::PseudoInverse => None,
        }
    }
}

impl fmt::Display for SolveTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolveTier::Direct => "direct",
            SolveTier::LeastSquares => "least-squares",
            SolveTier::PseudoInverse => "pseudo-inverse",
        };
        f.write_str(name)
    }
}

/// Result of running a single tier.
#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome {
    /// The tier produced a usable vector; `rank` is the numerical rank it saw
    Accepted { x: DVector<f64>, rank: usize },
    /// The tier produced a vector that does not satisfy the system
    Rejected { residual: f64 },
    /// The tier could not produce a vector
    Failed(String),
}

/// Solution vector together with how it was obtained.
#[derive(Debug, Clone)]
pub struct LinearSolution {
    pub x: DVector<f64>,
    pub tier: SolveTier,
    pub advisories: Vec<Advisory>,
}

/// Dense solver for the assembled MNA system.
#[derive(Debug, Clone)]
pub struct LinearSolver {
    /// Maximum residual accepted from the direct tier
    pub residual_tolerance: f64,
    /// Absolute cutoff below which the pseudo-inverse drops singular values
    pub singular_value_cutoff: f64,
    /// Iteration cap for SVD decompositions
    pub max_svd_iterations: usize,
}

impl Default for LinearSolver {
    fn default() -> Self {
        Self::with_config(&SimulatorConfig::default())
    }
}

impl LinearSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver from a simulator configuration.
    pub fn with_config(config: &SimulatorConfig) -> Self {
        Self {
            residual_tolerance: config.residual_tolerance,
            singular_value_cutoff: config.singular_value_cutoff,
            max_svd_iterations: config.max_svd_iterations,
        }
    }

    pub fn with_residual_tolerance(mut self, tolerance: f64) -> Self {
        self.residual_tolerance = tolerance;
        self
    }

    pub fn with_singular_value_cutoff(mut self, cutoff: f64) -> Self {
        self.singular_value_cutoff = cutoff;
        self
    }

    /// Solve Ax = b, escalating through the tiers until one is accepted.
    pub fn solve(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> Result<LinearSolution> {
        self.solve_regularized(a, b, 0.0)
    }

    /// Like [`solve`](Self::solve), but the direct tier factors A + shift·I.
    ///
    /// The direct residual is still measured against the unshifted A, so a
    /// shift that hides an inconsistent system gets rejected and the
    /// remaining tiers work on A itself.
    pub fn solve_regularized(
        &self,
        a: &DMatrix<f64>,
        b: &DVector<f64>,
        shift: f64,
    ) -> Result<LinearSolution> {
        let n = a.nrows();
        if a.ncols() != n {
            return Err(DcopError::DimensionMismatch {
                expected: n,
                actual: a.ncols(),
            });
        }
        if b.len() != n {
            return Err(DcopError::DimensionMismatch {
                expected: n,
                actual: b.len(),
            });
        }
        if n == 0 {
            return Err(DcopError::UnsolvableSystem {
                cause: "the system has no unknowns".to_string(),
            });
        }

        let mut advisories = Vec::new();
        let mut cause = String::new();
        let mut tier = Some(SolveTier::Direct);

        while let Some(current) = tier {
            match self.run(current, a, b, shift) {
                TierOutcome::Accepted { x, rank } => {
                    debug!(tier = %current, rank, dimension = n, "solution accepted");
                    if rank < n {
                        advisories.push(Advisory::RankDeficient { rank, dimension: n });
                    }
                    return Ok(LinearSolution {
                        x,
                        tier: current,
                        advisories,
                    });
                }
                TierOutcome::Rejected { residual } => {
                    debug!(tier = %current, residual, "solution rejected");
                    cause = format!("residual {:e} above tolerance", residual);
                    advisories.push(Advisory::ResidualTooHigh {
                        tier: current,
                        residual,
                        tolerance: self.residual_tolerance,
                    });
                }
                TierOutcome::Failed(reason) => {
                    debug!(tier = %current, %reason, "tier failed");
                    advisories.push(Advisory::TierFailed {
                        tier: current,
                        cause: reason.clone(),
                    });
                    cause = reason;
                }
            }
            tier = current.next();
        }

        Err(DcopError::UnsolvableSystem { cause })
    }

    /// Run one tier on a square system with matching right-hand side.
    pub fn attempt(&self, tier: SolveTier, a: &DMatrix<f64>, b: &DVector<f64>) -> TierOutcome {
        self.run(tier, a, b, 0.0)
    }

    fn run(&self, tier: SolveTier, a: &DMatrix<f64>, b: &DVector<f64>, shift: f64) -> TierOutcome {
        match tier {
            SolveTier::Direct => self.direct(a, b, shift),
            SolveTier::LeastSquares => self.least_squares(a, b),
            SolveTier::PseudoInverse => self.pseudo_inverse(a, b),
        }
    }

    fn direct(&self, a: &DMatrix<f64>, b: &DVector<f64>, shift: f64) -> TierOutcome {
        let mut factored = a.clone();
        for k in 0..factored.nrows() {
            factored[(k, k)] += shift;
        }
        let Some(x) = factored.lu().solve(b) else {
            return TierOutcome::Failed("LU factorization found a singular matrix".to_string());
        };

        let residual = (a * &x - b).norm();
        // NaN fails the comparison as well
        if residual < self.residual_tolerance {
            TierOutcome::Accepted { x, rank: a.nrows() }
        } else {
            TierOutcome::Rejected { residual }
        }
    }

    fn least_squares(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> TierOutcome {
        let Some(svd) = a
            .clone()
            .try_svd(true, true, f64::EPSILON, self.max_svd_iterations)
        else {
            return TierOutcome::Failed("SVD did not converge".to_string());
        };

        let sigma_max = svd.singular_values.max();
        let cutoff = f64::EPSILON * a.nrows().max(a.ncols()) as f64 * sigma_max;
        let rank = svd.rank(cutoff);

        match svd.solve(b, cutoff) {
            Ok(x) if x.iter().all(|v| v.is_finite()) => TierOutcome::Accepted { x, rank },
            Ok(_) => TierOutcome::Failed("least-squares solution is not finite".to_string()),
            Err(e) => TierOutcome::Failed(e.to_string()),
        }
    }

    fn pseudo_inverse(&self, a: &DMatrix<f64>, b: &DVector<f64>) -> TierOutcome {
        let Some(svd) = a
            .clone()
            .try_svd(true, true, f64::EPSILON, self.max_svd_iterations)
        else {
            return TierOutcome::Failed("SVD did not converge".to_string());
        };
        let (Some(u), Some(v_t)) = (svd.u, svd.v_t) else {
            return TierOutcome::Failed("SVD did not produce singular vectors".to_string());
        };

        let cutoff = self.singular_value_cutoff;
        let inverted = svd
            .singular_values
            .map(|s| if s > cutoff { 1.0 / s } else { 0.0 });
        let rank = inverted.iter().filter(|&&s| s != 0.0).count();

        let x = v_t.transpose() * DMatrix::from_diagonal(&inverted) * u.transpose() * b;
        if x.iter().all(|v| v.is_finite()) {
            TierOutcome::Accepted { x, rank }
        } else {
            TierOutcome::Failed("pseudo-inverse solution is not finite".to_string())
        }
    }
}

/// Singular values of a matrix, or `None` if the SVD does not converge.
pub(crate) fn singular_values(a: &DMatrix<f64>, max_iterations: usize) -> Option<DVector<f64>> {
    a.clone()
        .try_svd(false, false, f64::EPSILON, max_iterations)
        .map(|svd| svd.singular_values)
}

/// Number of singular values above σmax·n·ε.
pub(crate) fn numerical_rank(singular_values: &DVector<f64>, n: usize) -> usize {
    let sigma_max = singular_values.iter().cloned().fold(0.0, f64::max);
    let tolerance = sigma_max * n as f64 * f64::EPSILON;
    singular_values.iter().filter(|&&s| s > tolerance).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_direct_solve() {
        // 2x + y = 5
        // x + 3y = 10
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_vec(vec![5.0, 10.0]);

        let solution = LinearSolver::new().solve(&a, &b).unwrap();
        assert_eq!(solution.tier, SolveTier::Direct);
        assert!(solution.advisories.is_empty());
        assert_relative_eq!(solution.x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(solution.x[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_matrix_falls_back_to_least_squares() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let b = DVector::from_vec(vec![1.0, 2.0]);

        let solution = LinearSolver::new().solve(&a, &b).unwrap();
        assert_eq!(solution.tier, SolveTier::LeastSquares);
        assert_relative_eq!(solution.x[0], 0.75, epsilon = 1e-9);
        assert_relative_eq!(solution.x[1], 0.75, epsilon = 1e-9);
        assert!(solution.advisories.contains(&Advisory::RankDeficient {
            rank: 1,
            dimension: 2
        }));
        assert!(solution
            .advisories
            .iter()
            .any(|a| matches!(a, Advisory::TierFailed { tier: SolveTier::Direct, .. })));
    }

    #[test]
    fn test_residual_rejection_escalates() {
        // A zero tolerance rejects every direct solution
        let a = DMatrix::from_row_slice(1, 1, &[4.0]);
        let b = DVector::from_vec(vec![2.0]);
        let solver = LinearSolver::new().with_residual_tolerance(0.0);

        assert!(matches!(
            solver.attempt(SolveTier::Direct, &a, &b),
            TierOutcome::Rejected { .. }
        ));

        let solution = solver.solve(&a, &b).unwrap();
        assert_eq!(solution.tier, SolveTier::LeastSquares);
        assert_relative_eq!(solution.x[0], 0.5, epsilon = 1e-12);
        assert!(matches!(
            solution.advisories[0],
            Advisory::ResidualTooHigh {
                tier: SolveTier::Direct,
                ..
            }
        ));
    }

    #[test]
    fn test_pseudo_inverse_truncates_small_singular_values() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 1e-12]);
        let b = DVector::from_vec(vec![4.0, 1.0]);

        match LinearSolver::new().attempt(SolveTier::PseudoInverse, &a, &b) {
            TierOutcome::Accepted { x, rank } => {
                assert_eq!(rank, 1);
                assert_relative_eq!(x[0], 2.0, epsilon = 1e-12);
                assert_relative_eq!(x[1], 0.0);
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);

        let err = LinearSolver::new().solve(&a, &b).unwrap_err();
        assert!(matches!(
            err,
            DcopError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_tier_order() {
        assert_eq!(SolveTier::Direct.next(), Some(SolveTier::LeastSquares));
        assert_eq!(SolveTier::LeastSquares.next(), Some(SolveTier::PseudoInverse));
        assert_eq!(SolveTier::PseudoInverse.next(), None);
        assert_eq!(SolveTier::LeastSquares.to_string(), "least-squares");
    }

    #[test]
    fn test_numerical_rank() {
        let sv = DVector::from_vec(vec![3.0, 1e-3, 1e-20]);
        assert_eq!(numerical_rank(&sv, 3), 2);
        assert_eq!(numerical_rank(&DVector::from_vec(vec![1.0, 1e-10]), 2), 2);
    }

    #[test]
    fn test_every_tier_failing_is_unsolvable() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = DVector::from_vec(vec![f64::INFINITY, 1.0]);

        let err = LinearSolver::new().solve(&a, &b).unwrap_err();
        match err {
            DcopError::UnsolvableSystem { ref cause } => {
                assert_eq!(cause, "pseudo-inverse solution is not finite")
            }
            ref other => panic!("expected unsolvable system, got {:?}", other),
        }
        assert!(err.to_string().contains("design error"));
    }

    #[test]
    fn test_shift_is_accepted_for_consistent_system() {
        // Floating pair of nodes joined by 1 S, driven by nothing
        let a = DMatrix::from_row_slice(3, 3, &[1.0, 0.0, 0.0, 0.0, 1.0, -1.0, 0.0, -1.0, 1.0]);
        let b = DVector::from_vec(vec![2.0, 0.0, 0.0]);

        let solution = LinearSolver::new().solve_regularized(&a, &b, 1e-10).unwrap();
        assert_eq!(solution.tier, SolveTier::Direct);
        assert_relative_eq!(solution.x[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(solution.x[1], 0.0);
        assert_relative_eq!(solution.x[2], 0.0);
    }

    #[test]
    fn test_shift_hiding_inconsistency_is_rejected() {
        // Two sources forcing one node to 5 V and 3 V through 1 kΩ
        let a = DMatrix::from_row_slice(
            3,
            3,
            &[1e-3, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        );
        let b = DVector::from_vec(vec![0.0, 5.0, 3.0]);

        let solution = LinearSolver::new().solve_regularized(&a, &b, 1e-10).unwrap();
        assert_eq!(solution.tier, SolveTier::LeastSquares);
        assert!(matches!(
            solution.advisories[0],
            Advisory::ResidualTooHigh {
                tier: SolveTier::Direct,
                ..
            }
        ));
        assert!(solution.advisories.contains(&Advisory::RankDeficient {
            rank: 2,
            dimension: 3
        }));
    }
}
