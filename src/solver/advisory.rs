//! Structured diagnostics produced while building and solving.

use std::fmt;

use super::linear::SolveTier;

/// A non-fatal observation about the system or how it was solved.
///
/// Advisories are returned with the [`Solution`](super::Solution) so callers
/// can inspect them; the simulator also logs each one at warn level.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// A diode was present but contributes nothing to the matrix
    UnstampedDiode { component: String },
    /// The matrix was rank deficient and a diagonal shift made it solvable
    Regularized {
        rank: usize,
        dimension: usize,
        epsilon: f64,
    },
    /// A solver tier produced a vector that did not satisfy the system
    ResidualTooHigh {
        tier: SolveTier,
        residual: f64,
        tolerance: f64,
    },
    /// A solver tier could not produce a vector at all
    TierFailed { tier: SolveTier, cause: String },
    /// The least-squares tier found fewer independent equations than unknowns
    RankDeficient { rank: usize, dimension: usize },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::UnstampedDiode { component } => write!(
                f,
                "diode '{}' is not modelled and is treated as an open circuit",
                component
            ),
            Advisory::Regularized {
                rank,
                dimension,
                epsilon,
            } => write!(
                f,
                "rank deficient matrix ({}/{}) regularized with {:.1e} on the diagonal",
                rank, dimension, epsilon
            ),
            Advisory::ResidualTooHigh {
                tier,
                residual,
                tolerance,
            } => write!(
                f,
                "{} solve rejected: residual {:.3e} exceeds {:.1e}",
                tier, residual, tolerance
            ),
            Advisory::TierFailed { tier, cause } => write!(f, "{} solve failed: {}", tier, cause),
            Advisory::RankDeficient { rank, dimension } => {
                write!(f, "matrix is rank deficient ({}/{})", rank, dimension)
            }
        }
    }
}
