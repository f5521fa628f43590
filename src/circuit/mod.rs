//! Circuit topology representation and validation.
//!
//! This module provides the caller-facing model of a circuit: the
//! [`Topology`] container owns the [`Node`]s and the ordered list of
//! components, and is borrowed read-only for the duration of a simulation.

mod topology;
mod types;
mod validate;

pub use topology::Topology;
pub use types::*;
pub use validate::{StructuralValidator, Validator};
