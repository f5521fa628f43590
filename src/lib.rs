//! # dcop Core
//!
//! DC operating point solver for linear resistive circuits.
//!
//! This library provides:
//! - A topology model of nodes, resistors, voltage sources and (unmodelled)
//!   ideal diodes
//! - Modified Nodal Analysis (MNA) assembly with a rank diagnostic
//! - A layered linear solver that stays usable on near-singular systems
//! - Post-solve Kirchhoff law checks
//! - A small SPICE-like netlist format
//!
//! ## Architecture
//!
//! - [`circuit`] - Topology container and pre-solve validation
//! - [`components`] - Component models
//! - [`dsl`] - Netlist parser
//! - [`solver`] - MNA assembly, linear solve and the simulator pipeline
//! - [`checks`] - Kirchhoff law verification
//!
//! ## Usage
//!
//! ```
//! use dcop_core::circuit::Topology;
//! use dcop_core::components::{Resistor, VoltageSource};
//! use dcop_core::solver::simulate;
//!
//! let mut topology = Topology::new();
//! topology.add_ground("0");
//! topology.add_node("in", false);
//! topology.add_node("mid", false);
//! topology.add_component(VoltageSource::new("V1", "in", "0", 12.0));
//! topology.add_component(Resistor::new("R1", "in", "mid", 1000.0));
//! topology.add_component(Resistor::new("R2", "mid", "0", 2000.0));
//!
//! let solution = simulate(&topology).unwrap();
//! assert!((solution.voltage("mid").unwrap() - 8.0).abs() < 1e-6);
//! ```
//!
//! ### Native CLI
//!
//! ```bash
//! dcop divider.cir
//! ```

pub mod checks;
pub mod circuit;
pub mod components;
pub mod dsl;
pub mod error;
pub mod solver;

// Re-export main types for convenience
pub use checks::{KirchhoffChecker, LawChecker};
pub use circuit::{StructuralValidator, Topology, Validator};
pub use error::{DcopError, Result, TopologyError};
pub use solver::{simulate, Simulator, SimulatorConfig, Solution};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmDcSolver;
