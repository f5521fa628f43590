//! dcop - DC operating point solver
//!
//! Reads a netlist, solves for the DC operating point and prints node
//! voltages, branch currents and the Kirchhoff checks.
//!
//! # Usage
//!
//! ```bash
//! dcop divider.cir
//! dcop --log-level debug --residual-tolerance 1e-9 divider.cir
//! ```

use std::path::PathBuf;

use clap::Parser;
use dcop_core::{
    circuit::Topology,
    dsl,
    error::Result,
    solver::{Simulator, SimulatorConfig, Solution, DEFAULT_RESIDUAL_TOLERANCE},
};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// DC operating point solver for linear resistive circuits
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the netlist file
    #[arg(value_name = "CIRCUIT_FILE")]
    circuit_file: PathBuf,

    /// Set the logging level
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,

    /// Skip the Kirchhoff law checks
    #[arg(long)]
    no_checks: bool,

    /// Maximum residual accepted from the direct solve
    #[arg(long, default_value_t = DEFAULT_RESIDUAL_TOLERANCE)]
    residual_tolerance: f64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: could not install log subscriber: {}", e);
    }

    let ast = dsl::parse_file(&args.circuit_file)?;
    let topology = Topology::from_ast(ast)?;
    info!(
        file = %args.circuit_file.display(),
        nodes = topology.num_nodes(),
        components = topology.components().len(),
        "netlist loaded"
    );

    let config = SimulatorConfig::new().with_residual_tolerance(args.residual_tolerance);
    let mut simulator = Simulator::with_config(config);
    if args.no_checks {
        simulator = simulator.without_checks();
    }

    let solution = simulator.simulate(&topology)?;
    print_solution(&solution);

    Ok(())
}

fn print_solution(solution: &Solution) {
    println!("Node voltages:");
    for (node, v) in solution.node_voltages() {
        println!("  V({}) = {:.6} V", node, v);
    }

    println!("Branch currents:");
    for (component, i) in solution.branch_currents() {
        println!("  I({}) = {:.6e} A", component, i);
    }

    if !solution.checks().is_empty() {
        println!("Checks:");
        for (law, items) in solution.checks() {
            for (item, result) in items {
                let status = if result.ok { "ok" } else { "FAIL" };
                println!("  {} {}: {} ({})", law, item, status, result.detail);
            }
        }
    }

    if !solution.advisories().is_empty() {
        println!("Advisories:");
        for advisory in solution.advisories() {
            println!("  {}", advisory);
        }
    }
}
