//! WASM bindings for the DC solver.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmDcSolver } from 'dcop_core';
//!
//! await init();
//!
//! const solver = new WasmDcSolver(`
//!   V1 in 0 DC 12
//!   R1 in mid 1k
//!   R2 mid 0 2k
//! `);
//!
//! solver.node_voltage("mid"); // 8.0
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::Topology;
use crate::dsl;
use crate::solver::{simulate, Solution};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Solved operating point of a netlist.
#[wasm_bindgen]
pub struct WasmDcSolver {
    solution: Solution,
}

#[wasm_bindgen]
impl WasmDcSolver {
    /// Parse `netlist` and solve it with the default simulator.
    ///
    /// Throws the error message if the netlist is invalid or unsolvable.
    #[wasm_bindgen(constructor)]
    pub fn new(netlist: &str) -> Result<WasmDcSolver, JsValue> {
        let ast = dsl::parse(netlist).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let topology = Topology::from_ast(ast).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let solution = simulate(&topology).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { solution })
    }

    /// Voltage of a node, or `undefined` if there is no such node.
    #[wasm_bindgen]
    pub fn node_voltage(&self, node: &str) -> Option<f64> {
        self.solution.voltage(node)
    }

    /// Current through a component, or `undefined` if none is reported.
    #[wasm_bindgen]
    pub fn branch_current(&self, component: &str) -> Option<f64> {
        self.solution.current(component)
    }

    /// Node ids in sorted order.
    #[wasm_bindgen]
    pub fn nodes(&self) -> Vec<String> {
        self.solution.node_voltages().keys().cloned().collect()
    }

    #[wasm_bindgen]
    pub fn checks_passed(&self) -> bool {
        self.solution.checks_passed()
    }

    /// Advisory messages raised while solving.
    #[wasm_bindgen]
    pub fn advisories(&self) -> Vec<String> {
        self.solution
            .advisories()
            .iter()
            .map(|a| a.to_string())
            .collect()
    }
}
