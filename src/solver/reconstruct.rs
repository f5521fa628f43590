//! Translation of the raw solution vector into named quantities.

use std::collections::BTreeMap;

use nalgebra::DVector;

use super::mna::IndexMap;
use super::solution::Solution;
use crate::components::Component;

/// Map a solved vector back to node voltages and branch currents.
///
/// # Panics
///
/// Panics if `x` does not have one entry per unknown in `index_map`.
pub fn reconstruct(index_map: &IndexMap, x: &DVector<f64>) -> Solution {
    assert_eq!(
        x.len(),
        index_map.dimension(),
        "solution vector does not match the index map"
    );

    let mut voltages = BTreeMap::new();
    for id in index_map.ground_nodes() {
        voltages.insert(id.clone(), 0.0);
    }
    for (id, row) in index_map.nodes() {
        voltages.insert(id.to_string(), x[row]);
    }

    let voltage = |id: &str| voltages.get(id).copied().unwrap_or(0.0);

    let mut currents = BTreeMap::new();
    for component in index_map.components() {
        match component {
            Component::Resistor(r) => {
                let i = r.current(voltage(&r.nodes[0]), voltage(&r.nodes[1]));
                currents.insert(r.id.clone(), i);
            }
            Component::VoltageSource(vs) => {
                let i = index_map.source_row(&vs.id).map_or(0.0, |row| x[row]);
                currents.insert(vs.id.clone(), i);
            }
            // Not modelled, so no current to report
            Component::IdealDiode(_) => {}
        }
    }

    Solution::new(voltages, currents)
}
