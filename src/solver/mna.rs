//! MNA tableau assembly.

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use super::advisory::Advisory;
use super::linear::{numerical_rank, singular_values};
use super::simulator::SimulatorConfig;
use crate::circuit::{Topology, Unknown};
use crate::components::Component;
use crate::error::{DcopError, Result, TopologyError};

/// Positions of circuit quantities in the solution vector.
///
/// Node voltages occupy rows `0..num_nodes` in node insertion order; source
/// currents follow in declaration order. The map also keeps a snapshot of
/// the components so the reconstructor can derive resistor currents.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMap {
    /// Non-ground node ids, indexed by row
    node_order: Vec<String>,
    node_index: HashMap<String, usize>,
    /// Voltage source ids, indexed by `row - num_nodes`
    source_order: Vec<String>,
    source_index: HashMap<String, usize>,
    ground_nodes: Vec<String>,
    components: Vec<Component>,
}

impl IndexMap {
    fn new(topology: &Topology) -> Self {
        let mut map = IndexMap {
            node_order: Vec::new(),
            node_index: HashMap::new(),
            source_order: Vec::new(),
            source_index: HashMap::new(),
            ground_nodes: Vec::new(),
            components: topology.components().to_vec(),
        };

        for node in topology.nodes() {
            if node.is_ground {
                map.ground_nodes.push(node.id.clone());
            } else {
                map.node_index.insert(node.id.clone(), map.node_order.len());
                map.node_order.push(node.id.clone());
            }
        }

        let num_nodes = map.node_order.len();
        for component in topology.components() {
            if let Component::VoltageSource(vs) = component {
                let row = num_nodes + map.source_order.len();
                map.source_index.insert(vs.id.clone(), row);
                map.source_order.push(vs.id.clone());
            }
        }

        map
    }

    /// Total number of unknowns.
    pub fn dimension(&self) -> usize {
        self.node_order.len() + self.source_order.len()
    }

    /// Number of node voltage unknowns.
    pub fn num_nodes(&self) -> usize {
        self.node_order.len()
    }

    /// Number of source current unknowns.
    pub fn num_sources(&self) -> usize {
        self.source_order.len()
    }

    /// Row of a node voltage. `None` for ground and unknown ids.
    pub fn node_row(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    /// Row of a voltage source current.
    pub fn source_row(&self, id: &str) -> Option<usize> {
        self.source_index.get(id).copied()
    }

    /// Non-ground node ids with their rows, in row order.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.node_order
            .iter()
            .enumerate()
            .map(|(row, id)| (id.as_str(), row))
    }

    /// Voltage source ids with their rows, in row order.
    pub fn sources(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        let offset = self.node_order.len();
        self.source_order
            .iter()
            .enumerate()
            .map(move |(k, id)| (id.as_str(), offset + k))
    }

    /// Ground node ids.
    pub fn ground_nodes(&self) -> &[String] {
        &self.ground_nodes
    }

    /// Components captured at build time, in stamping order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Label of every unknown, in row order.
    pub fn unknowns(&self) -> Vec<Unknown> {
        self.node_order
            .iter()
            .map(|id| Unknown::NodeVoltage(id.clone()))
            .chain(
                self.source_order
                    .iter()
                    .map(|id| Unknown::SourceCurrent(id.clone())),
            )
            .collect()
    }
}

/// Assembled MNA system Ax = b.
#[derive(Debug, Clone)]
pub struct Tableau {
    /// Coefficient matrix A
    pub matrix: DMatrix<f64>,
    /// Right-hand side b
    pub rhs: DVector<f64>,
    /// Diagonal shift the solver applies before factoring A (0.0 when A
    /// has full rank)
    pub regularization: f64,
    /// Mapping from circuit quantities to rows
    pub index_map: IndexMap,
    /// Diagnostics raised during assembly
    pub advisories: Vec<Advisory>,
}

impl Tableau {
    /// Matrix dimension.
    pub fn size(&self) -> usize {
        self.rhs.len()
    }
}

/// Builds the MNA system for a topology.
#[derive(Debug, Clone)]
pub struct TableauBuilder {
    /// Diagonal shift tried on rank-deficient matrices
    pub regularization: f64,
    /// Size guard on the number of unknowns
    pub max_unknowns: usize,
    /// Iteration cap for the rank computation
    pub max_svd_iterations: usize,
}

impl Default for TableauBuilder {
    fn default() -> Self {
        Self::with_config(&SimulatorConfig::default())
    }
}

impl TableauBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from a simulator configuration.
    pub fn with_config(config: &SimulatorConfig) -> Self {
        Self {
            regularization: config.regularization,
            max_unknowns: config.max_unknowns,
            max_svd_iterations: config.max_svd_iterations,
        }
    }

    /// Assemble the system for the given topology.
    pub fn build(&self, topology: &Topology) -> Result<Tableau> {
        if topology.ground_id().is_none() {
            return Err(TopologyError::MissingGround.into());
        }

        let index_map = IndexMap::new(topology);
        let n = index_map.dimension();
        if n == 0 || topology.components().is_empty() {
            return Err(TopologyError::NoUnknowns.into());
        }
        if n > self.max_unknowns {
            return Err(TopologyError::TooLarge {
                unknowns: n,
                limit: self.max_unknowns,
            }
            .into());
        }

        let mut matrix = DMatrix::zeros(n, n);
        let mut rhs = DVector::zeros(n);
        let mut advisories = Vec::new();

        for component in topology.components() {
            let [n1, n2] = component.nodes();
            let i = terminal_row(topology, &index_map, component, n1)?;
            let j = terminal_row(topology, &index_map, component, n2)?;

            match component {
                Component::Resistor(r) => {
                    if !r.is_valid() {
                        return Err(TopologyError::InvalidResistance {
                            component: r.id.clone(),
                            resistance: r.resistance,
                        }
                        .into());
                    }
                    stamp_conductance(&mut matrix, i, j, r.conductance());
                }

                Component::VoltageSource(vs) => {
                    if !vs.is_valid() {
                        return Err(TopologyError::InvalidVoltage {
                            component: vs.id.clone(),
                            voltage: vs.voltage,
                        }
                        .into());
                    }
                    // Rows were assigned from the same component list
                    let Some(row) = index_map.source_row(&vs.id) else {
                        unreachable!("voltage source '{}' has no row", vs.id);
                    };
                    stamp_voltage_source(&mut matrix, &mut rhs, i, j, row, vs.voltage);
                }

                Component::IdealDiode(d) => {
                    debug!(component = %d.id, "diode left unstamped");
                    advisories.push(Advisory::UnstampedDiode {
                        component: d.id.clone(),
                    });
                }
            }
        }

        let regularization = match self.check_rank(&matrix)? {
            Some(rank) => {
                advisories.push(Advisory::Regularized {
                    rank,
                    dimension: n,
                    epsilon: self.regularization,
                });
                self.regularization
            }
            None => 0.0,
        };

        Ok(Tableau {
            matrix,
            rhs,
            regularization,
            index_map,
            advisories,
        })
    }

    /// Rank diagnostic with one regularization attempt.
    ///
    /// Returns the rank of A when it is deficient but A + εI is not. The
    /// matrix itself is left untouched.
    fn check_rank(&self, matrix: &DMatrix<f64>) -> Result<Option<usize>> {
        let n = matrix.nrows();
        let Some(sv) = singular_values(matrix, self.max_svd_iterations) else {
            debug!(dimension = n, "rank check skipped: SVD did not converge");
            return Ok(None);
        };

        let rank = numerical_rank(&sv, n);
        debug!(rank, dimension = n, det = matrix.determinant(), "assembled MNA system");
        if rank == n {
            return Ok(None);
        }

        let shifted = matrix + DMatrix::identity(n, n) * self.regularization;
        let rank_after = singular_values(&shifted, self.max_svd_iterations)
            .map_or(n, |sv| numerical_rank(&sv, n));
        debug!(rank_after, epsilon = self.regularization, "regularized rank");

        if rank_after < n {
            return Err(DcopError::SingularSystem { rank, dimension: n });
        }
        Ok(Some(rank))
    }
}

/// Assemble the system for a topology with default settings.
pub fn build_system(topology: &Topology) -> Result<Tableau> {
    TableauBuilder::new().build(topology)
}

/// Resolve a component terminal to its matrix row (`None` for ground).
fn terminal_row(
    topology: &Topology,
    index_map: &IndexMap,
    component: &Component,
    node: &str,
) -> Result<Option<usize>> {
    if !topology.contains_node(node) {
        return Err(TopologyError::UnknownNode {
            component: component.id().to_string(),
            node: node.to_string(),
        }
        .into());
    }
    Ok(index_map.node_row(node))
}

/// Stamp a conductance between two nodes.
/// For a conductance G between nodes n1 and n2:
///   A[n1,n1] += G
///   A[n2,n2] += G
///   A[n1,n2] -= G
///   A[n2,n1] -= G
fn stamp_conductance(a: &mut DMatrix<f64>, n1: Option<usize>, n2: Option<usize>, g: f64) {
    if let Some(i) = n1 {
        a[(i, i)] += g;
    }
    if let Some(j) = n2 {
        a[(j, j)] += g;
    }
    if let (Some(i), Some(j)) = (n1, n2) {
        a[(i, j)] -= g;
        a[(j, i)] -= g;
    }
}

/// Stamp a voltage source between two nodes with its current at row `br`.
/// The current leaves the positive node through the source.
/// V[n+] - V[n-] = E
fn stamp_voltage_source(
    a: &mut DMatrix<f64>,
    b: &mut DVector<f64>,
    n_pos: Option<usize>,
    n_neg: Option<usize>,
    br: usize,
    voltage: f64,
) {
    if let Some(i) = n_pos {
        a[(br, i)] += 1.0;
        a[(i, br)] += 1.0;
    }
    if let Some(j) = n_neg {
        a[(br, j)] -= 1.0;
        a[(j, br)] -= 1.0;
    }
    b[br] += voltage;
}
