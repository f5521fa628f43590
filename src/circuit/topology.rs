//! Circuit topology container.

use std::collections::HashMap;

use super::types::Node;
use crate::components::Component;
use crate::dsl::NetlistAst;
use crate::error::Result;

/// Node name the netlist parser uses for ground (`GND` is folded into it).
const GROUND_NAME: &str = "0";

/// A circuit under construction or ready for simulation.
///
/// Nodes keep their insertion order, which fixes the order of the node
/// unknowns in the MNA system. Components keep their insertion order, which
/// fixes the stamping order.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    /// All nodes, in insertion order
    nodes: Vec<Node>,

    /// Mapping from node ids to positions in `nodes`
    node_map: HashMap<String, usize>,

    /// All components, in insertion order
    components: Vec<Component>,

    /// Position of the first ground node in `nodes`
    ground: Option<usize>,
}

impl Topology {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a topology from a parsed netlist.
    pub fn from_ast(ast: NetlistAst) -> Result<Self> {
        let mut topology = Topology::new();

        for name in &ast.nodes {
            let is_ground = is_ground_alias(name) || ast.ground_nodes.contains(name);
            topology.add_node(name.as_str(), is_ground);
        }

        for def in &ast.components {
            for name in &def.nodes {
                let is_ground = is_ground_alias(name) || ast.ground_nodes.contains(name);
                topology.add_node(name.as_str(), is_ground);
            }
            topology.add_component(Component::from_def(def)?);
        }

        // `.ground` may name a node no component touches
        for name in &ast.ground_nodes {
            topology.add_node(name.as_str(), true);
        }

        Ok(topology)
    }

    /// Add a node, or update an existing one.
    ///
    /// Idempotent by id. A later `is_ground = true` upgrades an existing
    /// node to ground; `false` never downgrades it.
    pub fn add_node(&mut self, id: impl Into<String>, is_ground: bool) -> &Node {
        let id = id.into();
        let idx = match self.node_map.get(&id) {
            Some(&idx) => {
                self.nodes[idx].is_ground |= is_ground;
                idx
            }
            None => {
                let idx = self.nodes.len();
                self.node_map.insert(id.clone(), idx);
                self.nodes.push(Node::new(id, is_ground));
                idx
            }
        };

        if self.nodes[idx].is_ground && self.ground.map_or(true, |g| idx < g) {
            self.ground = Some(idx);
        }

        &self.nodes[idx]
    }

    /// Add a ground node (shorthand for `add_node(id, true)`).
    pub fn add_ground(&mut self, id: impl Into<String>) -> &Node {
        self.add_node(id, true)
    }

    /// Append a component. Terminal nodes are not created implicitly.
    pub fn add_component(&mut self, component: impl Into<Component>) {
        self.components.push(component.into());
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All components in insertion order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Find a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_map.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Find a component by id.
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id() == id)
    }

    /// Check whether a node with this id exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Id of the ground node, if one has been marked.
    pub fn ground_id(&self) -> Option<&str> {
        self.ground.map(|idx| self.nodes[idx].id.as_str())
    }

    /// Check whether the node is a ground node.
    pub fn is_ground(&self, id: &str) -> bool {
        self.node(id).map_or(false, |n| n.is_ground)
    }

    /// Number of nodes (including ground).
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }
}

fn is_ground_alias(name: &str) -> bool {
    name == GROUND_NAME
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Resistor, VoltageSource};
    use crate::dsl;

    #[test]
    fn test_add_node_is_idempotent() {
        let mut topology = Topology::new();
        topology.add_node("N1", false);
        topology.add_node("N1", false);
        assert_eq!(topology.num_nodes(), 1);
    }

    #[test]
    fn test_ground_flag_upgrades_but_never_downgrades() {
        let mut topology = Topology::new();
        topology.add_node("G", false);
        assert_eq!(topology.ground_id(), None);

        assert!(topology.add_node("G", true).is_ground);
        assert_eq!(topology.ground_id(), Some("G"));

        assert!(topology.add_node("G", false).is_ground);
        assert_eq!(topology.ground_id(), Some("G"));
    }

    #[test]
    fn test_ground_id_tracks_first_ground_in_insertion_order() {
        let mut topology = Topology::new();
        topology.add_node("A", false);
        topology.add_ground("B");
        assert_eq!(topology.ground_id(), Some("B"));

        // Upgrading an earlier node moves the reference there
        topology.add_node("A", true);
        assert_eq!(topology.ground_id(), Some("A"));
    }

    #[test]
    fn test_components_keep_insertion_order() {
        let mut topology = Topology::new();
        topology.add_ground("0");
        topology.add_node("N1", false);
        topology.add_component(VoltageSource::new("V1", "N1", "0", 5.0));
        topology.add_component(Resistor::new("R1", "N1", "0", 1e3));

        let ids: Vec<&str> = topology.components().iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["V1", "R1"]);
        assert!(topology.component("R1").is_some());
        assert!(topology.component("R2").is_none());
    }

    #[test]
    fn test_from_ast_marks_ground_aliases() {
        let ast = dsl::parse("V1 in GND 5\nR1 in 0 1k\n").unwrap();
        let topology = Topology::from_ast(ast).unwrap();

        assert!(topology.is_ground("0"));
        assert!(!topology.contains_node("GND"));
        assert!(!topology.is_ground("in"));
        assert_eq!(topology.ground_id(), Some("0"));
        assert_eq!(topology.num_nodes(), 2);
        assert_eq!(topology.components().len(), 2);
    }

    #[test]
    fn test_from_ast_rejects_source_without_value() {
        let ast = dsl::parse("V1 a 0\nR1 a 0 1k\n").unwrap();
        let err = Topology::from_ast(ast).unwrap_err();
        assert!(matches!(
            err,
            crate::error::DcopError::InvalidComponent { ref name, line: 1, .. } if name == "V1"
        ));
    }

    #[test]
    fn test_from_ast_ground_directive() {
        let ast = dsl::parse(".ground ref\nV1 a ref 1\nR1 a ref 10\n").unwrap();
        let topology = Topology::from_ast(ast).unwrap();
        assert_eq!(topology.ground_id(), Some("ref"));
    }
}
