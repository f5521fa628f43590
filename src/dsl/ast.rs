//! Abstract Syntax Tree types for the netlist format.

/// Complete AST representation of a parsed netlist.
#[derive(Debug, Clone, Default)]
pub struct NetlistAst {
    /// All component instances, in file order
    pub components: Vec<ComponentDef>,
    /// All referenced node names, in order of first appearance
    pub nodes: Vec<String>,
    /// Nodes marked with `.ground`
    pub ground_nodes: Vec<String>,
}

impl NetlistAst {
    /// Create a new empty netlist AST.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node name, keeping first-appearance order.
    pub fn note_node(&mut self, name: &str) {
        if !self.nodes.iter().any(|n| n == name) {
            self.nodes.push(name.to_string());
        }
    }
}

/// A component definition from the netlist.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    /// Component type (R, V, D)
    pub component_type: ComponentType,
    /// Unique component name
    pub name: String,
    /// Connected node names
    pub nodes: Vec<String>,
    /// Component value (resistance or voltage)
    pub value: Option<f64>,
    /// Trailing keyword (diode polarity)
    pub model_ref: Option<String>,
    /// Source line number for error reporting
    pub line: usize,
}

/// Component types supported by the netlist format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    /// Resistor
    Resistor,
    /// Voltage Source
    VoltageSource,
    /// Ideal Diode
    Diode,
}

impl ComponentType {
    /// Parse a component type from its name prefix.
    pub fn from_prefix(prefix: char) -> Option<Self> {
        match prefix.to_ascii_uppercase() {
            'R' => Some(Self::Resistor),
            'V' => Some(Self::VoltageSource),
            'D' => Some(Self::Diode),
            _ => None,
        }
    }

    /// Get the expected number of nodes for this component type.
    pub fn expected_node_count(&self) -> usize {
        2
    }
}
