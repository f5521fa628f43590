//! Component models for circuit simulation.
//!
//! This module provides models for all supported circuit components:
//! - Linear: Resistor
//! - Sources: Voltage Source
//! - Placeholder: Ideal Diode (declared, not yet stamped)
//!
//! Every component connects exactly two nodes, referenced by id.

mod diode;
mod linear;
mod sources;

pub use diode::{DiodePolarity, IdealDiode};
pub use linear::Resistor;
pub use sources::VoltageSource;

use std::fmt;

use crate::dsl::{ComponentDef, ComponentType};
use crate::error::{DcopError, Result};

/// Discriminant of a [`Component`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Resistor,
    VoltageSource,
    IdealDiode,
}

impl ComponentKind {
    /// Netlist prefix for this kind.
    pub fn symbol(&self) -> char {
        match self {
            ComponentKind::Resistor => 'R',
            ComponentKind::VoltageSource => 'V',
            ComponentKind::IdealDiode => 'D',
        }
    }
}

/// A circuit component.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Resistor(Resistor),
    VoltageSource(VoltageSource),
    IdealDiode(IdealDiode),
}

impl Component {
    /// Create a component from a netlist definition.
    pub fn from_def(def: &ComponentDef) -> Result<Self> {
        let [n1, n2] = match def.nodes.as_slice() {
            [a, b] => [a.clone(), b.clone()],
            _ => {
                return Err(DcopError::invalid_component(
                    &def.name,
                    def.line,
                    format!("expected 2 nodes, got {}", def.nodes.len()),
                ))
            }
        };

        match def.component_type {
            ComponentType::Resistor => {
                let value = def.value.ok_or_else(|| {
                    DcopError::invalid_component(&def.name, def.line, "resistor requires a value")
                })?;
                Ok(Component::Resistor(Resistor::new(&def.name, n1, n2, value)))
            }

            ComponentType::VoltageSource => {
                let value = def.value.ok_or_else(|| {
                    DcopError::invalid_component(
                        &def.name,
                        def.line,
                        "voltage source requires a value",
                    )
                })?;
                Ok(Component::VoltageSource(VoltageSource::new(
                    &def.name, n1, n2, value,
                )))
            }

            ComponentType::Diode => {
                let polarity = match def.model_ref.as_deref() {
                    Some(text) => text
                        .parse::<DiodePolarity>()
                        .map_err(|e| DcopError::invalid_component(&def.name, def.line, e))?,
                    None => DiodePolarity::default(),
                };
                Ok(Component::IdealDiode(IdealDiode::new(
                    &def.name, n1, n2, polarity,
                )))
            }
        }
    }

    /// Get the component kind.
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Resistor(_) => ComponentKind::Resistor,
            Component::VoltageSource(_) => ComponentKind::VoltageSource,
            Component::IdealDiode(_) => ComponentKind::IdealDiode,
        }
    }

    /// Get the component id.
    pub fn id(&self) -> &str {
        match self {
            Component::Resistor(r) => &r.id,
            Component::VoltageSource(v) => &v.id,
            Component::IdealDiode(d) => &d.id,
        }
    }

    /// Get the two incident node ids.
    pub fn nodes(&self) -> [&str; 2] {
        let nodes = match self {
            Component::Resistor(r) => &r.nodes,
            Component::VoltageSource(v) => &v.nodes,
            Component::IdealDiode(d) => &d.nodes,
        };
        [&nodes[0], &nodes[1]]
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [n1, n2] = self.nodes();
        write!(f, "{} {} {}", self.id(), n1, n2)?;
        match self {
            Component::Resistor(r) => write!(f, " {}", r.resistance),
            Component::VoltageSource(v) => write!(f, " {}", v.voltage),
            Component::IdealDiode(d) => write!(f, " {}", d.polarity),
        }
    }
}

impl From<Resistor> for Component {
    fn from(r: Resistor) -> Self {
        Component::Resistor(r)
    }
}

impl From<VoltageSource> for Component {
    fn from(v: VoltageSource) -> Self {
        Component::VoltageSource(v)
    }
}

impl From<IdealDiode> for Component {
    fn from(d: IdealDiode) -> Self {
        Component::IdealDiode(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(component_type: ComponentType, name: &str, value: Option<f64>) -> ComponentDef {
        ComponentDef {
            component_type,
            name: name.to_string(),
            nodes: vec!["a".to_string(), "0".to_string()],
            value,
            model_ref: None,
            line: 1,
        }
    }

    #[test]
    fn test_from_def_resistor() {
        let c = Component::from_def(&def(ComponentType::Resistor, "R1", Some(1e3))).unwrap();
        assert_eq!(c.kind(), ComponentKind::Resistor);
        assert_eq!(c.id(), "R1");
        assert_eq!(c.nodes(), ["a", "0"]);
    }

    #[test]
    fn test_from_def_resistor_requires_value() {
        let err = Component::from_def(&def(ComponentType::Resistor, "R1", None)).unwrap_err();
        assert!(matches!(err, DcopError::InvalidComponent { .. }));
    }

    #[test]
    fn test_from_def_source_requires_value() {
        let err = Component::from_def(&def(ComponentType::VoltageSource, "V1", None)).unwrap_err();
        assert!(
            matches!(err, DcopError::InvalidComponent { ref message, .. } if message.contains("requires a value"))
        );

        let c = Component::from_def(&def(ComponentType::VoltageSource, "V1", Some(-3.3))).unwrap();
        assert_eq!(c, Component::VoltageSource(VoltageSource::new("V1", "a", "0", -3.3)));
    }

    #[test]
    fn test_from_def_diode_polarity() {
        let mut d = def(ComponentType::Diode, "D1", None);
        d.model_ref = Some("K_TO_A".to_string());
        let c = Component::from_def(&d).unwrap();
        match c {
            Component::IdealDiode(diode) => {
                assert_eq!(diode.polarity, DiodePolarity::CathodeToAnode)
            }
            other => panic!("expected diode, got {:?}", other),
        }

        d.model_ref = Some("sideways".to_string());
        assert!(Component::from_def(&d).is_err());
    }

    #[test]
    fn test_kind_symbols() {
        assert_eq!(ComponentKind::Resistor.symbol(), 'R');
        assert_eq!(ComponentKind::VoltageSource.symbol(), 'V');
        assert_eq!(ComponentKind::IdealDiode.symbol(), 'D');
    }
}
