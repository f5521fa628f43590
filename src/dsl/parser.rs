//! Parser for the netlist format.

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{DcopError, Result};

/// Spellings of the ground node; all are folded into `"0"`.
const GROUND_ALIASES: [&str; 2] = ["0", "GND"];

/// Parser for netlists.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            current: Token {
                kind: TokenKind::Newline,
                text: String::new(),
                line: 1,
                column: 1,
            },
        }
    }

    /// Parse the entire netlist.
    pub fn parse(&mut self) -> Result<NetlistAst> {
        let mut ast = NetlistAst::new();
        self.advance()?;

        while self.current.kind != TokenKind::Eof {
            match self.current.kind {
                TokenKind::Newline => {
                    self.advance()?;
                    continue;
                }
                TokenKind::Directive => self.parse_directive(&mut ast)?,
                TokenKind::Identifier => {
                    let component = self.parse_component()?;
                    for node in &component.nodes {
                        ast.note_node(node);
                    }
                    ast.components.push(component);
                }
                TokenKind::Number | TokenKind::Eof => {
                    return Err(DcopError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            self.expect_end_of_line()?;
        }

        Ok(ast)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect_end_of_line(&mut self) -> Result<()> {
        match self.current.kind {
            TokenKind::Newline => self.advance(),
            TokenKind::Eof => Ok(()),
            _ => Err(DcopError::parse(
                self.current.line,
                format!("unexpected trailing token: {:?}", self.current.text),
            )),
        }
    }

    /// Consume a node name (identifier or numeric label).
    fn expect_node(&mut self, line: usize) -> Result<String> {
        match self.current.kind {
            TokenKind::Identifier | TokenKind::Number => {
                let text = normalize_node(&self.current.text);
                self.advance()?;
                Ok(text)
            }
            _ => Err(DcopError::parse(line, "expected a node name")),
        }
    }

    fn parse_directive(&mut self, ast: &mut NetlistAst) -> Result<()> {
        let directive = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        match directive.to_lowercase().as_str() {
            ".node" => {
                let node = self.expect_node(line)?;
                ast.note_node(&node);
            }
            ".ground" => {
                let node = self.expect_node(line)?;
                ast.note_node(&node);
                if !ast.ground_nodes.contains(&node) {
                    ast.ground_nodes.push(node);
                }
            }
            _ => {
                return Err(DcopError::parse(
                    line,
                    format!("unknown directive: {}", directive),
                ));
            }
        }

        Ok(())
    }

    fn parse_component(&mut self) -> Result<ComponentDef> {
        let name = self.current.text.clone();
        let line = self.current.line;
        self.advance()?;

        let first_char = name.chars().next().unwrap_or('?');
        let component_type = ComponentType::from_prefix(first_char).ok_or_else(|| {
            DcopError::UnknownComponentType {
                component_type: name.clone(),
                line,
            }
        })?;

        let expected_nodes = component_type.expected_node_count();
        let mut nodes = Vec::with_capacity(expected_nodes);
        while nodes.len() < expected_nodes {
            if matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof) {
                return Err(DcopError::invalid_component(
                    &name,
                    line,
                    format!("expected {} nodes, got {}", expected_nodes, nodes.len()),
                ));
            }
            nodes.push(self.expect_node(line)?);
        }

        let mut value = None;
        let mut model_ref = None;

        // Optional trailing value or keyword
        while !matches!(self.current.kind, TokenKind::Newline | TokenKind::Eof) {
            let text = self.current.text.clone();
            match self.current.kind {
                TokenKind::Number if value.is_none() => {
                    value = Some(parse_value(&text).ok_or_else(|| {
                        DcopError::invalid_component(&name, line, format!("invalid value: {}", text))
                    })?);
                }
                TokenKind::Identifier if text.eq_ignore_ascii_case("DC") => {}
                TokenKind::Identifier if model_ref.is_none() => model_ref = Some(text),
                _ => {
                    return Err(DcopError::invalid_component(
                        &name,
                        line,
                        format!("unexpected token: {:?}", text),
                    ));
                }
            }
            self.advance()?;
        }

        Ok(ComponentDef {
            component_type,
            name,
            nodes,
            value,
            model_ref,
            line,
        })
    }
}

fn normalize_node(text: &str) -> String {
    if GROUND_ALIASES
        .iter()
        .any(|alias| alias.eq_ignore_ascii_case(text))
    {
        "0".to_string()
    } else {
        text.to_string()
    }
}
