//! Netlist parser for circuit descriptions.
//!
//! This module provides a SPICE-inspired text format for describing
//! resistive circuits. The format is line-oriented and human-editable.
//!
//! # Grammar Overview
//!
//! ```text
//! netlist     = { line }
//! line        = comment | directive | component | empty
//! comment     = ('#' | ';') { any_char }
//! directive   = '.' directive_name argument
//! component   = type name node node [value | polarity]
//!
//! directive_name = "node" | "ground"
//! type        = "R" | "V" | "D"
//! node        = identifier | "0" | "GND"
//! value       = ["DC"] number [unit_suffix]
//! polarity    = "A_TO_K" | "K_TO_A"
//!
//! number      = ['-'] digit+ ['.' digit+] [('e'|'E') ['-'|'+'] digit+]
//! unit_suffix = 'p' | 'n' | 'u' | 'm' | 'k' | 'M' | 'G'
//! identifier  = (letter | '_') { letter | digit | '_' }
//! ```
//!
//! # Component Types
//!
//! | Type | Description | Syntax |
//! |------|-------------|--------|
//! | R | Resistor | `R<name> <n1> <n2> <value>` |
//! | V | Voltage Source | `V<name> <n+> <n-> [DC] <value>` |
//! | D | Ideal Diode | `D<name> <anode> <cathode> [A_TO_K\|K_TO_A]` |
//!
//! # Directives
//!
//! | Directive | Description | Syntax |
//! |-----------|-------------|--------|
//! | .node | Declare a node | `.node <name>` |
//! | .ground | Mark a node as ground | `.ground <name>` |
//!
//! Nodes named `0` or `GND` are ground; both spellings map to node `0`.
//!
//! # Example
//!
//! ```text
//! # Voltage divider
//! V1  in   0    DC 12
//! R1  in   mid  1k
//! R2  mid  0    2k
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{parse_value, Lexer, Token, TokenKind};
pub use parser::Parser;

use crate::error::Result;

/// Parse a netlist string into an AST.
pub fn parse(input: &str) -> Result<NetlistAst> {
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer);
    parser.parse()
}

/// Parse a netlist file.
#[cfg(feature = "cli")]
pub fn parse_file(path: &std::path::Path) -> Result<NetlistAst> {
    let content = std::fs::read_to_string(path).map_err(|e| crate::error::DcopError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&content)
}
