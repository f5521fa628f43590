//! Lexer (tokenizer) for the netlist format.

use crate::error::{DcopError, Result};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in the netlist format.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An identifier (component name, node name, etc.)
    Identifier,
    /// A number (integer or floating point, possibly with suffix)
    Number,
    /// A directive (starts with '.')
    Directive,
    /// Newline
    Newline,
    /// End of file
    Eof,
}

/// Lexer for tokenizing netlist input.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        let ch = match self.chars.peek() {
            Some(&(_, ch)) => ch,
            None => {
                return Ok(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    line: self.line,
                    column: self.column,
                });
            }
        };

        let start_column = self.column;
        let start_line = self.line;

        let token = match ch {
            '\n' => {
                self.advance();
                Token {
                    kind: TokenKind::Newline,
                    text: "\n".to_string(),
                    line: start_line,
                    column: start_column,
                }
            }
            '.' => {
                self.advance();
                let text = self.read_identifier();
                if text.is_empty() {
                    return Err(DcopError::lexer(
                        start_line,
                        start_column,
                        "expected a directive name after '.'",
                    ));
                }
                Token {
                    kind: TokenKind::Directive,
                    text: format!(".{}", text),
                    line: start_line,
                    column: start_column,
                }
            }
            '-' | '+' | '0'..='9' => {
                let text = self.read_number();
                Token {
                    kind: TokenKind::Number,
                    text,
                    line: start_line,
                    column: start_column,
                }
            }
            _ if ch.is_alphabetic() || ch == '_' => Token {
                kind: TokenKind::Identifier,
                text: self.read_identifier(),
                line: start_line,
                column: start_column,
            },
            _ => {
                return Err(DcopError::lexer(
                    start_line,
                    start_column,
                    format!("unexpected character '{}'", ch),
                ));
            }
        };

        Ok(token)
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((_, ch)) = self.chars.next() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            Some(ch)
        } else {
            None
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&(_, ch)) = self.chars.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else if ch == '#' || ch == ';' {
                // Skip comment until end of line
                while let Some(&(_, c)) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_while(&mut self, text: &mut String, pred: impl Fn(char) -> bool) {
        while let Some(&(_, ch)) = self.chars.peek() {
            if !pred(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut text = String::new();
        self.read_while(&mut text, |ch| ch.is_alphanumeric() || ch == '_');
        text
    }

    /// Read a number with optional sign, fraction, exponent and scale
    /// suffix. Letters trailing the suffix (`1kohm`, `5V`) are kept in the
    /// token and ignored by [`parse_value`].
    fn read_number(&mut self) -> String {
        let mut text = String::new();
        self.read_while(&mut text, |ch| ch == '-' || ch == '+');
        self.read_while(&mut text, |ch| ch.is_ascii_digit() || ch == '.');

        if let Some(&(_, ch @ ('e' | 'E'))) = self.chars.peek() {
            text.push(ch);
            self.advance();
            if let Some(&(_, sign @ ('-' | '+'))) = self.chars.peek() {
                text.push(sign);
                self.advance();
            }
            self.read_while(&mut text, |ch| ch.is_ascii_digit());
        }

        self.read_while(&mut text, |ch| ch.is_alphabetic() || ch == 'µ');
        text
    }
}

/// Scale suffixes, longest first so `meg` wins over `m`.
const SCALE_SUFFIXES: [(&str, f64); 10] = [
    ("meg", 1e6),
    ("p", 1e-12),
    ("n", 1e-9),
    ("u", 1e-6),
    ("µ", 1e-6),
    ("m", 1e-3),
    ("k", 1e3),
    ("K", 1e3),
    ("M", 1e6),
    ("G", 1e9),
];

/// Parse a number string with optional scale suffix (`10k`, `4.7u`,
/// `1meg`). Unit letters after the suffix are ignored.
pub fn parse_value(text: &str) -> Option<f64> {
    let text = text.trim();
    let split = text
        .char_indices()
        .find(|&(i, ch)| {
            let is_exponent = matches!(ch, 'e' | 'E')
                && text[i + 1..].starts_with(|c: char| c.is_ascii_digit() || c == '-' || c == '+');
            ch.is_alphabetic() && !is_exponent
        })
        .map_or(text.len(), |(i, _)| i);

    let (number, unit) = text.split_at(split);
    let value = number.parse::<f64>().ok()?;

    let multiplier = SCALE_SUFFIXES
        .iter()
        .find(|(suffix, _)| {
            if *suffix == "meg" {
                unit.to_ascii_lowercase().starts_with("meg")
            } else {
                unit.starts_with(suffix)
            }
        })
        .map_or(1.0, |&(_, mult)| mult);

    Some(value * multiplier)
}
