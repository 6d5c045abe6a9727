//! Recursive-descent parser for arithmetic cell formulas.
//!
//! ```text
//! expr     := term (('+'|'-') term)*
//! term     := factor (('*'|'/') factor)*
//! factor   := ('+'|'-') factor | atom
//! atom     := number | cell_ref | '(' expr ')'
//! ```
//!
//! `parse` returns both the AST and the set of positions it references
//! (deduplicated, first-seen order), including syntactically valid but
//! out-of-range ones — those are kept so evaluation can report `#REF!`
//! rather than the parser silently rejecting them.

use std::error::Error;
use std::fmt::{self, Display};

use cellforge_common::Position;
use smallvec::SmallVec;

use crate::tokenizer::{Token, TokenType, Tokenizer, TokenizerError};

/// Raised when formula text fails to parse. Never a cell value — `SetCell`
/// surfaces this and leaves the sheet unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaException {
    pub message: String,
    pub pos: Option<usize>,
}

impl Display for FormulaException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(f, "formula error at {pos}: {}", self.message),
            None => write!(f, "formula error: {}", self.message),
        }
    }
}

impl Error for FormulaException {}

impl From<TokenizerError> for FormulaException {
    fn from(e: TokenizerError) -> Self {
        FormulaException {
            message: e.message,
            pos: Some(e.pos),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    /// Binding power, used by the canonical printer to decide when a child
    /// needs parentheses. `+`/`-` bind looser than `*`/`/`; all four are
    /// left-associative.
    pub(crate) fn precedence(self) -> u8 {
        match self {
            BinaryOp::Add | BinaryOp::Sub => 1,
            BinaryOp::Mul | BinaryOp::Div => 2,
        }
    }
}

/// A parsed formula expression. Numbers carry their exact literal text so
/// the canonical printer can round-trip them.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Ref(Position),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Parse formula source text (without the leading `=`).
///
/// Returns the AST together with the positions it references, in
/// first-seen order with duplicates removed.
pub fn parse(source: &str) -> Result<(Expr, Vec<Position>), FormulaException> {
    let tokens = Tokenizer::tokenize(source)?;
    if tokens.is_empty() {
        return Err(FormulaException {
            message: "empty expression".to_string(),
            pos: Some(0),
        });
    }
    let mut parser = Parser {
        tokens: &tokens,
        idx: 0,
        refs: SmallVec::new(),
    };
    let expr = parser.parse_expr()?;
    if parser.idx != parser.tokens.len() {
        let tok = &parser.tokens[parser.idx];
        return Err(FormulaException {
            message: format!("unexpected token '{}'", tok.value),
            pos: Some(tok.start),
        });
    }
    Ok((expr, dedup_preserve_order(parser.refs.into_vec())))
}

fn dedup_preserve_order(refs: Vec<Position>) -> Vec<Position> {
    let mut seen = std::collections::HashSet::with_capacity(refs.len());
    let mut out = Vec::with_capacity(refs.len());
    for p in refs {
        if seen.insert(p) {
            out.push(p);
        }
    }
    out
}

struct Parser<'a> {
    tokens: &'a [Token],
    idx: usize,
    refs: SmallVec<[Position; 4]>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.idx)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.idx);
        if tok.is_some() {
            self.idx += 1;
        }
        tok
    }

    fn eof_error(&self, message: &str) -> FormulaException {
        let pos = self.tokens.last().map(|t| t.end).unwrap_or(0);
        FormulaException {
            message: message.to_string(),
            pos: Some(pos),
        }
    }

    /// `expr := term (('+'|'-') term)*`
    fn parse_expr(&mut self) -> Result<Expr, FormulaException> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek().map(|t| t.token_type) {
                Some(TokenType::Plus) => BinaryOp::Add,
                Some(TokenType::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// `term := factor (('*'|'/') factor)*`
    fn parse_term(&mut self) -> Result<Expr, FormulaException> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek().map(|t| t.token_type) {
                Some(TokenType::Star) => BinaryOp::Mul,
                Some(TokenType::Slash) => BinaryOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    /// `factor := ('+'|'-') factor | atom`
    fn parse_factor(&mut self) -> Result<Expr, FormulaException> {
        match self.peek().map(|t| t.token_type) {
            Some(TokenType::Plus) => {
                self.advance();
                Ok(Expr::Unary {
                    op: UnaryOp::Plus,
                    expr: Box::new(self.parse_factor()?),
                })
            }
            Some(TokenType::Minus) => {
                self.advance();
                Ok(Expr::Unary {
                    op: UnaryOp::Minus,
                    expr: Box::new(self.parse_factor()?),
                })
            }
            _ => self.parse_atom(),
        }
    }

    /// `atom := number | cell_ref | '(' expr ')'`
    fn parse_atom(&mut self) -> Result<Expr, FormulaException> {
        let tok = self
            .peek()
            .cloned()
            .ok_or_else(|| self.eof_error("expected a number, cell reference or '('"))?;
        match tok.token_type {
            TokenType::Number => {
                self.advance();
                let n: f64 = tok.value.parse().map_err(|_| FormulaException {
                    message: format!("invalid numeric literal '{}'", tok.value),
                    pos: Some(tok.start),
                })?;
                Ok(Expr::Number(n))
            }
            TokenType::CellRef => {
                self.advance();
                let pos = Position::parse(&tok.value).map_err(|e| FormulaException {
                    message: format!("invalid cell reference '{}': {e}", tok.value),
                    pos: Some(tok.start),
                })?;
                self.refs.push(pos);
                Ok(Expr::Ref(pos))
            }
            TokenType::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                match self.advance() {
                    Some(t) if t.token_type == TokenType::RParen => Ok(inner),
                    Some(t) => Err(FormulaException {
                        message: format!("expected ')', found '{}'", t.value),
                        pos: Some(t.start),
                    }),
                    None => Err(self.eof_error("unmatched '('")),
                }
            }
            _ => Err(FormulaException {
                message: format!("unexpected token '{}'", tok.value),
                pos: Some(tok.start),
            }),
        }
    }
}

impl BinaryOp {
    pub(crate) fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

impl UnaryOp {
    pub(crate) fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}
