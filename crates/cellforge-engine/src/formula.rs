//! The formula façade: a parsed AST plus its canonical text and the
//! deduplicated positions it references, with an `Evaluate` that consults a
//! sheet for cell values.

use cellforge_common::{FormulaError, Position, Value};
use cellforge_parse::{BinaryOp, Expr, FormulaException, UnaryOp};

use crate::sheet::Sheet;

#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    ast: Expr,
    expression: String,
    referenced: Vec<Position>,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self, FormulaException> {
        let (ast, referenced) = cellforge_parse::parse(source)?;
        let expression = cellforge_parse::canonical_print(&ast);
        Ok(Formula {
            ast,
            expression,
            referenced,
        })
    }

    /// The canonical re-printed expression (no leading `=`).
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Deduplicated referenced positions, in first-seen parse order.
    pub fn referenced_cells(&self) -> &[Position] {
        &self.referenced
    }

    pub fn evaluate(&self, sheet: &Sheet) -> Result<f64, FormulaError> {
        eval(&self.ast, sheet)
    }
}

fn eval(expr: &Expr, sheet: &Sheet) -> Result<f64, FormulaError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Ref(pos) => resolve(*pos, sheet),
        Expr::Unary { op, expr } => {
            let v = eval(expr, sheet)?;
            Ok(match op {
                UnaryOp::Plus => v,
                UnaryOp::Minus => -v,
            })
        }
        Expr::Binary { op, left, right } => {
            let l = eval(left, sheet)?;
            let r = eval(right, sheet)?;
            let result = match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => {
                    if r == 0.0 {
                        return Err(FormulaError::div0());
                    }
                    l / r
                }
            };
            if result.is_finite() {
                Ok(result)
            } else {
                Err(FormulaError::arithmetic())
            }
        }
    }
}

/// `resolve_cell` from the evaluation contract: out-of-range positions
/// raise `#REF!` without ever consulting the sheet; an absent or Empty cell
/// resolves to `0.0` (this falls out of `Cell::get_value` returning
/// `Value::Text("")` for Empty, matched by the same empty-string rule
/// below); text is coerced to a number only when it's a signed integer
/// literal.
fn resolve(pos: Position, sheet: &Sheet) -> Result<f64, FormulaError> {
    if !pos.is_valid() {
        return Err(FormulaError::ref_error());
    }
    let Some(cell) = sheet.get_cell_unchecked(pos) else {
        return Ok(0.0);
    };
    match cell.get_value(sheet) {
        Value::Number(n) => Ok(n),
        Value::Error(e) => Err(e),
        Value::Text(s) => {
            if s.is_empty() {
                Ok(0.0)
            } else {
                parse_signed_integer(&s).ok_or(FormulaError::value_error())
            }
        }
    }
}

/// Accepts exactly `[+\-]?[0-9]+` — no decimal point, no exponent. Wider
/// numeric-string coercion (floats) is a deliberate non-goal; see
/// `DESIGN.md`.
fn parse_signed_integer(s: &str) -> Option<f64> {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<i64>().ok().map(|n| n as f64)
}
