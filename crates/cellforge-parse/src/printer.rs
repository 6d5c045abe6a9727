//! Canonical re-printing of a parsed formula.
//!
//! Produces the minimum parenthesization implied by operator precedence and
//! left-associativity, numbers in a stable round-trip decimal form, and
//! cell references in uppercase `A1` form. `parse(print(parse(s)))` is
//! structurally equal to `parse(s)` for any syntactically valid `s`.

use std::fmt::Write as _;

use crate::parser::{BinaryOp, Expr, UnaryOp};

/// Higher than any binary operator's precedence; leaves are never
/// parenthesized regardless of the threshold they're printed under.
const LEAF_PREC: u8 = u8::MAX;
/// Threshold an operand must clear to be its own unary operator's child
/// without parens: only a leaf, another unary, or a parenthesized binary.
const UNARY_PREC: u8 = 10;

pub fn canonical_print(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(expr, 0, &mut out);
    out
}

/// Writes `expr`, wrapping it in parentheses if its own precedence is
/// below `min_prec`. Callers pass the threshold their position requires:
/// a left operand may equal the parent operator's precedence (the two
/// merge left-associatively), a right operand must exceed it (anything
/// equal would silently change the result, e.g. `a-(b-c)` vs `a-b-c`).
fn write_expr(expr: &Expr, min_prec: u8, out: &mut String) {
    let prec = expr_prec(expr);
    let needs_parens = prec < min_prec;
    if needs_parens {
        out.push('(');
    }
    write_expr_bare(expr, out);
    if needs_parens {
        out.push(')');
    }
}

fn expr_prec(expr: &Expr) -> u8 {
    match expr {
        Expr::Number(_) | Expr::Ref(_) => LEAF_PREC,
        Expr::Unary { .. } => UNARY_PREC,
        Expr::Binary { op, .. } => op.precedence(),
    }
}

fn write_expr_bare(expr: &Expr, out: &mut String) {
    match expr {
        Expr::Number(n) => {
            write!(out, "{}", format_round_trip(*n)).unwrap();
        }
        Expr::Ref(pos) => {
            write!(out, "{pos}").unwrap();
        }
        Expr::Unary { op, expr } => {
            out.push_str(op.symbol());
            write_expr(expr, UNARY_PREC, out);
        }
        Expr::Binary { op, left, right } => {
            let prec = op.precedence();
            write_expr(left, prec, out);
            out.push_str(op.symbol());
            write_expr(right, prec + 1, out);
        }
    }
}

/// A stable, round-trip decimal form: the shortest string that parses back
/// to the same `f64`, which is exactly what Rust's `{}` formatter for `f64`
/// already guarantees.
fn format_round_trip(n: f64) -> String {
    format!("{n}")
}
