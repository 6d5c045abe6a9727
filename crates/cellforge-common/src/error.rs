//! Evaluation-time arithmetic/type/reference faults.
//!
//! A [`FormulaError`] is data, not control flow that escapes the crate: it is
//! returned from `Evaluate`/`GetValue` and stored in a cell's cache so that
//! downstream formulas can see and propagate it. Parse-time failures use a
//! different type ([`crate::Value`] never holds one) because they abort an
//! edit instead of becoming a cell's value.

use std::{error::Error, fmt};

/// The four evaluation-fault categories this engine distinguishes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FormulaErrorKind {
    /// A cell reference fell outside the addressable grid.
    Ref,
    /// A referenced cell held text that does not parse as a number.
    Value,
    /// Division by exact zero.
    Div0,
    /// A result was non-finite (overflow or NaN).
    Arithmetic,
}

impl fmt::Display for FormulaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ref => "#REF!",
            Self::Value => "#VALUE!",
            Self::Div0 => "#DIV/0!",
            Self::Arithmetic => "#ARITHM!",
        })
    }
}

/// An evaluation fault carrying its category.
///
/// `Display` renders the distinct code (`#REF!`, `#VALUE!`, ...); the sheet's
/// text dump (`PrintValues`) intentionally does not use `Display` here and
/// instead collapses every kind to `#ARITHM!`, matching this engine's current
/// output contract (see [`crate::FormulaErrorKind::Arithmetic`]'s rendering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormulaError {
    pub kind: FormulaErrorKind,
}

impl FormulaError {
    pub const fn new(kind: FormulaErrorKind) -> Self {
        Self { kind }
    }

    pub const fn ref_error() -> Self {
        Self::new(FormulaErrorKind::Ref)
    }

    pub const fn value_error() -> Self {
        Self::new(FormulaErrorKind::Value)
    }

    pub const fn div0() -> Self {
        Self::new(FormulaErrorKind::Div0)
    }

    pub const fn arithmetic() -> Self {
        Self::new(FormulaErrorKind::Arithmetic)
    }

    /// The token written by the sheet's text dumps for any error kind.
    pub const fn sink_token() -> &'static str {
        "#ARITHM!"
    }
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Error for FormulaError {}
