//! The value a cell's payload produces once evaluated.

use std::fmt::{self, Display};

use crate::FormulaError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A cell's materialized value: a number, verbatim text, or an evaluation
/// fault. `Cell::GetValue` returns this; it is also what gets cached.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Error(FormulaError),
}

impl Value {
    pub fn empty() -> Self {
        Value::Text(String::new())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Text(s) => write!(f, "{s}"),
            Value::Error(_) => write!(f, "{}", FormulaError::sink_token()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<FormulaError> for Value {
    fn from(e: FormulaError) -> Self {
        Value::Error(e)
    }
}

/// The platform's default decimal rendering for a `double`, the way Rust's
/// own `{}` formatter renders `f64` (no trailing `.0` is stripped: Rust's
/// `Display` for `f64` already omits it for integral values).
pub fn format_number(n: f64) -> String {
    format!("{n}")
}
