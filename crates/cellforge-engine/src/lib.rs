//! The evaluation core of a formula spreadsheet: cells, their dependency
//! graph, and the sheet operations that keep cached values consistent with
//! it.
//!
//! A [`Sheet`] owns a sparse map of [`Position`](cellforge_common::Position)
//! to [`Cell`](crate::cell::Cell). Writing a formula ([`Sheet::set_cell`])
//! parses it, rejects anything that would create a dependency cycle before
//! touching any storage, rewires the forward/reverse edges, and
//! invalidates every cached value downstream of the write. Reading a cell
//! ([`Sheet::get_cell`]) lazily evaluates and memoizes.
//!
//! Not thread-safe: `get_cell` mutates a per-cell cache under `&self` via
//! interior mutability, so concurrent readers on the same sheet race on
//! that cache just as they would on a write.

pub mod cell;
pub mod formula;
pub mod sheet;

pub use cell::Cell;
pub use formula::Formula;
pub use sheet::{Sheet, SheetError};

pub use cellforge_common::{FormulaError, FormulaErrorKind, Position, PositionError, Value};
pub use cellforge_parse::FormulaException;
