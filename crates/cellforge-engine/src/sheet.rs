//! The sheet: sparse cell storage, the bidirectional dependency graph, and
//! the operations (`SetCell`, `GetCell`, `ClearCell`, `PrintValues`,
//! `PrintTexts`) that keep them consistent.

use std::error::Error;
use std::fmt;

use cellforge_common::{Position, Value};
use cellforge_parse::FormulaException;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::cell::Cell;

/// Failures a sheet operation can raise. Every variant leaves the sheet
/// exactly as it was before the call — this is the `SetCell` atomicity
/// invariant, not just a convention for the other operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetError {
    /// The position named in the call itself is out of range.
    InvalidPosition(Position),
    /// Installing the formula would create a cycle; names one cell on the
    /// cycle (not necessarily the whole cycle).
    CircularDependency(Position),
    /// The formula text failed to parse.
    Formula(FormulaException),
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::InvalidPosition(p) => write!(f, "position {p} is out of range"),
            SheetError::CircularDependency(p) => {
                write!(f, "setting this formula would create a cycle through {p}")
            }
            SheetError::Formula(e) => write!(f, "{e}"),
        }
    }
}

impl Error for SheetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SheetError::Formula(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FormulaException> for SheetError {
    fn from(e: FormulaException) -> Self {
        SheetError::Formula(e)
    }
}

/// A single sparse sheet of cells addressed by [`Position`].
///
/// Reading an absent position returns an `Empty` value without allocating
/// one. A cell can still occupy a map entry while holding an `Empty`
/// payload — either it was `ClearCell`'d while something still depends on
/// it, or it was materialized as an anchor when some other cell's formula
/// referenced it first — so `printable_size` deliberately doesn't just
/// count map entries; see its own doc comment.
#[derive(Debug, Default)]
pub struct Sheet {
    cells: FxHashMap<Position, Cell>,
}

impl Sheet {
    pub fn new() -> Self {
        Sheet {
            cells: FxHashMap::default(),
        }
    }

    /// The smallest `(rows, cols)` rectangle covering every non-Empty
    /// installed cell, `(0, 0)` if there are none. A cell kept alive only
    /// as a dependency anchor (cleared, or never given a payload, but
    /// still referenced by something) does not extend this rectangle —
    /// see `DESIGN.md` for why this engine takes that reading over the
    /// alternative "any installed cell counts" policy.
    pub fn printable_size(&self) -> (u32, u32) {
        self.cells
            .iter()
            .filter(|(_, c)| !c.is_empty_payload())
            .map(|(p, _)| (p.row + 1, p.col + 1))
            .fold((0, 0), |(rows, cols), (r, c)| (rows.max(r), cols.max(c)))
    }

    /// A cell's current value, or `Empty` text if the position has never
    /// been written (or was cleared back to Empty).
    pub fn get_cell(&self, pos: Position) -> Result<Value, SheetError> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition(pos));
        }
        Ok(match self.cells.get(&pos) {
            Some(cell) => cell.get_value(self),
            None => Value::empty(),
        })
    }

    /// The raw stored text a user would see if they edited this cell,
    /// e.g. `"=A1+1"` for a formula or `""` for an absent/cleared cell.
    pub fn get_cell_text(&self, pos: Position) -> Result<String, SheetError> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition(pos));
        }
        Ok(match self.cells.get(&pos) {
            Some(cell) => cell.get_text(),
            None => String::new(),
        })
    }

    pub(crate) fn get_cell_unchecked(&self, pos: Position) -> Option<&Cell> {
        self.cells.get(&pos)
    }

    /// Parse and install `text` at `pos`.
    ///
    /// Rejects, without mutating anything: an out-of-range `pos`, formula
    /// text that fails to parse, and a formula that would create a
    /// dependency cycle (including a direct self-reference). Everything
    /// that can reject the write is checked before any edge or cache is
    /// touched, so a rejected call leaves the sheet byte-for-byte as it
    /// was.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<(), SheetError> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition(pos));
        }
        let new_cell = Cell::new(text)?;
        let new_refs = new_cell.get_referenced_cells().to_vec();

        if !new_refs.is_empty() {
            self.check_acyclic(pos, &new_refs)?;
        }

        let old_refs = self
            .cells
            .get(&pos)
            .map(|c| c.get_referenced_cells().to_vec())
            .unwrap_or_default();

        for old in &old_refs {
            if !new_refs.contains(old) {
                self.remove_dependent_edge(*old, pos);
            }
        }
        for new in &new_refs {
            self.add_dependent_edge(*new, pos);
        }

        let dependents = self
            .cells
            .get(&pos)
            .map(|c| c.dependents().clone())
            .unwrap_or_default();
        let mut new_cell = new_cell;
        new_cell.set_dependents(dependents);
        self.cells.insert(pos, new_cell);

        self.invalidate_dependents(pos);
        debug!(%pos, "set_cell");
        Ok(())
    }

    /// Resets a cell to Empty without removing it from storage (so any
    /// cell still depending on it keeps a reverse edge to attach to).
    /// Clearing a position that was never set is a no-op, not an error.
    pub fn clear_cell(&mut self, pos: Position) -> Result<(), SheetError> {
        if !pos.is_valid() {
            return Err(SheetError::InvalidPosition(pos));
        }
        let Some(cell) = self.cells.get(&pos) else {
            return Ok(());
        };
        let old_refs = cell.get_referenced_cells().to_vec();
        for old in &old_refs {
            self.remove_dependent_edge(*old, pos);
        }
        if let Some(cell) = self.cells.get_mut(&pos) {
            cell.clear_payload_to_empty();
        }
        self.invalidate_dependents(pos);
        debug!(%pos, "clear_cell");
        Ok(())
    }

    /// Writes the printable rectangle's current values as a tab-separated,
    /// newline-terminated grid (every row, including the last, ends in
    /// `\n`). An absent or Empty cell writes nothing between its
    /// neighboring tabs.
    pub fn print_values<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        // `print_grid` only ever asks for positions within the printable
        // rectangle, which is built from positions that were valid at
        // insertion time, so these can never see `InvalidPosition`.
        self.print_grid(out, |sheet, pos| {
            sheet
                .get_cell(pos)
                .expect("printable positions are valid")
                .to_string()
        })
    }

    /// Same grid shape as [`Sheet::print_values`], writing each cell's raw
    /// stored text instead of its evaluated value.
    pub fn print_texts<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        self.print_grid(out, |sheet, pos| {
            sheet
                .get_cell_text(pos)
                .expect("printable positions are valid")
        })
    }

    fn print_grid<W: fmt::Write>(
        &self,
        out: &mut W,
        mut render: impl FnMut(&Self, Position) -> String,
    ) -> fmt::Result {
        let (rows, cols) = self.printable_size();
        for row in 0..rows {
            for col in 0..cols {
                if col > 0 {
                    out.write_char('\t')?;
                }
                let has_payload = self
                    .cells
                    .get(&Position::new(row, col))
                    .is_some_and(|c| !c.is_empty_payload());
                if has_payload {
                    out.write_str(&render(self, Position::new(row, col)))?;
                }
            }
            out.write_char('\n')?;
        }
        Ok(())
    }

    fn add_dependent_edge(&mut self, target: Position, dependent: Position) {
        self.cells
            .entry(target)
            .or_insert_with(Cell::empty)
            .add_dependent(dependent);
    }

    fn remove_dependent_edge(&mut self, target: Position, dependent: Position) {
        if let Some(cell) = self.cells.get_mut(&target) {
            cell.remove_dependent(dependent);
        }
    }

    /// DFS over the *existing* dependent graph starting from each of
    /// `new_refs`, checking whether it ever reaches `pos` — i.e. whether
    /// installing `pos -> new_refs` would close a cycle. Run entirely
    /// before any mutation, so a positive result aborts `set_cell` with
    /// nothing changed. This also catches a bare self-reference (`pos`
    /// appearing in `new_refs`) as a zero-length cycle, so no separate
    /// check is needed for that case.
    fn check_acyclic(&self, pos: Position, new_refs: &[Position]) -> Result<(), SheetError> {
        if new_refs.contains(&pos) {
            return Err(SheetError::CircularDependency(pos));
        }
        let mut visited = FxHashSet::default();
        let mut stack: Vec<Position> = new_refs.to_vec();
        while let Some(current) = stack.pop() {
            if current == pos {
                return Err(SheetError::CircularDependency(current));
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(cell) = self.cells.get(&current) {
                stack.extend(cell.get_referenced_cells().iter().copied());
            }
        }
        Ok(())
    }

    /// Clears the memoized value of every cell reachable from `pos` via
    /// dependent edges (BFS, visited-set guarded so a diamond-shaped
    /// dependency graph only ever invalidates each cell once).
    fn invalidate_dependents(&mut self, pos: Position) {
        let mut visited: FxHashSet<Position> = FxHashSet::default();
        let mut queue: Vec<Position> = self
            .cells
            .get(&pos)
            .map(|c| c.dependents().iter().copied().collect())
            .unwrap_or_default();
        while let Some(current) = queue.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(cell) = self.cells.get(&current) {
                cell.clear_cache();
                trace!(%current, "invalidated");
                queue.extend(cell.dependents().iter().copied());
            }
        }
    }
}


#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        /// A plain integer stored anywhere on the grid reads back as exactly
        /// that number, whichever position it lands on.
        #[test]
        fn plain_integers_round_trip_through_a_cell(
            row in 0u32..100,
            col in 0u32..100,
            n in -1_000_000i64..1_000_000,
        ) {
            let mut sheet = Sheet::new();
            let p = Position::new(row, col);
            sheet.set_cell(p, &n.to_string()).unwrap();
            prop_assert_eq!(sheet.get_cell(p).unwrap(), Value::Number(n as f64));
        }

        /// Reading a cell twice without an intervening write always agrees
        /// with itself, whether the payload is a plain value or a formula.
        #[test]
        fn repeated_reads_are_idempotent(a in -1000i64..1000, b in -1000i64..1000) {
            let mut sheet = Sheet::new();
            sheet.set_cell(pos(0, 0), &a.to_string()).unwrap();
            sheet.set_cell(pos(0, 1), &b.to_string()).unwrap();
            sheet.set_cell(pos(0, 2), "=A1+B1").unwrap();
            let first = sheet.get_cell(pos(0, 2)).unwrap();
            let second = sheet.get_cell(pos(0, 2)).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
