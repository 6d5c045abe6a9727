//! The three-variant cell payload, its cache, and its dependency edges.

use std::cell::RefCell;

use cellforge_common::{Position, Value};
use cellforge_parse::FormulaException;
use rustc_hash::FxHashSet;

use crate::formula::Formula;
use crate::sheet::Sheet;

#[derive(Debug, Clone)]
enum Payload {
    Empty,
    Text(String),
    Formula(Formula),
}

/// One sheet cell: its payload, its memoized value, and the positions that
/// reference it (inbound edges). Forward edges (the positions *it*
/// references) live on the `Formula` payload itself — an `Empty` or `Text`
/// cell always has none.
#[derive(Debug, Clone)]
pub struct Cell {
    payload: Payload,
    cache: RefCell<Option<Value>>,
    dependents: FxHashSet<Position>,
}

impl Cell {
    pub fn empty() -> Self {
        Cell {
            payload: Payload::Empty,
            cache: RefCell::new(None),
            dependents: FxHashSet::default(),
        }
    }

    /// Build a fresh cell from stored text. `text` empty installs an Empty
    /// payload; a leading `=` (with more than one character) parses a
    /// formula — parse failures are surfaced as [`FormulaException`] and
    /// must not mutate anything the caller already owns. Otherwise the
    /// payload is Text, stored verbatim (including any leading `'`).
    pub fn new(text: &str) -> Result<Self, FormulaException> {
        let payload = if text.is_empty() {
            Payload::Empty
        } else if text.starts_with('=') && text.len() > 1 {
            Payload::Formula(Formula::parse(&text[1..])?)
        } else {
            Payload::Text(text.to_string())
        };
        Ok(Cell {
            payload,
            cache: RefCell::new(None),
            dependents: FxHashSet::default(),
        })
    }

    pub fn is_empty_payload(&self) -> bool {
        matches!(self.payload, Payload::Empty)
    }

    /// Payload becomes Empty; the cell object itself (and its dependents
    /// set) survives so reverse edges still have a home.
    pub(crate) fn clear_payload_to_empty(&mut self) {
        self.payload = Payload::Empty;
        self.cache = RefCell::new(None);
    }

    /// Cached value on hit; otherwise computes, caches, and returns it.
    /// `sheet` is only consulted for a Formula payload.
    pub fn get_value(&self, sheet: &Sheet) -> Value {
        if let Some(v) = self.cache.borrow().as_ref() {
            return v.clone();
        }
        let value = match &self.payload {
            Payload::Empty => Value::empty(),
            Payload::Text(s) => Value::Text(s.strip_prefix('\'').unwrap_or(s).to_string()),
            Payload::Formula(f) => match f.evaluate(sheet) {
                Ok(n) => Value::Number(n),
                Err(e) => Value::Error(e),
            },
        };
        *self.cache.borrow_mut() = Some(value.clone());
        value
    }

    /// Raw stored text; a Formula prints as `"=" + canonical_expression`.
    pub fn get_text(&self) -> String {
        match &self.payload {
            Payload::Empty => String::new(),
            Payload::Text(s) => s.clone(),
            Payload::Formula(f) => format!("={}", f.expression()),
        }
    }

    /// Forward edges: positions this cell's own formula references.
    pub fn get_referenced_cells(&self) -> &[Position] {
        match &self.payload {
            Payload::Formula(f) => f.referenced_cells(),
            Payload::Empty | Payload::Text(_) => &[],
        }
    }

    pub fn clear_cache(&self) {
        *self.cache.borrow_mut() = None;
    }

    pub fn dependents(&self) -> &FxHashSet<Position> {
        &self.dependents
    }

    pub(crate) fn add_dependent(&mut self, pos: Position) {
        self.dependents.insert(pos);
    }

    pub(crate) fn remove_dependent(&mut self, pos: Position) {
        self.dependents.remove(&pos);
    }

    pub(crate) fn set_dependents(&mut self, dependents: FxHashSet<Position>) {
        self.dependents = dependents;
    }
}
