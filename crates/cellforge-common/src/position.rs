//! `A1`-style cell coordinates.
//!
//! A [`Position`] is a 0-based `(row, col)` pair. Columns use the spreadsheet
//! bijective base-26 alphabet (`A=0, B=1, ..., Z=25, AA=26, ...`); rows are
//! printed 1-based. Both axes are bounded the way a worksheet's address space
//! is: `A1` through `XFD16384`.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One past the largest valid row or column index on either axis.
pub const MAX_INDEX: u32 = 16_384;

/// Errors that can occur while parsing or constructing a [`Position`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PositionError {
    /// The text did not match `[A-Z]+[1-9][0-9]*`.
    Malformed,
    /// The column letters decoded to a column index wider than a `u32` can
    /// hold. Unrelated to `MAX_INDEX` — callers that need grid bounds use
    /// [`Position::is_valid`] instead.
    ColumnOutOfRange,
    /// The row number, once converted to 0-based, is wider than a `u32` can
    /// hold. Unrelated to `MAX_INDEX` — callers that need grid bounds use
    /// [`Position::is_valid`] instead.
    RowOutOfRange,
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionError::Malformed => write!(f, "not a valid cell address"),
            PositionError::ColumnOutOfRange => write!(f, "column index overflows u32"),
            PositionError::RowOutOfRange => write!(f, "row index overflows u32"),
        }
    }
}

impl std::error::Error for PositionError {}

/// A 0-based `(row, col)` cell coordinate.
///
/// `Position` is a plain value type: positions are compared and hashed by
/// value, never by identity, so cells can be replaced in place without
/// invalidating anything that refers to them by position.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

impl Position {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Whether both axes fall inside `[0, MAX_INDEX)`.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.row < MAX_INDEX && self.col < MAX_INDEX
    }

    /// Parse strict `A1`-style text: uppercase column letters followed by a
    /// 1-based row with no leading zero.
    ///
    /// Returns `Ok` even for syntactically valid but out-of-range addresses
    /// (e.g. one column past `XFD`); callers that need strict bounds should
    /// additionally check [`Position::is_valid`]. This mirrors the formula
    /// grammar's "kept, evaluates to `#REF!`" rule for references.
    pub fn parse(text: &str) -> Result<Self, PositionError> {
        let bytes = text.as_bytes();
        let split = bytes.iter().position(|b| !b.is_ascii_uppercase());
        let split = match split {
            Some(0) => return Err(PositionError::Malformed),
            Some(i) => i,
            None => return Err(PositionError::Malformed), // no digits at all
        };
        let (letters, digits) = text.split_at(split);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PositionError::Malformed);
        }
        if digits.as_bytes()[0] == b'0' {
            // a leading zero is rejected by the `[1-9][0-9]*` grammar,
            // including the single-digit "0" case.
            return Err(PositionError::Malformed);
        }

        let col = letters_to_column_index(letters).ok_or(PositionError::ColumnOutOfRange)?;
        let row1: u64 = digits.parse().map_err(|_| PositionError::Malformed)?;
        let row: u32 = (row1 - 1)
            .try_into()
            .map_err(|_| PositionError::RowOutOfRange)?;
        Ok(Self::new(row, col))
    }
}

impl fmt::Display for Position {
    /// Formats as `A1`-style text. Unspecified (but harmless) for positions
    /// outside `[0, MAX_INDEX)` — the core never calls this on such a
    /// position.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_to_letters(self.col), self.row + 1)
    }
}

pub fn column_to_letters(mut col: u32) -> String {
    let mut buf = Vec::new();
    loop {
        let rem = (col % 26) as u8;
        buf.push(b'A' + rem);
        col /= 26;
        if col == 0 {
            break;
        }
        col -= 1;
    }
    buf.reverse();
    String::from_utf8(buf).expect("only ASCII A-Z")
}

fn letters_to_column_index(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for (idx, ch) in s.bytes().enumerate() {
        if !ch.is_ascii_uppercase() {
            return None;
        }
        let val = (ch - b'A') as u32;
        col = col.checked_mul(26)?;
        col = col.checked_add(val)?;
        if idx != s.len() - 1 {
            col = col.checked_add(1)?;
        }
    }
    Some(col)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every in-range `(row, col)` survives a format/parse round trip
        /// back to the exact same `Position`, for the whole addressable grid.
        #[test]
        fn format_parse_round_trips(row in 0u32..MAX_INDEX, col in 0u32..MAX_INDEX) {
            let p = Position::new(row, col);
            let text = p.to_string();
            prop_assert_eq!(Position::parse(&text), Ok(p));
        }

        /// The column codec is bijective: decoding what it encoded is a
        /// no-op, for any column in range.
        #[test]
        fn column_letters_round_trip(col in 0u32..MAX_INDEX) {
            let letters = column_to_letters(col);
            prop_assert_eq!(letters_to_column_index(&letters), Some(col));
        }
    }
}
