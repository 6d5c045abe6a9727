//! End-to-end scenarios exercising `Sheet` as a user of the crate would:
//! through `set_cell`/`get_cell`/`clear_cell` and the two print dumps only.

use cellforge_engine::{Position, Sheet, SheetError, Value};

fn pos(row: u32, col: u32) -> Position {
    Position::new(row, col)
}

/// S1: a formula referencing plain-number cells evaluates arithmetically.
#[test]
fn basic_arithmetic_composition() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos(0, 0), "2").unwrap();
    sheet.set_cell(pos(0, 1), "3").unwrap();
    sheet.set_cell(pos(0, 2), "=A1*B1+1").unwrap();
    assert_eq!(sheet.get_cell(pos(0, 2)).unwrap(), Value::Number(7.0));
}

/// S2: editing a leaf cell invalidates every cell downstream of it,
/// including through a multi-hop chain, without touching unrelated cells.
#[test]
fn reference_chain_invalidation() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos(0, 0), "10").unwrap();
    sheet.set_cell(pos(0, 1), "=A1+1").unwrap();
    sheet.set_cell(pos(0, 2), "=B1*2").unwrap();
    sheet.set_cell(pos(1, 0), "unrelated").unwrap();

    assert_eq!(sheet.get_cell(pos(0, 2)).unwrap(), Value::Number(22.0));
    sheet.set_cell(pos(0, 0), "100").unwrap();
    assert_eq!(sheet.get_cell(pos(0, 1)).unwrap(), Value::Number(101.0));
    assert_eq!(sheet.get_cell(pos(0, 2)).unwrap(), Value::Number(202.0));
    assert_eq!(
        sheet.get_cell(pos(1, 0)).unwrap(),
        Value::Text("unrelated".to_string())
    );
}

/// S3: a leading apostrophe forces text, stripped only from the value.
#[test]
fn leading_apostrophe_forces_text() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos(0, 0), "'42").unwrap();
    assert_eq!(sheet.get_cell(pos(0, 0)).unwrap(), Value::Text("42".to_string()));
    assert_eq!(sheet.get_cell_text(pos(0, 0)).unwrap(), "'42");

    // And a formula referencing it sees the '#VALUE!' coercion rule, since
    // "42" itself (after the apostrophe is stripped) is a valid integer and
    // does coerce -- use genuinely non-numeric text to hit the error path.
    sheet.set_cell(pos(0, 1), "'abc").unwrap();
    sheet.set_cell(pos(0, 2), "=B1+1").unwrap();
    assert!(sheet.get_cell(pos(0, 2)).unwrap().is_error());
}

/// S4: direct and indirect cycles are both rejected, and rejection leaves
/// the sheet untouched.
#[test]
fn cycle_rejection_is_atomic() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos(0, 0), "1").unwrap();
    sheet.set_cell(pos(0, 1), "=A1").unwrap();
    sheet.set_cell(pos(0, 2), "=B1").unwrap();

    let before = snapshot(&sheet);
    let err = sheet.set_cell(pos(0, 0), "=C1").unwrap_err();
    assert!(matches!(err, SheetError::CircularDependency(_)));
    assert_eq!(snapshot(&sheet), before);

    let err = sheet.set_cell(pos(0, 0), "=A1").unwrap_err();
    assert_eq!(err, SheetError::CircularDependency(pos(0, 0)));
}

/// S5: division by zero and an out-of-range reference both surface as
/// sheet-visible errors that themselves propagate through further formulas.
#[test]
fn error_propagation() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos(0, 0), "=1/0").unwrap();
    sheet.set_cell(pos(0, 1), "=XFE1").unwrap();
    sheet.set_cell(pos(0, 2), "=A1+B1").unwrap();
    assert!(sheet.get_cell(pos(0, 0)).unwrap().is_error());
    assert!(sheet.get_cell(pos(0, 1)).unwrap().is_error());
    assert!(sheet.get_cell(pos(0, 2)).unwrap().is_error());
}

/// S6: clearing a cell sets it back to implicit-empty (readable as `""`
/// text or `0.0` through a referencing formula), and the printable count
/// drops even though dependents keep their reverse edge alive.
#[test]
fn clear_restores_implicit_empty() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos(0, 0), "7").unwrap();
    sheet.set_cell(pos(0, 1), "=A1+1").unwrap();
    assert_eq!(sheet.printable_size(), (1, 2));

    sheet.clear_cell(pos(0, 0)).unwrap();
    assert_eq!(sheet.get_cell(pos(0, 0)).unwrap(), Value::empty());
    assert_eq!(sheet.get_cell(pos(0, 1)).unwrap(), Value::Number(1.0));
    // A1 no longer counts, but B1 still occupies column 1, so the
    // rectangle's width is unchanged; only a height-or-width change from
    // the cleared cell itself would shrink it.
    assert_eq!(sheet.printable_size(), (1, 2));

    assert!(sheet.clear_cell(pos(5, 5)).is_ok());
}

/// S7: a syntactically valid but out-of-grid reference is kept by the
/// parser (not rejected outright) and only turns into an error at
/// evaluation time.
#[test]
fn out_of_range_reference_is_kept_until_evaluation() {
    let mut sheet = Sheet::new();
    assert!(sheet.set_cell(pos(0, 0), "=XFE1+1").is_ok());
    assert!(sheet.get_cell(pos(0, 0)).unwrap().is_error());
}

#[test]
fn print_values_and_print_texts_agree_on_installed_positions() {
    let mut sheet = Sheet::new();
    sheet.set_cell(pos(0, 0), "5").unwrap();
    sheet.set_cell(pos(1, 0), "=A1*2").unwrap();

    let mut values = String::new();
    sheet.print_values(&mut values).unwrap();
    assert_eq!(values, "5\n10\n");

    let mut texts = String::new();
    sheet.print_texts(&mut texts).unwrap();
    assert_eq!(texts, "5\n=A1*2\n");
}

fn snapshot(sheet: &Sheet) -> String {
    let mut out = String::new();
    sheet.print_texts(&mut out).unwrap();
    out
}
