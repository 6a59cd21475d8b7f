//! Run creation and coalescing under append-then-overwrite traffic.

mod common;

use common::*;
use core_cell::{CellAttributes, Cursor, Row};

fn push_row(attrs: &[CellAttributes]) -> Row {
    let mut r = Row::new();
    for &a in attrs {
        r.append(a, ' ', 1);
    }
    r
}

fn replace_at(r: &mut Row, x: u32, attrs: CellAttributes) {
    let mut c = Cursor::new(x);
    r.update_cursor(&mut c, &eng());
    r.replace(&mut c, attrs, ' ', 1, &eng());
}

#[test]
fn default_append_creates_no_run() {
    let r = push_row(&[CellAttributes::default()]);
    assert!(r.ranges().is_empty());
}

#[test]
fn attributed_append_creates_run() {
    let r = push_row(&[flags(1)]);
    assert_eq!(r.ranges(), &[range(0, 0, flags(1))]);
}

#[test]
fn equal_appends_coalesce() {
    let r = push_row(&[flags(1), flags(1)]);
    assert_eq!(r.ranges(), &[range(0, 1, flags(1))]);
}

#[test]
fn default_then_attributed() {
    let r = push_row(&[CellAttributes::default(), flags(1)]);
    assert_eq!(r.ranges(), &[range(1, 1, flags(1))]);
}

#[test]
fn attributed_then_default() {
    let r = push_row(&[flags(1), CellAttributes::default()]);
    assert_eq!(r.ranges(), &[range(0, 0, flags(1))]);
}

#[test]
fn gap_between_runs_survives() {
    let r = push_row(&[flags(1), CellAttributes::default(), flags(1)]);
    assert_eq!(r.ranges(), &[range(0, 0, flags(1)), range(2, 2, flags(1))]);
}

#[test]
fn replace_in_default_field() {
    let mut r = push_row(&[CellAttributes::default(); 3]);
    replace_at(&mut r, 1, flags(1));
    assert_eq!(r.ranges(), &[range(1, 1, flags(1))]);
}

#[test]
fn replace_bridges_equal_neighbors() {
    let mut r = push_row(&[flags(1), CellAttributes::default(), flags(1)]);
    replace_at(&mut r, 1, flags(1));
    assert_eq!(r.ranges(), &[range(0, 2, flags(1))]);
}

#[test]
fn replace_extends_run_leftward() {
    let mut r = push_row(&[flags(1), CellAttributes::default(), CellAttributes::default()]);
    replace_at(&mut r, 1, flags(1));
    assert_eq!(r.ranges(), &[range(0, 1, flags(1))]);
}

#[test]
fn replace_extends_run_rightward() {
    let mut r = push_row(&[CellAttributes::default(), CellAttributes::default(), flags(1)]);
    replace_at(&mut r, 1, flags(1));
    assert_eq!(r.ranges(), &[range(1, 2, flags(1))]);
}

#[test]
fn replace_at_front_of_run() {
    let mut r = push_row(&[CellAttributes::default(); 3]);
    replace_at(&mut r, 0, flags(1));
    assert_eq!(r.ranges(), &[range(0, 0, flags(1))]);
}

#[test]
fn overwrite_changes_run_attrs() {
    let mut r = push_row(&[flags(1), flags(1), flags(1)]);
    replace_at(&mut r, 1, flags(2));
    assert_eq!(
        r.ranges(),
        &[
            range(0, 0, flags(1)),
            range(1, 1, flags(2)),
            range(2, 2, flags(1)),
        ]
    );
}

#[test]
fn overwrite_back_to_default_opens_gap() {
    let mut r = push_row(&[flags(1), flags(1), flags(1)]);
    replace_at(&mut r, 1, CellAttributes::default());
    assert_eq!(r.ranges(), &[range(0, 0, flags(1)), range(2, 2, flags(1))]);
}

#[test]
fn wide_fill_coalesces_adjacent_wide_runs() {
    let mut r = Row::new();
    r.append(flags(1), '\u{FFE6}', 2);
    r.append(flags(1), '\u{FFE6}', 2);
    assert_eq!(r.ranges(), &[range(0, 3, dwf(1))]);
}

#[test]
fn wide_over_narrow_fill() {
    let mut r = push_row(&[flags(1); 4]);
    let mut c = Cursor::new(1);
    r.update_cursor(&mut c, &eng());
    r.replace(&mut c, flags(1), '\u{FFE6}', 2, &eng());
    assert_eq!(r.text(), format!(" {DW} "));
    assert_eq!(
        r.ranges(),
        &[
            range(0, 0, flags(1)),
            range(1, 2, dwf(1)),
            range(3, 3, flags(1)),
        ]
    );
}
