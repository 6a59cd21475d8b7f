//! Whole-cluster removal and truncation.

mod common;

use common::*;

#[test]
fn simple_single_byte_remove() {
    let mut r = row("abc", 3, 3);
    r.remove_char(1, 1, &eng());
    assert_eq!(r.text(), "ac");
    assert_eq!((r.columns(), r.clusters()), (2, 2));
    assert!(r.ranges().is_empty());
}

#[test]
fn end_of_string_remove() {
    let mut r = row("abc", 3, 3);
    r.remove_char(2, 2, &eng());
    assert_eq!(r.text(), "ab");
    assert_eq!((r.columns(), r.clusters()), (2, 2));
}

#[test]
fn double_width_remove_takes_both_columns() {
    let s = format!("a{DW}{CMB}{CMB}c");
    let mut r = row(&s, 3, 4);
    r.remove_char(1, 1, &eng());
    assert_eq!(r.text(), "ac");
    assert_eq!((r.columns(), r.clusters()), (2, 2));
}

#[test]
fn double_width_remove_at_end() {
    let s = format!("ab{DW}{CMB}{CMB}");
    let mut r = row(&s, 3, 4);
    r.remove_char(2, 2, &eng());
    assert_eq!(r.text(), "ab");
    assert_eq!((r.columns(), r.clusters()), (2, 2));
}

#[test]
fn remove_on_range_drops_it() {
    let mut r = row("a", 1, 1);
    r.set_ranges(vec![range(0, 0, flags(1))]);
    r.remove_char(0, 0, &eng());
    assert_eq!(r.text(), "");
    assert!(r.ranges().is_empty());
}

#[test]
fn remove_after_range() {
    let s = format!("a{CMB}{SW}{CMB}{CMB}c{CMB}");
    let mut r = row(&s, 3, 3);
    r.set_ranges(vec![range(0, 0, flags(1))]);
    let ptr = "a".len() + CMB.len();
    r.remove_char(ptr, 1, &eng());
    assert_eq!(r.text(), format!("a{CMB}c{CMB}"));
    assert_eq!(r.ranges(), &[range(0, 0, flags(1))]);
}

#[test]
fn remove_before_range() {
    let s = format!("a{CMB}{SW}{CMB}{CMB}c{CMB}");
    let mut r = row(&s, 3, 3);
    r.set_ranges(vec![range(2, 2, flags(1))]);
    let ptr = "a".len() + CMB.len();
    r.remove_char(ptr, 1, &eng());
    assert_eq!(r.text(), format!("a{CMB}c{CMB}"));
    assert_eq!(r.ranges(), &[range(1, 1, flags(1))]);
}

#[test]
fn remove_inside_wide_run_shrinks_it() {
    let s = format!("{DW}{CMB}{DW}{CMB}{CMB}{DW}{CMB}");
    let mut r = row(&s, 3, 6);
    r.set_ranges(vec![range(0, 5, dwf(1))]);
    let ptr = DW.len() + CMB.len();
    r.remove_char(ptr, 2, &eng());
    assert_eq!(r.text(), format!("{DW}{CMB}{DW}{CMB}"));
    assert_eq!((r.columns(), r.clusters()), (4, 2));
    assert_eq!(r.ranges(), &[range(0, 3, dwf(1))]);
}

#[test]
fn remove_between_ranges() {
    let s = format!("{DW}{CMB}{DW}{CMB}{CMB}{DW}{CMB}");
    let mut r = row(&s, 3, 6);
    r.set_ranges(vec![
        range(0, 1, dwf(1)),
        range(2, 3, dwf(0)),
        range(4, 5, dwf(2)),
    ]);
    let ptr = DW.len() + CMB.len();
    r.remove_char(ptr, 2, &eng());
    assert_eq!(r.text(), format!("{DW}{CMB}{DW}{CMB}"));
    assert_eq!(r.ranges(), &[range(0, 1, dwf(1)), range(2, 3, dwf(2))]);
}

#[test]
fn remove_coalesces_equal_ranges() {
    let s = format!("{DW}{CMB}{DW}{CMB}{CMB}{DW}{CMB}");
    let mut r = row(&s, 3, 6);
    r.set_ranges(vec![
        range(0, 1, dwf(1)),
        range(2, 3, dwf(0)),
        range(4, 5, dwf(1)),
    ]);
    let ptr = DW.len() + CMB.len();
    r.remove_char(ptr, 2, &eng());
    assert_eq!(r.ranges(), &[range(0, 3, dwf(1))]);
}

// Truncation via resize.

#[test]
fn pop_back() {
    let mut r = row("abc", 3, 3);
    r.resize(2, &eng());
    assert_eq!(r.text(), "ab");
    assert_eq!((r.columns(), r.clusters()), (2, 2));
}

#[test]
fn pop_back_with_combiner() {
    let s = format!("abc{CMB}");
    let mut r = row(&s, 3, 3);
    r.resize(2, &eng());
    assert_eq!(r.text(), "ab");
    assert_eq!((r.columns(), r.clusters()), (2, 2));
}

#[test]
fn pop_back_double_width_blanks_left_half() {
    let mut r = row(DW, 1, 2);
    r.resize(1, &eng());
    assert_eq!(r.text(), " ");
    assert_eq!((r.columns(), r.clusters()), (1, 1));
}

#[test]
fn pop_back_multi_width() {
    let s = format!("a{DW}{CMB}{CMB}");
    let mut r = row(&s, 2, 3);
    r.resize(2, &eng());
    assert_eq!(r.text(), "a ");
    assert_eq!((r.columns(), r.clusters()), (2, 2));
}

#[test]
fn pop_back_clips_trailing_range() {
    let mut r = row("abc", 3, 3);
    r.set_ranges(vec![range(0, 1, flags(2)), range(2, 2, flags(1))]);
    r.resize(2, &eng());
    assert_eq!(r.text(), "ab");
    assert_eq!(r.ranges(), &[range(0, 1, flags(2))]);
}

#[test]
fn pop_back_shrinks_spanning_range() {
    let mut r = row("abc", 3, 3);
    r.set_ranges(vec![range(0, 0, flags(2)), range(1, 2, flags(1))]);
    r.resize(2, &eng());
    assert_eq!(r.ranges(), &[range(0, 0, flags(2)), range(1, 1, flags(1))]);
}

#[test]
fn pop_back_through_wide_run_clears_marker() {
    let s = format!("{SW}{CMB}{DW}");
    let mut r = row(&s, 2, 3);
    r.set_ranges(vec![range(0, 0, flags(2)), range(1, 2, dwf(1))]);
    r.resize(2, &eng());
    assert_eq!(r.text(), format!("{SW}{CMB} "));
    assert_eq!(r.ranges(), &[range(0, 0, flags(2)), range(1, 1, flags(1))]);
}

#[test]
fn resize_extends_with_blanks() {
    let mut r = row("ab", 2, 2);
    r.resize(5, &eng());
    assert_eq!(r.text(), "ab   ");
    assert_eq!((r.columns(), r.clusters()), (5, 5));
}
