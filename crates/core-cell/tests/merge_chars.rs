//! Cluster removal with column bookkeeping left to the caller.
//!
//! `merge_chars` drops one cluster and its combiner tail; `columns` and
//! the runs are deliberately untouched; the caller owns the compensation.

mod common;

use common::*;

#[test]
fn single_width_merge() {
    let mut r = row("aa", 2, 2);
    r.merge_chars(0, 0, &eng());
    assert_eq!(r.text(), "a");
    assert_eq!(r.clusters(), 1);
    assert_eq!(r.columns(), 2);
    assert!(r.ranges().is_empty());
}

#[test]
fn merge_takes_the_combiner_tail() {
    let s = format!("{}a{CMB}b{CMB}c", half_str());
    let mut r = row(&s, 7, 9);
    let ptr = half_str().len();
    r.merge_chars(ptr, 6, &eng());
    assert_eq!(r.text(), format!("{}b{CMB}c", half_str()));
    assert_eq!(r.clusters(), 6);
    assert_eq!(r.columns(), 9);
}

#[test]
fn merge_at_end_of_string() {
    let s = format!("{}a{CMB}", half_str());
    let mut r = row(&s, 5, 7);
    let ptr = half_str().len();
    r.merge_chars(ptr, 6, &eng());
    assert_eq!(r.text(), half_str());
    assert_eq!(r.clusters(), 4);
    assert_eq!(r.columns(), 7);
}

#[test]
fn merge_past_end_is_a_no_op() {
    let mut r = row("a", 1, 1);
    r.merge_chars(1, 1, &eng());
    assert_eq!(r.text(), "a");
    assert_eq!(r.clusters(), 1);
}

#[test]
fn merge_of_double_width_keeps_columns() {
    let s = format!("a{DW}{CMB}");
    let mut r = row(&s, 2, 3);
    r.merge_chars(1, 1, &eng());
    assert_eq!(r.text(), "a");
    assert_eq!(r.clusters(), 1);
    assert_eq!(r.columns(), 3);
}

#[test]
fn merge_leaves_runs_alone() {
    let mut r = row("abcd", 4, 4);
    r.set_ranges(vec![range(2, 2, flags(1))]);
    r.merge_chars(1, 1, &eng());
    assert_eq!(r.text(), "acd");
    assert_eq!(r.ranges(), &[range(2, 2, flags(1))]);
}
