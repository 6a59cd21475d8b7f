//! Column-keyed extraction without cluster splitting.

mod common;

use common::*;

#[test]
fn front_substr() {
    let r = row(&full_str(), 9, 14);
    assert_eq!(r.substr(0, 1, &eng()), format!("a{CMB}"));
}

#[test]
fn back_substr() {
    let r = row(&full_str(), 9, 14);
    assert_eq!(r.substr_to_end(13, &eng()), "b");
    assert_eq!(r.substr(13, 14, &eng()), "b");
}

#[test]
fn mid_substr() {
    let r = row(&full_str(), 9, 14);
    assert_eq!(
        r.substr(5, 9, &eng()),
        format!("b{}a{CMB}", mid_str())
    );
}

#[test]
fn full_substr() {
    let r = row(&full_str(), 9, 14);
    assert_eq!(r.substr_to_end(0, &eng()), full_str());
    assert_eq!(r.substr(0, 14, &eng()), full_str());
}

#[test]
fn start_on_right_half_excludes_cluster() {
    let r = row(&full_str(), 9, 14);
    // Columns 1..2 are the first wide cluster; starting at 2 must skip it.
    assert_eq!(r.substr(2, 5, &eng()), format!("{DW}{CMB}"));
}

#[test]
fn end_on_left_half_includes_cluster() {
    let r = row(&full_str(), 9, 14);
    assert_eq!(r.substr(0, 2, &eng()), format!("a{CMB}{DW}{CMB}"));
}

#[test]
fn empty_interval() {
    let r = row(&full_str(), 9, 14);
    assert_eq!(r.substr(0, 0, &eng()), "");
    assert_eq!(r.substr(5, 5, &eng()), "");
}

#[test]
fn past_the_end() {
    let r = row(&full_str(), 9, 14);
    assert_eq!(r.substr_to_end(14, &eng()), "");
    assert_eq!(r.substr(14, 14, &eng()), "");
}

#[test]
fn empty_row() {
    let r = row("", 0, 0);
    assert_eq!(r.substr_to_end(0, &eng()), "");
    assert_eq!(r.substr(0, 0, &eng()), "");
}

#[test]
fn append_history_round_trips() {
    use core_cell::CellAttributes;
    let mut r = core_cell::Row::new();
    r.append(CellAttributes::default(), 'a', 1);
    r.append(CellAttributes::default(), 'b', 1);
    r.append(CellAttributes::default(), '\u{FFE6}', 2);
    r.append(CellAttributes::default(), 'c', 1);
    assert_eq!(r.substr(0, 5, &eng()), format!("ab{DW}c"));
}
