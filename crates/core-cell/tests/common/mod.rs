//! Shared fixtures for the row test suite.

#![allow(dead_code)]

use core_cell::{AttrFlags, AttrRange, CellAttributes, Color, Cursor, Row};
use core_unicode::WidthEngine;

/// Latin capital O with diaeresis: multi-byte, single width.
pub const SW: &str = "\u{00D6}";
/// Fullwidth won sign: double width.
pub const DW: &str = "\u{FFE6}";
/// Combining grave accent.
pub const CMB: &str = "\u{0300}";
/// Playing card black joker: graphic emoji, double width.
pub const PEMO: &str = "\u{1F0CF}";
/// '#' promoted to emoji presentation by VS16.
pub const TEMO: &str = "#\u{FE0F}";
/// ZWJ + '#': joins onto a preceding emoji cluster.
pub const ECMB: &str = "\u{200D}#";
/// White up pointing index + skin tone modifier.
pub const MEMO: &str = "\u{261D}\u{1F3FB}";

/// 4 clusters over 6 columns with combiners on both wide clusters.
pub fn half_str() -> String {
    format!("a{CMB}{DW}{CMB}{DW}{CMB}b")
}

/// 1 cluster over 2 columns with a combiner tail.
pub fn mid_str() -> String {
    format!("{DW}{CMB}{CMB}{CMB}")
}

/// 9 clusters over 14 columns.
pub fn full_str() -> String {
    format!("{}{}{}", half_str(), mid_str(), half_str())
}

pub fn eng() -> WidthEngine {
    WidthEngine::new()
}

pub fn row(text: &str, clusters: u32, columns: u32) -> Row {
    Row::restore(text, clusters, columns)
}

pub fn cursor_at(row: &Row, x: u32) -> Cursor {
    let mut c = Cursor::new(x);
    row.update_cursor(&mut c, &eng());
    c
}

/// Attributes carrying raw rendition flag bits (1 = bold, 2 = faint).
pub fn flags(bits: u32) -> CellAttributes {
    CellAttributes::with_flags(AttrFlags::from_bits_truncate(bits))
}

/// Flag bits plus the double-width marker.
pub fn dwf(bits: u32) -> CellAttributes {
    CellAttributes::with_flags(
        AttrFlags::from_bits_truncate(bits) | AttrFlags::DBL_WIDTH_CHAR,
    )
}

/// Flag bits plus indexed colors, for runs that must not coalesce.
pub fn colored(bits: u32, fg: u8, bg: u8) -> CellAttributes {
    CellAttributes {
        flags: AttrFlags::from_bits_truncate(bits),
        fg: Color::Indexed(fg),
        bg: Color::Indexed(bg),
        ..CellAttributes::default()
    }
}

pub fn range(start: u32, end: u32, attrs: CellAttributes) -> AttrRange {
    AttrRange::new(start, end, attrs)
}
