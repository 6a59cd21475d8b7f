//! Cell attribute value types.
//!
//! `CellAttributes` is an invariant value: equality is bitwise, and a row
//! stores one per attribute run, not per cell. The `DBL_WIDTH_CHAR` flag is
//! storage metadata marking the run over a double-width cluster; everything
//! else is rendition or semantic state set by the emulator.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttrFlags: u32 {
        const BOLD           = 1 << 0;
        const FAINT          = 1 << 1;
        const ITALIC         = 1 << 2;
        const UNDERLINE      = 1 << 3;
        const BLINK          = 1 << 4;
        const INVERSE        = 1 << 5;
        const INVISIBLE      = 1 << 6;
        const STRIKETHROUGH  = 1 << 7;
        /// Left half of a double-width cluster; the run spans both columns.
        const DBL_WIDTH_CHAR = 1 << 8;
        /// DECSCA protected cell, skipped by selective erase.
        const PROTECTED      = 1 << 9;
        /// Shell integration markers (OSC 133).
        const PROMPT_MARKER  = 1 << 10;
        const COMMAND_MARKER = 1 << 11;
        /// Client-side annotation and search-hit markers.
        const ANNOTATION     = 1 << 12;
        const SEARCH_HIT     = 1 << 13;
    }
}

/// Foreground or background color: the terminal default, a palette index,
/// or a direct RGB value from SGR 38/48;2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellAttributes {
    pub flags: AttrFlags,
    pub fg: Color,
    pub bg: Color,
    /// DECSCA protection class (0 when unset).
    pub protection: u8,
    /// Hyperlink id assigned by the emulator's link table (0 = none).
    pub link: u32,
}

impl CellAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when every field is at its default; such cells are stored as
    /// run gaps rather than explicit runs.
    #[inline]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn with_flags(flags: AttrFlags) -> Self {
        CellAttributes {
            flags,
            ..Self::default()
        }
    }
}

/// One attribute run: an inclusive column interval sharing one attribute
/// value. Runs are kept sorted, disjoint, and coalesced: two adjacent runs
/// never carry equal attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrRange {
    pub start: u32,
    /// Inclusive end column.
    pub end: u32,
    pub attrs: CellAttributes,
}

impl AttrRange {
    pub fn new(start: u32, end: u32, attrs: CellAttributes) -> Self {
        AttrRange { start, end, attrs }
    }
}
