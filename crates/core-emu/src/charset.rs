//! Character-set designation and invocation.
//!
//! Four slots (G0–G3) hold designated tables; `left` and `right` name the
//! slots invoked into GL (0x20–0x7F) and GR (0xA0–0xFF). A combined
//! 256-entry window is rebuilt whenever an invocation changes, so the hot
//! `map()` path is a single array load. A single shift overrides GL for
//! exactly one mapped character.
//!
//! Tables map 128 input positions to codepoints; a zero entry passes the
//! input through unchanged.

/// A designated table. Tables are immutable static data; slots hold
/// references.
pub type Charset = &'static [u32; 128];

/// US-ASCII / identity: everything passes through.
pub static UNITED_STATES: &[u32; 128] = &[0; 128];

/// ISO Latin-1 for 96-character designations: identity over GR.
pub static LATIN_1: &[u32; 128] = &[0; 128];

/// United Kingdom: '#' renders as the pound sign.
pub static UNITED_KINGDOM: &[u32; 128] = &{
    let mut t = [0u32; 128];
    t[0x23] = 0x00A3;
    t
};

/// DEC Special Graphics (line drawing), designated with final byte '0'.
pub static DEC_SPECIAL_GRAPHICS: &[u32; 128] = &{
    let mut t = [0u32; 128];
    t[0x5f] = 0x00A0; // blank
    t[0x60] = 0x25C6; // diamond
    t[0x61] = 0x2592; // checker board
    t[0x62] = 0x2409; // HT symbol
    t[0x63] = 0x240C; // FF symbol
    t[0x64] = 0x240D; // CR symbol
    t[0x65] = 0x240A; // LF symbol
    t[0x66] = 0x00B0; // degree
    t[0x67] = 0x00B1; // plus/minus
    t[0x68] = 0x2424; // NL symbol
    t[0x69] = 0x240B; // VT symbol
    t[0x6a] = 0x2518; // lower right corner
    t[0x6b] = 0x2510; // upper right corner
    t[0x6c] = 0x250C; // upper left corner
    t[0x6d] = 0x2514; // lower left corner
    t[0x6e] = 0x253C; // crossing lines
    t[0x6f] = 0x23BA; // scan line 1
    t[0x70] = 0x23BB; // scan line 3
    t[0x71] = 0x2500; // horizontal line
    t[0x72] = 0x23BC; // scan line 7
    t[0x73] = 0x23BD; // scan line 9
    t[0x74] = 0x251C; // left tee
    t[0x75] = 0x2524; // right tee
    t[0x76] = 0x2534; // bottom tee
    t[0x77] = 0x252C; // top tee
    t[0x78] = 0x2502; // vertical line
    t[0x79] = 0x2264; // less than or equal
    t[0x7a] = 0x2265; // greater than or equal
    t[0x7b] = 0x03C0; // pi
    t[0x7c] = 0x2260; // not equal
    t[0x7d] = 0x00A3; // pound sign
    t[0x7e] = 0x00B7; // centered dot
    t
};

/// Table for a 94-character designation final byte.
pub fn charset_94(designator: char) -> Charset {
    match designator {
        'A' => UNITED_KINGDOM,
        '0' => DEC_SPECIAL_GRAPHICS,
        _ => UNITED_STATES,
    }
}

/// Table for a 96-character designation final byte.
pub fn charset_96(_designator: char) -> Charset {
    LATIN_1
}

#[derive(Clone)]
pub struct CharsetMap {
    charsets: [Charset; 4],
    left: usize,
    right: usize,
    next_left: Option<usize>,
    left_set: Charset,
    right_set: Charset,
    set: [u32; 256],
}

impl std::fmt::Debug for CharsetMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharsetMap")
            .field("left", &self.left)
            .field("right", &self.right)
            .field("next_left", &self.next_left)
            .finish()
    }
}

impl Default for CharsetMap {
    fn default() -> Self {
        CharsetMap::new(
            0,
            1,
            [UNITED_STATES, UNITED_STATES, UNITED_STATES, UNITED_STATES],
        )
    }
}

impl CharsetMap {
    pub fn new(left: usize, right: usize, charsets: [Charset; 4]) -> Self {
        let mut map = CharsetMap {
            charsets,
            left,
            right,
            next_left: None,
            left_set: UNITED_STATES,
            right_set: UNITED_STATES,
            set: [0; 256],
        };
        map.load_left(map.charsets[left]);
        map.load_right(map.charsets[right]);
        map
    }

    fn load_left(&mut self, charset: Charset) {
        for (i, slot) in self.set[..128].iter_mut().enumerate() {
            let c = charset[i];
            *slot = if c != 0 { c } else { i as u32 };
        }
        self.left_set = charset;
    }

    fn load_right(&mut self, charset: Charset) {
        for (i, slot) in self.set[128..].iter_mut().enumerate() {
            let c = charset[i];
            *slot = if c != 0 { c } else { (i + 128) as u32 };
        }
        self.right_set = charset;
    }

    pub fn charsets(&self) -> &[Charset; 4] {
        &self.charsets
    }

    pub fn left(&self) -> usize {
        self.left
    }

    pub fn right(&self) -> usize {
        self.right
    }

    pub fn next_left(&self) -> Option<usize> {
        self.next_left
    }

    /// Designate a table into a slot, reloading whichever window has that
    /// slot invoked.
    pub fn set_charset(&mut self, slot: usize, charset: Charset) {
        if !std::ptr::eq(self.charsets[slot], charset) {
            self.charsets[slot] = charset;
            if self.left == slot {
                self.load_left(charset);
            }
            if self.right == slot {
                self.load_right(charset);
            }
        }
    }

    /// Restore a complete designation/invocation state (saved cursor).
    pub fn set_all(
        &mut self,
        charsets: [Charset; 4],
        left: usize,
        right: usize,
        next_left: Option<usize>,
    ) {
        self.charsets = charsets;

        self.left = left;
        if !std::ptr::eq(self.left_set, self.charsets[left]) {
            self.load_left(self.charsets[left]);
        }

        self.right = right;
        if !std::ptr::eq(self.right_set, self.charsets[right]) {
            self.load_right(self.charsets[right]);
        }

        self.next_left = next_left;
    }

    pub fn set_left(&mut self, slot: usize) {
        if self.left != slot {
            self.left = slot;
            if !std::ptr::eq(self.left_set, self.charsets[slot]) {
                self.load_left(self.charsets[slot]);
            }
        }
    }

    pub fn set_right(&mut self, slot: usize) {
        if self.right != slot {
            self.right = slot;
            if !std::ptr::eq(self.right_set, self.charsets[slot]) {
                self.load_right(self.charsets[slot]);
            }
        }
    }

    /// One-shot GL override: the next mapped character uses `slot`, after
    /// which GL reverts.
    pub fn set_single_left(&mut self, slot: usize) {
        self.next_left = Some(self.left);
        self.set_left(slot);
    }

    /// Translate a codepoint through the active window, applying a pending
    /// single shift exactly once.
    pub fn map(&mut self, c: u32) -> u32 {
        let result = if c < 256 { self.set[c as usize] } else { c };
        if let Some(revert) = self.next_left.take() {
            self.set_left(revert);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_by_default() {
        let mut m = CharsetMap::default();
        assert_eq!(m.map('a' as u32), 'a' as u32);
        assert_eq!(m.map(0x2500), 0x2500);
    }

    #[test]
    fn dec_graphics_maps_gl() {
        let mut m = CharsetMap::default();
        m.set_charset(0, DEC_SPECIAL_GRAPHICS);
        assert_eq!(m.map('q' as u32), 0x2500);
        // Codepoints above the byte range pass through untouched.
        assert_eq!(m.map(0x1F600), 0x1F600);
    }

    #[test]
    fn single_shift_reverts_after_one_char() {
        let mut m = CharsetMap::default();
        m.set_charset(2, DEC_SPECIAL_GRAPHICS);
        m.set_single_left(2);
        assert_eq!(m.map('q' as u32), 0x2500);
        assert_eq!(m.map('q' as u32), 'q' as u32);
    }

    #[test]
    fn designating_inactive_slot_leaves_window() {
        let mut m = CharsetMap::default();
        m.set_charset(1, DEC_SPECIAL_GRAPHICS);
        assert_eq!(m.map('q' as u32), 'q' as u32);
        m.set_left(1);
        assert_eq!(m.map('q' as u32), 0x2500);
    }
}
