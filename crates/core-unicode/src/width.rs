//! Width classification for codepoints and grapheme clusters.
//!
//! The baseline comes from the `unicode-width` crate (East Asian Width).
//! On top of that a small heuristic classifier handles the emoji
//! composition patterns terminals care about: presentation selectors,
//! keycaps, flags, skin tones and ZWJ sequences. The classifier is biased
//! toward over-estimating width: an extra blank cell is harmless, an
//! under-estimate makes every following cell drift.

use unicode_width::UnicodeWidthChar;

pub(crate) const ZWJ: char = '\u{200D}';
const VS15: char = '\u{FE0E}';
const VS16: char = '\u{FE0F}';
const KEYCAP_COMBINING: char = '\u{20E3}';

pub(crate) fn is_variation_selector(c: char) -> bool {
    ('\u{FE00}'..='\u{FE0F}').contains(&c)
}

pub(crate) fn is_skin_tone_modifier(c: char) -> bool {
    ('\u{1F3FB}'..='\u{1F3FF}').contains(&c)
}

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

/// Rough Extended Pictographic check covering the blocks terminals
/// actually receive: the supplemental emoji planes plus the legacy
/// Miscellaneous Symbols / Dingbats region.
fn is_extended_pictographic(c: char) -> bool {
    ('\u{1F000}'..='\u{1FAFF}').contains(&c) || ('\u{2600}'..='\u{27BF}').contains(&c)
}

/// Zero-width format and bidi controls. They occupy no column but do NOT
/// extend the preceding grapheme, so they must never be treated as
/// combining marks.
fn is_format_control(c: char) -> bool {
    matches!(c,
        '\u{200B}'..='\u{200F}'
        | '\u{2028}'..='\u{202E}'
        | '\u{2060}'..='\u{206F}'
        | '\u{FEFF}')
}

/// Combining mark ranges commonly seen in terminal streams, with the
/// measured width as a fallback for everything else.
pub(crate) fn is_combining_mark(c: char) -> bool {
    if ('\u{0300}'..='\u{036F}').contains(&c)
        || ('\u{1AB0}'..='\u{1AFF}').contains(&c)
        || ('\u{1DC0}'..='\u{1DFF}').contains(&c)
        || ('\u{20D0}'..='\u{20FF}').contains(&c)
        || ('\u{FE20}'..='\u{FE2F}').contains(&c)
    {
        return true;
    }
    !c.is_ascii()
        && UnicodeWidthChar::width(c) == Some(0)
        && c != ZWJ
        && !is_variation_selector(c)
        && !is_format_control(c)
}

/// Width of a lone codepoint as the emulator sees it arrive.
pub(crate) fn codepoint_width(c: char) -> u8 {
    if c == ZWJ || is_variation_selector(c) || is_skin_tone_modifier(c) || is_combining_mark(c) {
        return 0;
    }
    match UnicodeWidthChar::width(c) {
        Some(2) => 2,
        Some(0) => 0,
        _ if is_extended_pictographic(c) => 2,
        _ => 1,
    }
}

/// Semantic shape of a cluster, decided before mapping to a width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClusterKind {
    Narrow,
    Wide,
    EmojiPresentation, // VS16 / skin tone / ZWJ / flag / keycap forms
    TextPresentation,  // VS15 forces narrow
    Combining(bool),   // base + marks; true when the base is wide
}

fn classify(egc: &str) -> ClusterKind {
    let mut chars = egc.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return ClusterKind::Narrow,
    };

    // Single codepoint: settle on the base width alone.
    if chars.as_str().is_empty() {
        return if codepoint_width(first) == 2 {
            ClusterKind::Wide
        } else {
            ClusterKind::Narrow
        };
    }

    let mut has_vs15 = false;
    let mut has_vs16 = false;
    let mut has_zwj = false;
    let mut has_skin = false;
    let mut has_combining = false;
    let mut ends_with_keycap = false;
    let mut regional_indicators = 0usize;
    let mut any_wide = false;

    for c in egc.chars() {
        match c {
            VS15 => has_vs15 = true,
            VS16 => has_vs16 = true,
            ZWJ => has_zwj = true,
            KEYCAP_COMBINING => ends_with_keycap = true,
            _ => {}
        }
        if is_skin_tone_modifier(c) {
            has_skin = true;
        }
        if is_combining_mark(c) {
            has_combining = true;
        }
        if is_regional_indicator(c) {
            regional_indicators += 1;
        }
        if UnicodeWidthChar::width(c) == Some(2) || is_extended_pictographic(c) {
            any_wide = true;
        }
    }

    if has_vs15 {
        return ClusterKind::TextPresentation;
    }
    if has_vs16 || has_skin || ends_with_keycap || regional_indicators >= 2 {
        return ClusterKind::EmojiPresentation;
    }
    if has_zwj && any_wide {
        return ClusterKind::EmojiPresentation;
    }
    if has_combining {
        return ClusterKind::Combining(codepoint_width(first) == 2);
    }
    if any_wide {
        return ClusterKind::Wide;
    }
    ClusterKind::Narrow
}

/// Column width of one grapheme cluster slice.
pub(crate) fn cluster_width(egc: &str) -> u8 {
    match classify(egc) {
        ClusterKind::Narrow | ClusterKind::TextPresentation => 1,
        ClusterKind::Wide | ClusterKind::EmojiPresentation => 2,
        ClusterKind::Combining(wide) => {
            if wide {
                2
            } else {
                1
            }
        }
    }
}
