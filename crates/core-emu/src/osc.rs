//! Operating System Command demultiplexer.
//!
//! All four OSC terminator forms land here with the leading number in
//! variable 0 and the body, if any, in variable 1. Dispatch is by the
//! number; unknown selectors are logged and dropped.

use core_cell::AttrFlags;
use core_parser::Params;
use tracing::debug;

use crate::term::Term;

pub(crate) fn dispatch(term: &mut Term, params: &Params<'_>) {
    let selector = params.num(0);
    let body = params.var(1);
    match selector {
        0 => {
            term.icon_title = body.to_string();
            term.title = body.to_string();
        }
        1 => term.icon_title = body.to_string(),
        2 => term.title = body.to_string(),
        3 => term.x_property = body.to_string(),
        4 => palette(term, body),
        7 => term.cwd = body.to_string(),
        8 => hyperlink(term, body),
        10 => color_query_or_set(term, 10, body),
        11 => color_query_or_set(term, 11, body),
        52 => clipboard(term, body),
        104 => palette_reset(term, body),
        110 => term.default_fg = (229, 229, 229),
        111 => term.default_bg = (0, 0, 0),
        133 => shell_integration(term, body),
        513 | 514 => {
            term.extension_attrs
                .insert(selector.to_string(), body.to_string());
        }
        1337 => compat_1337(term, body),
        _ => debug!(target: "emu.osc", selector, "unhandled OSC"),
    }
}

/// OSC 4: `index;spec` pairs; a `?` spec queries the palette.
fn palette(term: &mut Term, body: &str) {
    let mut parts = body.split(';');
    while let (Some(index), Some(spec)) = (parts.next(), parts.next()) {
        let Ok(index) = index.parse::<u32>() else {
            continue;
        };
        if index > 255 {
            continue;
        }
        if spec == "?" {
            let (r, g, b) = palette_rgb(term, index);
            term.reply(format!(
                "\x1b]4;{index};rgb:{:04x}/{:04x}/{:04x}\x07",
                r as u32 * 257,
                g as u32 * 257,
                b as u32 * 257
            ));
        } else if let Some(rgb) = parse_color(spec) {
            term.palette.insert(index, rgb);
        }
    }
}

fn palette_reset(term: &mut Term, body: &str) {
    if body.is_empty() {
        term.palette.clear();
        return;
    }
    for part in body.split(';') {
        if let Ok(index) = part.parse::<u32>() {
            term.palette.remove(&index);
        }
    }
}

/// OSC 10/11: set or query the default foreground/background.
fn color_query_or_set(term: &mut Term, selector: u32, body: &str) {
    if body == "?" {
        let (r, g, b) = if selector == 10 {
            term.default_fg
        } else {
            term.default_bg
        };
        term.reply(format!(
            "\x1b]{selector};rgb:{:04x}/{:04x}/{:04x}\x07",
            r as u32 * 257,
            g as u32 * 257,
            b as u32 * 257
        ));
        return;
    }
    if let Some(rgb) = parse_color(body) {
        if selector == 10 {
            term.default_fg = rgb;
        } else {
            term.default_bg = rgb;
        }
    }
}

/// OSC 8: `params;uri`. An empty uri closes the link. The id= parameter is
/// accepted but links are keyed by our own table.
fn hyperlink(term: &mut Term, body: &str) {
    let Some((_params, uri)) = body.split_once(';') else {
        return;
    };
    if uri.is_empty() {
        term.current_link = 0;
        return;
    }
    // Reuse an existing id for a repeated target.
    if let Some(idx) = term.links.iter().position(|u| u == uri) {
        term.current_link = (idx + 1) as u32;
        return;
    }
    term.links.push(uri.to_string());
    term.current_link = term.links.len() as u32;
}

/// OSC 52: `selection;payload`. Payloads are opaque base64 handed through
/// unchanged; `?` queries the stored value back.
fn clipboard(term: &mut Term, body: &str) {
    let Some((_selection, payload)) = body.split_once(';') else {
        return;
    };
    if payload == "?" {
        let data = term.clipboard.clone();
        term.reply(format!("\x1b]52;c;{data}\x07"));
    } else {
        term.clipboard = payload.to_string();
    }
}

/// OSC 133 shell integration: prompt and command markers carried on the
/// current writing attributes.
fn shell_integration(term: &mut Term, body: &str) {
    match body.split(';').next().unwrap_or("") {
        "A" => {
            term.attrs.flags.insert(AttrFlags::PROMPT_MARKER);
            term.attrs.flags.remove(AttrFlags::COMMAND_MARKER);
        }
        "B" => {
            term.attrs.flags.remove(AttrFlags::PROMPT_MARKER);
            term.attrs.flags.insert(AttrFlags::COMMAND_MARKER);
        }
        "C" | "D" => {
            term.attrs
                .flags
                .remove(AttrFlags::PROMPT_MARKER | AttrFlags::COMMAND_MARKER);
        }
        mark => debug!(target: "emu.osc", mark, "unhandled shell integration mark"),
    }
}

/// OSC 1337 key=value compatibility: the working directory is honored,
/// file transfers are skipped, anything else is stored for the embedder.
fn compat_1337(term: &mut Term, body: &str) {
    let Some((key, value)) = body.split_once('=') else {
        return;
    };
    match key {
        "CurrentDir" => term.cwd = value.to_string(),
        "File" => debug!(target: "emu.osc", "ignoring 1337 file transfer"),
        _ => {
            term.extension_attrs
                .insert(key.to_string(), value.to_string());
        }
    }
}

/// `rgb:RR/GG/BB` (1–4 hex digits per channel) or `#RRGGBB`.
fn parse_color(spec: &str) -> Option<(u8, u8, u8)> {
    if let Some(rest) = spec.strip_prefix("rgb:") {
        let mut channels = rest.split('/');
        let r = channel(channels.next()?)?;
        let g = channel(channels.next()?)?;
        let b = channel(channels.next()?)?;
        return Some((r, g, b));
    }
    if let Some(hex) = spec.strip_prefix('#')
        && hex.len() == 6
    {
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        return Some((r, g, b));
    }
    None
}

/// Scale a 1–4 digit hex channel down to 8 bits.
fn channel(s: &str) -> Option<u8> {
    if s.is_empty() || s.len() > 4 {
        return None;
    }
    let v = u16::from_str_radix(s, 16).ok()?;
    let max = (1u32 << (4 * s.len() as u32)) - 1;
    Some(((v as u32 * 255) / max) as u8)
}

/// Effective palette color: overrides first, then the xterm-256 defaults.
pub(crate) fn palette_rgb(term: &Term, index: u32) -> (u8, u8, u8) {
    if let Some(&rgb) = term.palette.get(&index) {
        return rgb;
    }
    default_palette_rgb(index)
}

fn default_palette_rgb(index: u32) -> (u8, u8, u8) {
    const BASE: [(u8, u8, u8); 16] = [
        (0, 0, 0),
        (205, 0, 0),
        (0, 205, 0),
        (205, 205, 0),
        (0, 0, 238),
        (205, 0, 205),
        (0, 205, 205),
        (229, 229, 229),
        (127, 127, 127),
        (255, 0, 0),
        (0, 255, 0),
        (255, 255, 0),
        (92, 92, 255),
        (255, 0, 255),
        (0, 255, 255),
        (255, 255, 255),
    ];
    match index {
        0..=15 => BASE[index as usize],
        16..=231 => {
            let v = index - 16;
            let scale = |c: u32| if c == 0 { 0 } else { (55 + 40 * c) as u8 };
            (scale(v / 36), scale(v / 6 % 6), scale(v % 6))
        }
        _ => {
            let g = (8 + 10 * (index.min(255) - 232)) as u8;
            (g, g, g)
        }
    }
}
