//! Mouse-event wire encoders.
//!
//! Five protocol modes crossed with three wire encodings. Button codes:
//! presses of buttons 1–3 are 0–2, releases collapse to 3 except on the
//! SGR wire, which keeps the code and distinguishes release with a final
//! `m`; wheel buttons 4–5 map to 64+. Modifier bits OR in as Shift=4,
//! Meta=8, Control=16; motion adds 32. Wire coordinates are 1-based; the
//! legacy UTF-8 wire offsets by 33 and saturates at 2047.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MouseEventFlags: u32 {
        const RELEASE = 1 << 0;
        const MOTION  = 1 << 1;
        const SHIFT   = 1 << 2;
        const META    = 1 << 3;
        const CONTROL = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// 0 = no button (motion only), 1–3 = buttons, 4–5 = wheel.
    pub button: u8,
    pub flags: MouseEventFlags,
}

impl MouseEvent {
    pub fn press(button: u8) -> Self {
        MouseEvent {
            button,
            flags: MouseEventFlags::empty(),
        }
    }

    pub fn release(button: u8) -> Self {
        MouseEvent {
            button,
            flags: MouseEventFlags::RELEASE,
        }
    }

    pub fn motion(button: u8) -> Self {
        MouseEvent {
            button,
            flags: MouseEventFlags::MOTION,
        }
    }

    pub fn with(mut self, flags: MouseEventFlags) -> Self {
        self.flags |= flags;
        self
    }

    fn is_release(&self) -> bool {
        self.flags.contains(MouseEventFlags::RELEASE)
    }

    fn is_motion(&self) -> bool {
        self.flags.contains(MouseEventFlags::MOTION)
    }
}

/// Tracking protocol selected by DEC private modes 9/1000/1001/1002/1003.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseMode {
    #[default]
    Off,
    X10,
    Normal,
    /// Tracked but never encoded; the highlight protocol needs an active
    /// client side this core does not model.
    Highlight,
    ButtonEvent,
    AnyEvent,
}

/// Wire encoding selected by DEC private modes 1006/1015 (default is the
/// legacy 3-byte form).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseEncoding {
    #[default]
    Utf8,
    Sgr,
    Urxvt,
}

/// Button bits common to every non-X10 mode; `None` means the event is
/// not reportable at all.
fn button_code(ev: &MouseEvent, keep_release: bool) -> Option<u32> {
    let code = match ev.button {
        0 => 3,
        b @ 1..=3 => {
            if ev.is_release() && !keep_release {
                3
            } else {
                u32::from(b) - 1
            }
        }
        b @ 4..=5 => {
            if ev.is_release() {
                return None;
            }
            u32::from(b) + 60
        }
        _ => return None,
    };
    let mut code = code;
    if ev.flags.contains(MouseEventFlags::SHIFT) {
        code |= 4;
    }
    if ev.flags.contains(MouseEventFlags::META) {
        code |= 8;
    }
    if ev.flags.contains(MouseEventFlags::CONTROL) {
        code |= 16;
    }
    Some(code)
}

fn wire(encoding: MouseEncoding, code: u32, x: u32, y: u32, release: bool) -> Vec<u8> {
    match encoding {
        MouseEncoding::Utf8 => {
            let mut out = b"\x1b[M".to_vec();
            for v in [code + 32, (x + 33).min(2047), (y + 33).min(2047)] {
                let mut buf = [0u8; 4];
                let c = char::from_u32(v).unwrap_or(' ');
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            out
        }
        MouseEncoding::Sgr => {
            let fin = if release { 'm' } else { 'M' };
            format!("\x1b[<{};{};{}{}", code, x + 1, y + 1, fin).into_bytes()
        }
        MouseEncoding::Urxvt => format!("\x1b[{};{};{}M", code + 32, x + 1, y + 1).into_bytes(),
    }
}

/// Encode one event for the current tracking mode, or `None` when the
/// mode suppresses it.
pub fn encode(
    mode: MouseMode,
    encoding: MouseEncoding,
    ev: &MouseEvent,
    x: u32,
    y: u32,
) -> Option<Vec<u8>> {
    let keep_release = encoding == MouseEncoding::Sgr;
    match mode {
        MouseMode::Off | MouseMode::Highlight => None,
        MouseMode::X10 => {
            // Presses of the three plain buttons only; no modifiers.
            if ev.is_release() || ev.is_motion() || !(1..=3).contains(&ev.button) {
                return None;
            }
            let code = u32::from(ev.button) - 1;
            Some(wire(encoding, code, x, y, false))
        }
        MouseMode::Normal => {
            if ev.is_motion() || ev.button == 0 {
                return None;
            }
            let code = button_code(ev, keep_release)?;
            Some(wire(encoding, code, x, y, ev.is_release()))
        }
        MouseMode::ButtonEvent => {
            if ev.button == 0 {
                return None;
            }
            let mut code = button_code(ev, keep_release)?;
            if ev.is_motion() {
                code |= 32;
            }
            Some(wire(encoding, code, x, y, ev.is_release()))
        }
        MouseMode::AnyEvent => {
            let mut code = button_code(ev, keep_release)?;
            if ev.is_motion() {
                code |= 32;
            }
            Some(wire(encoding, code, x, y, ev.is_release()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x10_reports_presses_only() {
        let ev = MouseEvent::press(1);
        assert_eq!(
            encode(MouseMode::X10, MouseEncoding::Utf8, &ev, 0, 0),
            Some(b"\x1b[M\x20\x21\x21".to_vec())
        );
        assert_eq!(
            encode(MouseMode::X10, MouseEncoding::Utf8, &MouseEvent::release(1), 0, 0),
            None
        );
        assert_eq!(
            encode(MouseMode::X10, MouseEncoding::Utf8, &MouseEvent::press(4), 0, 0),
            None
        );
    }

    #[test]
    fn normal_release_collapses_except_sgr() {
        let ev = MouseEvent::release(2);
        assert_eq!(
            encode(MouseMode::Normal, MouseEncoding::Utf8, &ev, 4, 5),
            Some(b"\x1b[M\x23\x25\x26".to_vec())
        );
        assert_eq!(
            encode(MouseMode::Normal, MouseEncoding::Sgr, &ev, 4, 5),
            Some(b"\x1b[<1;5;6m".to_vec())
        );
        assert_eq!(
            encode(MouseMode::Normal, MouseEncoding::Urxvt, &ev, 4, 5),
            Some(b"\x1b[35;5;6M".to_vec())
        );
    }

    #[test]
    fn modifiers_or_into_the_code() {
        let ev = MouseEvent::press(1)
            .with(MouseEventFlags::SHIFT | MouseEventFlags::CONTROL);
        assert_eq!(
            encode(MouseMode::Normal, MouseEncoding::Sgr, &ev, 0, 0),
            Some(b"\x1b[<20;1;1M".to_vec())
        );
    }

    #[test]
    fn motion_only_needs_any_event_mode() {
        let ev = MouseEvent::motion(0);
        assert_eq!(
            encode(MouseMode::ButtonEvent, MouseEncoding::Sgr, &ev, 0, 0),
            None
        );
        assert_eq!(
            encode(MouseMode::AnyEvent, MouseEncoding::Sgr, &ev, 0, 0),
            Some(b"\x1b[<35;1;1M".to_vec())
        );
    }

    #[test]
    fn utf8_coordinates_saturate() {
        let ev = MouseEvent::press(1);
        let out = encode(MouseMode::Normal, MouseEncoding::Utf8, &ev, 5000, 5000).unwrap();
        // 2047 encodes as the two-byte UTF-8 sequence for U+07FF.
        assert_eq!(&out[..4], b"\x1b[M\x20");
        assert_eq!(&out[4..], "\u{7FF}\u{7FF}".as_bytes());
    }

    #[test]
    fn wheel_buttons_map_high() {
        let ev = MouseEvent::press(4);
        assert_eq!(
            encode(MouseMode::Normal, MouseEncoding::Sgr, &ev, 0, 0),
            Some(b"\x1b[<64;1;1M".to_vec())
        );
        assert_eq!(
            encode(MouseMode::Normal, MouseEncoding::Sgr, &MouseEvent::release(4), 0, 0),
            None
        );
    }
}
