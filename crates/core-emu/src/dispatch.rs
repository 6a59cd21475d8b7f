//! Handler dispatch: the emulator side of the parser contract.
//!
//! One match arm per named command. Handlers read captured parameters
//! through [`Params`] and mutate `Term`; query handlers append their
//! responses to the reply buffer. Numeric parameters default to 0 and are
//! raised to 1 where the protocol says so.

use core_cell::{AttrFlags, CellAttributes, Color, LineFlags};
use core_parser::{Dispatch, HandlerId, Params, ParseError};
use tracing::debug;

use crate::charset::{charset_94, charset_96};
use crate::mouse::{MouseEncoding, MouseMode};
use crate::osc;
use crate::term::{Term, TermMode};

impl Dispatch for Term {
    fn dispatch(&mut self, id: HandlerId, params: Params<'_>) {
        match id {
            HandlerId::Process => {
                if let Some(c) = params.last() {
                    self.execute(c);
                }
            }
            HandlerId::Ignored => {}
            HandlerId::Disable8BitControls => {
                self.mode.remove(TermMode::EIGHT_BIT_CONTROLS);
            }
            HandlerId::Enable8BitControls => {
                self.mode.insert(TermMode::EIGHT_BIT_CONTROLS);
            }
            HandlerId::DecDoubleHeightTop => self.set_line_attr(LineFlags::DOUBLE_TOP),
            HandlerId::DecDoubleHeightBottom => self.set_line_attr(LineFlags::DOUBLE_BOTTOM),
            HandlerId::DecSingleWidth => self.set_line_attr(LineFlags::empty()),
            HandlerId::DecDoubleWidth => self.set_line_attr(LineFlags::DOUBLE_WIDTH),
            HandlerId::DecScreenAlignmentTest => self.screen_alignment_test(),
            HandlerId::DesignateCharset94 => self.designate_charset(&params, false),
            HandlerId::DesignateCharset96 => self.designate_charset(&params, true),
            HandlerId::SaveCursor => self.save_cursor(),
            HandlerId::RestoreCursor => self.restore_cursor(),
            HandlerId::ApplicationKeypad => {
                self.mode.insert(TermMode::APP_KEYPAD);
            }
            HandlerId::NormalKeypad => {
                self.mode.remove(TermMode::APP_KEYPAD);
            }
            HandlerId::ResetEmulator => self.reset(),
            HandlerId::InvokeCharset => self.invoke_charset(&params),
            HandlerId::InsertCharacters => self.cmd_insert_characters(params.num(0).max(1)),
            HandlerId::CursorUp => {
                let (top, _) = self.row_bounds();
                let n = params.num(0).max(1).min(self.cursor_y);
                self.move_cursor(self.cursor_x, (self.cursor_y - n).max(top));
            }
            HandlerId::CursorDown => {
                let (_, bottom) = self.row_bounds();
                let y = (self.cursor_y + params.num(0).max(1)).min(bottom);
                self.move_cursor(self.cursor_x, y);
            }
            HandlerId::CursorForward => {
                let x = self.cursor_x + params.num(0).max(1);
                self.move_cursor(x, self.cursor_y);
            }
            HandlerId::CursorBackward => {
                let x = self.cursor_x.min(self.width() - 1);
                let x = x.saturating_sub(params.num(0).max(1));
                self.move_cursor(x, self.cursor_y);
            }
            HandlerId::CursorNextLine => {
                let (_, bottom) = self.row_bounds();
                let y = (self.cursor_y + params.num(0).max(1)).min(bottom);
                self.move_cursor(0, y);
            }
            HandlerId::CursorPreviousLine => {
                let (top, _) = self.row_bounds();
                let n = params.num(0).max(1).min(self.cursor_y);
                self.move_cursor(0, (self.cursor_y - n).max(top));
            }
            HandlerId::CursorHorizontalAbsolute => {
                let x = params.num(0).max(1) - 1;
                self.move_cursor(x, self.cursor_y);
            }
            HandlerId::CursorPosition => {
                let nums = params.nums(0);
                let row = nums.first().copied().unwrap_or(0).max(1) - 1;
                let col = nums.get(1).copied().unwrap_or(0).max(1) - 1;
                let (top, bottom) = self.row_bounds();
                let y = (top + row).min(bottom);
                self.move_cursor(col, y);
            }
            HandlerId::TabForward => self.tab_forward(params.num(0).max(1)),
            HandlerId::TabBackward => self.tab_backward(params.num(0).max(1)),
            HandlerId::EraseInDisplay => self.erase_display(params.num(0), false),
            HandlerId::SelectiveEraseInDisplay => self.erase_display(params.num(0), true),
            HandlerId::EraseInLine => self.erase_line(params.num(0), false),
            HandlerId::SelectiveEraseInLine => self.erase_line(params.num(0), true),
            HandlerId::InsertLines => self.insert_lines(params.num(0)),
            HandlerId::DeleteLines => self.delete_lines(params.num(0)),
            HandlerId::DeleteCharacters => self.cmd_delete_characters(params.num(0).max(1)),
            HandlerId::ScrollUp => self.scroll_up(params.num(0).max(1)),
            HandlerId::ScrollDown => self.scroll_down(params.num(0).max(1)),
            HandlerId::EraseCharacters => {
                let n = params.num(0).max(1);
                let x = self.cursor_x.min(self.width() - 1);
                let end = (x + n).min(self.width());
                self.erase_row_region(self.cursor_y, x, end, false);
            }
            HandlerId::RepeatCharacter => self.repeat_last(params.num(0)),
            HandlerId::SendDeviceAttributes => {
                if params.num(0) == 0 {
                    self.reply_bytes(b"\x1b[?64;1;2;6;15;18;21;22c");
                }
            }
            HandlerId::SendDeviceAttributes2 => {
                if params.num(0) == 0 {
                    self.reply_bytes(b"\x1b[>41;354;0c");
                }
            }
            HandlerId::CursorVerticalAbsolute => {
                let (top, bottom) = self.row_bounds();
                let y = (top + params.num(0).max(1) - 1).min(bottom);
                self.move_cursor(self.cursor_x, y);
            }
            HandlerId::TabClear => match params.num(0) {
                0 => self.clear_tab(self.cursor_x.min(self.width() - 1)),
                3 => self.clear_all_tabs(),
                _ => {}
            },
            HandlerId::SetMode => {
                for n in params.nums(0) {
                    self.set_ansi_mode(n, true);
                }
            }
            HandlerId::ResetMode => {
                for n in params.nums(0) {
                    self.set_ansi_mode(n, false);
                }
            }
            HandlerId::DecPrivateModeSet => {
                for n in params.nums(0) {
                    self.set_private_mode(n, true);
                }
            }
            HandlerId::DecPrivateModeReset => {
                for n in params.nums(0) {
                    self.set_private_mode(n, false);
                }
            }
            HandlerId::DecPrivateModeSave => {
                for n in params.nums(0) {
                    let state = self.private_mode_state(n).unwrap_or(false);
                    self.saved_modes.insert(n, state);
                }
            }
            HandlerId::DecPrivateModeRestore => {
                for n in params.nums(0) {
                    if let Some(&state) = self.saved_modes.get(&n) {
                        self.set_private_mode(n, state);
                    }
                }
            }
            HandlerId::ModeRequest => {
                let n = params.num(0);
                let ps = match n {
                    4 => mode_report(self.mode.contains(TermMode::INSERT)),
                    20 => mode_report(self.mode.contains(TermMode::LINEFEED)),
                    _ => 0,
                };
                self.reply(format!("\x1b[{n};{ps}$y"));
            }
            HandlerId::DecPrivateModeRequest => {
                let n = params.num(0);
                let ps = match self.private_mode_state(n) {
                    Some(state) => mode_report(state),
                    None => 0,
                };
                self.reply(format!("\x1b[?{n};{ps}$y"));
            }
            HandlerId::CharacterAttributes => self.cmd_sgr(&params.nums(0)),
            HandlerId::DeviceStatusReport => match params.num(0) {
                5 => self.reply_bytes(b"\x1b[0n"),
                6 => {
                    let (x, y) = self.cursor();
                    let (top, _) = self.row_bounds();
                    self.reply(format!("\x1b[{};{}R", y.saturating_sub(top) + 1, x + 1));
                }
                _ => {}
            },
            HandlerId::SetCursorStyle => {
                self.cursor_style = params.num(0).min(6);
            }
            HandlerId::ProtectionAttribute => match params.num(0) {
                1 => {
                    self.attrs.flags.insert(AttrFlags::PROTECTED);
                    self.attrs.protection = 1;
                }
                _ => {
                    self.attrs.flags.remove(AttrFlags::PROTECTED);
                    self.attrs.protection = 0;
                }
            },
            HandlerId::SetTopBottomMargins => {
                let nums = params.nums(0);
                let top = nums.first().copied().unwrap_or(0).max(1) - 1;
                let bottom = match nums.get(1).copied().unwrap_or(0) {
                    0 => self.height() - 1,
                    b => b - 1,
                };
                self.set_margins(top, bottom);
            }
            HandlerId::SetLeftRightMargins => {
                let nums = params.nums(0);
                let left = nums.first().copied().unwrap_or(0).max(1) - 1;
                let right = match nums.get(1).copied().unwrap_or(0) {
                    0 => self.width() - 1,
                    r => r - 1,
                };
                if left < right && right < self.width() {
                    self.left_margin = left;
                    self.right_margin = right;
                }
            }
            HandlerId::WindowOps => self.cmd_window_ops(&params.nums(0)),
            HandlerId::SetTitleModes => {
                for n in params.nums(0) {
                    if n < 32 {
                        self.title_modes |= 1 << n;
                    }
                }
            }
            HandlerId::ResetTitleModes => {
                for n in params.nums(0) {
                    if n < 32 {
                        self.title_modes &= !(1 << n);
                    }
                }
            }
            HandlerId::DcsRequestStatusString => self.cmd_request_status_string(params.var(0)),
            HandlerId::OscDispatch => osc::dispatch(self, &params),
        }
    }

    fn internal_error(&mut self, err: &ParseError) {
        debug!(target: "emu.error", error = %err, "parser diagnostic");
        self.set_last_error(err.to_string());
    }
}

fn mode_report(set: bool) -> u32 {
    if set { 1 } else { 2 }
}

impl Term {
    fn set_line_attr(&mut self, flags: LineFlags) {
        let y = self.cursor_y;
        let keep = self.row(y).line_flags() & LineFlags::WRAPPED;
        self.row_mut(y).set_line_flags(keep | flags);
    }

    /// The designating intermediate selects the slot, the captured final
    /// byte selects the table.
    fn designate_charset(&mut self, params: &Params<'_>, is_96: bool) {
        let Some(&intermediate) = params.all_sequence().get(1) else {
            return;
        };
        let slot = match (is_96, intermediate) {
            (false, 0x28) => 0, // (
            (false, 0x29) => 1, // )
            (false, 0x2a) => 2, // *
            (false, 0x2b) => 3, // +
            (true, 0x2d) => 1,  // -
            (true, 0x2e) => 2,  // .
            (true, 0x2f) => 3,  // /
            _ => return,
        };
        let designator = params.var(0).chars().next().unwrap_or('B');
        let table = if is_96 {
            charset_96(designator)
        } else {
            charset_94(designator)
        };
        self.charset.set_charset(slot, table);
    }

    /// Locking shifts selected by the ESC final byte.
    fn invoke_charset(&mut self, params: &Params<'_>) {
        match params.all_sequence().get(1).copied() {
            Some(0x6e) => self.charset.set_left(2),  // LS2
            Some(0x6f) => self.charset.set_left(3),  // LS3
            Some(0x7c) => self.charset.set_right(3), // LS3R
            Some(0x7d) => self.charset.set_right(2), // LS2R
            Some(0x7e) => self.charset.set_right(1), // LS1R
            _ => {}
        }
    }

    fn cmd_insert_characters(&mut self, n: u32) {
        let eng = self.eng;
        let width = self.width();
        let x = self.cursor_x.min(width - 1);
        let row = self.row_mut(self.cursor_y);
        for _ in 0..n.min(width) {
            row.insert(x, &eng);
        }
        if row.columns() > width {
            row.resize(width, &eng);
        }
    }

    fn cmd_delete_characters(&mut self, n: u32) {
        let eng = self.eng;
        let x = self.cursor_x.min(self.width() - 1);
        let row = self.row_mut(self.cursor_y);
        for _ in 0..n {
            if x >= row.columns() {
                break;
            }
            row.remove(x, &eng);
        }
    }

    fn set_ansi_mode(&mut self, n: u32, set: bool) {
        match n {
            4 => self.mode.set(TermMode::INSERT, set),
            20 => self.mode.set(TermMode::LINEFEED, set),
            _ => debug!(target: "emu.mode", mode = n, set, "unhandled ANSI mode"),
        }
    }

    pub(crate) fn set_private_mode(&mut self, n: u32, set: bool) {
        match n {
            1 => self.mode.set(TermMode::APP_CURSOR, set),
            3 => {
                self.resize_clear(if set { 132 } else { 80 });
            }
            5 => self.mode.set(TermMode::REVERSE_VIDEO, set),
            6 => {
                self.mode.set(TermMode::ORIGIN, set);
                let (top, _) = self.row_bounds();
                self.move_cursor(0, top);
            }
            7 => self.mode.set(TermMode::AUTOWRAP, set),
            12 => self.mode.set(TermMode::CURSOR_BLINK, set),
            25 => self.mode.set(TermMode::CURSOR_VISIBLE, set),
            9 => self.set_mouse_mode(MouseMode::X10, set),
            1000 => self.set_mouse_mode(MouseMode::Normal, set),
            1001 => self.set_mouse_mode(MouseMode::Highlight, set),
            1002 => self.set_mouse_mode(MouseMode::ButtonEvent, set),
            1003 => self.set_mouse_mode(MouseMode::AnyEvent, set),
            1004 => self.mode.set(TermMode::FOCUS_EVENTS, set),
            1005 => {} // the legacy extended encoding is the default wire
            1006 => self.set_mouse_encoding(MouseEncoding::Sgr, set),
            1015 => self.set_mouse_encoding(MouseEncoding::Urxvt, set),
            47 => {
                if set {
                    self.enter_alt_screen(false);
                } else {
                    self.leave_alt_screen();
                }
            }
            1047 => {
                if set {
                    self.enter_alt_screen(false);
                } else {
                    if self.alt_screen_active() {
                        self.erase_display(2, false);
                    }
                    self.leave_alt_screen();
                }
            }
            1048 => {
                if set {
                    self.save_cursor();
                } else {
                    self.restore_cursor();
                }
            }
            1049 => {
                if set {
                    self.save_cursor();
                    self.enter_alt_screen(true);
                } else {
                    self.leave_alt_screen();
                    self.restore_cursor();
                }
            }
            2004 => self.mode.set(TermMode::BRACKETED_PASTE, set),
            _ => debug!(target: "emu.mode", mode = n, set, "unhandled DEC private mode"),
        }
    }

    fn set_mouse_mode(&mut self, mode: MouseMode, set: bool) {
        if set {
            self.mouse_mode = mode;
        } else if self.mouse_mode == mode {
            self.mouse_mode = MouseMode::Off;
        }
    }

    fn set_mouse_encoding(&mut self, encoding: MouseEncoding, set: bool) {
        if set {
            self.mouse_encoding = encoding;
        } else if self.mouse_encoding == encoding {
            self.mouse_encoding = MouseEncoding::Utf8;
        }
    }

    /// Current set/reset state of a DEC private mode, where it maps to
    /// observable state.
    pub(crate) fn private_mode_state(&self, n: u32) -> Option<bool> {
        match n {
            1 => Some(self.mode.contains(TermMode::APP_CURSOR)),
            3 => Some(self.width() == 132),
            5 => Some(self.mode.contains(TermMode::REVERSE_VIDEO)),
            6 => Some(self.mode.contains(TermMode::ORIGIN)),
            7 => Some(self.mode.contains(TermMode::AUTOWRAP)),
            12 => Some(self.mode.contains(TermMode::CURSOR_BLINK)),
            25 => Some(self.mode.contains(TermMode::CURSOR_VISIBLE)),
            9 => Some(self.mouse_mode == MouseMode::X10),
            1000 => Some(self.mouse_mode == MouseMode::Normal),
            1001 => Some(self.mouse_mode == MouseMode::Highlight),
            1002 => Some(self.mouse_mode == MouseMode::ButtonEvent),
            1003 => Some(self.mouse_mode == MouseMode::AnyEvent),
            1004 => Some(self.mode.contains(TermMode::FOCUS_EVENTS)),
            1006 => Some(self.mouse_encoding == MouseEncoding::Sgr),
            1015 => Some(self.mouse_encoding == MouseEncoding::Urxvt),
            47 | 1047 | 1049 => Some(self.alt_screen_active()),
            2004 => Some(self.mode.contains(TermMode::BRACKETED_PASTE)),
            _ => None,
        }
    }

    /// SGR. Extended color introducers (38/48) consume their arguments
    /// from the same list.
    fn cmd_sgr(&mut self, nums: &[u32]) {
        let mut i = 0;
        while i < nums.len() {
            let n = nums[i];
            match n {
                0 => {
                    let link = self.attrs.link;
                    self.attrs = CellAttributes::default();
                    self.attrs.link = link;
                }
                1 => self.attrs.flags.insert(AttrFlags::BOLD),
                2 => self.attrs.flags.insert(AttrFlags::FAINT),
                3 => self.attrs.flags.insert(AttrFlags::ITALIC),
                4 => self.attrs.flags.insert(AttrFlags::UNDERLINE),
                5 | 6 => self.attrs.flags.insert(AttrFlags::BLINK),
                7 => self.attrs.flags.insert(AttrFlags::INVERSE),
                8 => self.attrs.flags.insert(AttrFlags::INVISIBLE),
                9 => self.attrs.flags.insert(AttrFlags::STRIKETHROUGH),
                21 | 22 => {
                    self.attrs.flags.remove(AttrFlags::BOLD | AttrFlags::FAINT);
                }
                23 => self.attrs.flags.remove(AttrFlags::ITALIC),
                24 => self.attrs.flags.remove(AttrFlags::UNDERLINE),
                25 => self.attrs.flags.remove(AttrFlags::BLINK),
                27 => self.attrs.flags.remove(AttrFlags::INVERSE),
                28 => self.attrs.flags.remove(AttrFlags::INVISIBLE),
                29 => self.attrs.flags.remove(AttrFlags::STRIKETHROUGH),
                30..=37 => self.attrs.fg = Color::Indexed((n - 30) as u8),
                39 => self.attrs.fg = Color::Default,
                40..=47 => self.attrs.bg = Color::Indexed((n - 40) as u8),
                49 => self.attrs.bg = Color::Default,
                90..=97 => self.attrs.fg = Color::Indexed((n - 90 + 8) as u8),
                100..=107 => self.attrs.bg = Color::Indexed((n - 100 + 8) as u8),
                38 | 48 => {
                    let (color, used) = parse_extended_color(&nums[i + 1..]);
                    if let Some(color) = color {
                        if n == 38 {
                            self.attrs.fg = color;
                        } else {
                            self.attrs.bg = color;
                        }
                    }
                    i += used;
                }
                _ => debug!(target: "emu.sgr", attr = n, "unhandled rendition"),
            }
            i += 1;
        }
    }

    fn cmd_window_ops(&mut self, nums: &[u32]) {
        match nums.first().copied().unwrap_or(0) {
            11 => self.reply_bytes(b"\x1b[1t"),
            14 => {
                let (w, h) = (self.width() * 8, self.height() * 16);
                self.reply(format!("\x1b[4;{h};{w}t"));
            }
            18 => {
                let (w, h) = (self.width(), self.height());
                self.reply(format!("\x1b[8;{h};{w}t"));
            }
            19 => {
                let (w, h) = (self.width(), self.height());
                self.reply(format!("\x1b[9;{h};{w}t"));
            }
            20 => {
                let icon = self.icon_title.clone();
                self.reply(format!("\x1b]L{icon}\x1b\\"));
            }
            21 => {
                let title = self.title.clone();
                self.reply(format!("\x1b]l{title}\x1b\\"));
            }
            22 => match nums.get(1).copied().unwrap_or(0) {
                0 => {
                    self.icon_stack.push(self.icon_title.clone());
                    self.title_stack.push(self.title.clone());
                }
                1 => self.icon_stack.push(self.icon_title.clone()),
                2 => self.title_stack.push(self.title.clone()),
                _ => {}
            },
            23 => match nums.get(1).copied().unwrap_or(0) {
                0 => {
                    if let Some(t) = self.icon_stack.pop() {
                        self.icon_title = t;
                    }
                    if let Some(t) = self.title_stack.pop() {
                        self.title = t;
                    }
                }
                1 => {
                    if let Some(t) = self.icon_stack.pop() {
                        self.icon_title = t;
                    }
                }
                2 => {
                    if let Some(t) = self.title_stack.pop() {
                        self.title = t;
                    }
                }
                _ => {}
            },
            op => debug!(target: "emu.window", op, "unhandled window op"),
        }
    }

    /// DECRQSS: answer for the settings we track, reject the rest.
    fn cmd_request_status_string(&mut self, body: &str) {
        match body {
            "m" => {
                let sgr = self.current_sgr_string();
                self.reply(format!("\x1bP1$r{sgr}m\x1b\\"));
            }
            "r" => {
                let (top, bottom) = self.margins();
                self.reply(format!("\x1bP1$r{};{}r\x1b\\", top + 1, bottom + 1));
            }
            " q" => {
                let style = self.cursor_style;
                self.reply(format!("\x1bP1$r{style} q\x1b\\"));
            }
            "\"q" => {
                let p = if self.attrs.flags.contains(AttrFlags::PROTECTED) {
                    1
                } else {
                    0
                };
                self.reply(format!("\x1bP1$r{p}\"q\x1b\\"));
            }
            _ => self.reply_bytes(b"\x1bP0$r\x1b\\"),
        }
    }

    fn current_sgr_string(&self) -> String {
        let mut out = String::from("0");
        let f = self.attrs.flags;
        for (flag, code) in [
            (AttrFlags::BOLD, 1),
            (AttrFlags::FAINT, 2),
            (AttrFlags::ITALIC, 3),
            (AttrFlags::UNDERLINE, 4),
            (AttrFlags::BLINK, 5),
            (AttrFlags::INVERSE, 7),
            (AttrFlags::INVISIBLE, 8),
            (AttrFlags::STRIKETHROUGH, 9),
        ] {
            if f.contains(flag) {
                out.push_str(&format!(";{code}"));
            }
        }
        match self.attrs.fg {
            Color::Default => {}
            Color::Indexed(n) if n < 8 => out.push_str(&format!(";{}", 30 + n)),
            Color::Indexed(n) if n < 16 => out.push_str(&format!(";{}", 90 + n - 8)),
            Color::Indexed(n) => out.push_str(&format!(";38;5;{n}")),
            Color::Rgb(r, g, b) => out.push_str(&format!(";38;2;{r};{g};{b}")),
        }
        match self.attrs.bg {
            Color::Default => {}
            Color::Indexed(n) if n < 8 => out.push_str(&format!(";{}", 40 + n)),
            Color::Indexed(n) if n < 16 => out.push_str(&format!(";{}", 100 + n - 8)),
            Color::Indexed(n) => out.push_str(&format!(";48;5;{n}")),
            Color::Rgb(r, g, b) => out.push_str(&format!(";48;2;{r};{g};{b}")),
        }
        out
    }
}

/// Parse `5;n` or `2;r;g;b` after a 38/48 introducer. Returns the color
/// and how many list entries were consumed.
fn parse_extended_color(rest: &[u32]) -> (Option<Color>, usize) {
    match rest.first() {
        Some(5) => {
            let n = rest.get(1).copied().unwrap_or(0);
            (Some(Color::Indexed(n.min(255) as u8)), 2)
        }
        Some(2) => {
            let r = rest.get(1).copied().unwrap_or(0).min(255) as u8;
            let g = rest.get(2).copied().unwrap_or(0).min(255) as u8;
            let b = rest.get(3).copied().unwrap_or(0).min(255) as u8;
            (Some(Color::Rgb(r, g, b)), 4)
        }
        _ => (None, 0),
    }
}
