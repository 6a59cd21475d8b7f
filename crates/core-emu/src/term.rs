//! Emulator state: screen rows, cursor, modes, charsets, titles, replies.
//!
//! `Term` is the receiver side of the dispatch contract. The parser feeds
//! it named commands plus the shared control/print path; everything here
//! mutates in-memory state only, with no PTY and no I/O. Query responses
//! accumulate in a reply buffer the embedder drains.

use std::collections::HashMap;

use bitflags::bitflags;
use core_cell::{AttrFlags, CellAttributes, Cursor, LineFlags, Row};
use core_unicode::WidthEngine;
use tracing::debug;

use crate::charset::{Charset, CharsetMap};
use crate::config::Config;
use crate::mouse::{self, MouseEncoding, MouseEvent, MouseMode};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TermMode: u32 {
        /// IRM: printables shift the rest of the row right.
        const INSERT          = 1 << 0;
        /// LNM: line feed implies carriage return.
        const LINEFEED        = 1 << 1;
        /// DECCKM.
        const APP_CURSOR      = 1 << 2;
        /// DECSCNM.
        const REVERSE_VIDEO   = 1 << 3;
        /// DECOM: cursor addressing is margin-relative.
        const ORIGIN          = 1 << 4;
        /// DECAWM.
        const AUTOWRAP        = 1 << 5;
        const CURSOR_BLINK    = 1 << 6;
        /// DECTCEM.
        const CURSOR_VISIBLE  = 1 << 7;
        const APP_KEYPAD      = 1 << 8;
        const FOCUS_EVENTS    = 1 << 9;
        const BRACKETED_PASTE = 1 << 10;
        /// S8C1T state toggled by ESC SP F / ESC SP G.
        const EIGHT_BIT_CONTROLS = 1 << 11;
    }
}

impl Default for TermMode {
    fn default() -> Self {
        TermMode::AUTOWRAP | TermMode::CURSOR_VISIBLE
    }
}

/// Everything DECSC stashes and DECRC brings back.
#[derive(Debug, Clone)]
pub(crate) struct SavedCursor {
    x: u32,
    y: u32,
    attrs: CellAttributes,
    charsets: [Charset; 4],
    left: usize,
    right: usize,
    next_left: Option<usize>,
    origin: bool,
    pending_wrap: bool,
}

pub struct Term {
    pub(crate) eng: WidthEngine,
    width: u32,
    height: u32,
    rows: Vec<Row>,
    // Alternate screen buffer; swapped with `rows` while active.
    spare_rows: Vec<Row>,
    alt_active: bool,

    pub(crate) cursor_x: u32,
    pub(crate) cursor_y: u32,
    pub(crate) pending_wrap: bool,
    pub(crate) attrs: CellAttributes,
    pub(crate) mode: TermMode,

    top_margin: u32,
    bottom_margin: u32,
    pub(crate) left_margin: u32,
    pub(crate) right_margin: u32,
    tabs: Vec<bool>,
    tab_width: u32,

    pub(crate) charset: CharsetMap,
    saved_cursor: Option<SavedCursor>,
    pub(crate) saved_modes: HashMap<u32, bool>,

    pub(crate) title: String,
    pub(crate) icon_title: String,
    pub(crate) title_stack: Vec<String>,
    pub(crate) icon_stack: Vec<String>,
    pub(crate) title_modes: u32,

    pub(crate) mouse_mode: MouseMode,
    pub(crate) mouse_encoding: MouseEncoding,
    pub(crate) cursor_style: u32,

    pub(crate) palette: HashMap<u32, (u8, u8, u8)>,
    pub(crate) default_fg: (u8, u8, u8),
    pub(crate) default_bg: (u8, u8, u8),
    pub(crate) cwd: String,
    pub(crate) x_property: String,
    pub(crate) clipboard: String,
    pub(crate) links: Vec<String>,
    pub(crate) current_link: u32,
    pub(crate) extension_attrs: HashMap<String, String>,

    pub(crate) last_printed: Option<(char, u8)>,
    term_name: String,
    answerback: String,
    replies: Vec<u8>,
    bells: u64,
    last_error: Option<String>,
}

impl Term {
    pub fn new(config: &Config) -> Self {
        let width = config.file.terminal.columns.max(2);
        let height = config.file.terminal.rows.max(1);
        let tab_width = config.file.terminal.tab_width.max(1);
        let mut term = Term {
            eng: WidthEngine::new(),
            width,
            height,
            rows: (0..height).map(|_| Row::new()).collect(),
            spare_rows: (0..height).map(|_| Row::new()).collect(),
            alt_active: false,
            cursor_x: 0,
            cursor_y: 0,
            pending_wrap: false,
            attrs: CellAttributes::default(),
            mode: TermMode::default(),
            top_margin: 0,
            bottom_margin: height - 1,
            left_margin: 0,
            right_margin: width - 1,
            tabs: Vec::new(),
            tab_width,
            charset: CharsetMap::default(),
            saved_cursor: None,
            saved_modes: HashMap::new(),
            title: String::new(),
            icon_title: String::new(),
            title_stack: Vec::new(),
            icon_stack: Vec::new(),
            title_modes: 0,
            mouse_mode: MouseMode::Off,
            mouse_encoding: MouseEncoding::Utf8,
            cursor_style: 1,
            palette: HashMap::new(),
            default_fg: (229, 229, 229),
            default_bg: (0, 0, 0),
            cwd: String::new(),
            x_property: String::new(),
            clipboard: String::new(),
            links: Vec::new(),
            current_link: 0,
            extension_attrs: HashMap::new(),
            last_printed: None,
            term_name: config.file.terminal.term_name.clone(),
            answerback: config.file.terminal.answerback.clone(),
            replies: Vec::new(),
            bells: 0,
            last_error: None,
        };
        term.reset_tabs();
        term
    }

    // ---- geometry and read access ---------------------------------------

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cursor(&self) -> (u32, u32) {
        (self.cursor_x.min(self.width - 1), self.cursor_y)
    }

    pub fn row(&self, y: u32) -> &Row {
        &self.rows[y as usize]
    }

    pub(crate) fn row_mut(&mut self, y: u32) -> &mut Row {
        &mut self.rows[y as usize]
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon_title(&self) -> &str {
        &self.icon_title
    }

    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    pub fn mode(&self) -> TermMode {
        self.mode
    }

    pub fn mouse_mode(&self) -> MouseMode {
        self.mouse_mode
    }

    pub fn mouse_encoding(&self) -> MouseEncoding {
        self.mouse_encoding
    }

    pub fn cursor_style(&self) -> u32 {
        self.cursor_style
    }

    pub fn alt_screen_active(&self) -> bool {
        self.alt_active
    }

    pub fn bells(&self) -> u64 {
        self.bells
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn term_name(&self) -> &str {
        &self.term_name
    }

    /// DECSLRM storage; enforcement of horizontal margins is the
    /// embedder's concern.
    pub fn side_margins(&self) -> (u32, u32) {
        (self.left_margin, self.right_margin)
    }

    pub fn title_modes(&self) -> u32 {
        self.title_modes
    }

    pub fn x_property(&self) -> &str {
        &self.x_property
    }

    pub fn clipboard(&self) -> &str {
        &self.clipboard
    }

    /// Resolve a cell's hyperlink id back to its URI.
    pub fn link_uri(&self, id: u32) -> Option<&str> {
        id.checked_sub(1)
            .and_then(|i| self.links.get(i as usize))
            .map(String::as_str)
    }

    /// Key/value state carried by extension OSCs (513/514/1337).
    pub fn extension_attr(&self, key: &str) -> Option<&str> {
        self.extension_attrs.get(key).map(String::as_str)
    }

    pub(crate) fn set_last_error(&mut self, msg: String) {
        self.last_error = Some(msg);
    }

    /// Visible text of one row.
    pub fn row_text(&self, y: u32) -> &str {
        self.rows[y as usize].substr_to_end(0, &self.eng)
    }

    /// Whole-screen text with rows joined by newlines.
    pub fn screen_text(&self) -> String {
        let mut out = String::new();
        for y in 0..self.height {
            if y > 0 {
                out.push('\n');
            }
            out.push_str(self.row_text(y));
        }
        out
    }

    // ---- replies ---------------------------------------------------------

    pub(crate) fn reply_bytes(&mut self, bytes: &[u8]) {
        self.replies.extend_from_slice(bytes);
    }

    pub(crate) fn reply(&mut self, s: String) {
        self.replies.extend_from_slice(s.as_bytes());
    }

    /// Drain pending query responses and mouse reports.
    pub fn take_replies(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.replies)
    }

    /// Encode a mouse event under the current tracking mode. Events
    /// outside the screen are dropped.
    pub fn mouse_event(&mut self, ev: &MouseEvent, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        if let Some(bytes) = mouse::encode(self.mouse_mode, self.mouse_encoding, ev, x, y) {
            self.replies.extend_from_slice(&bytes);
        }
    }

    // ---- cursor and scrolling --------------------------------------------

    pub(crate) fn carriage_return(&mut self) {
        self.cursor_x = 0;
        self.pending_wrap = false;
    }

    pub(crate) fn line_feed(&mut self) {
        self.pending_wrap = false;
        if self.cursor_y == self.bottom_margin {
            self.scroll_up(1);
        } else if self.cursor_y + 1 < self.height {
            self.cursor_y += 1;
        }
    }

    pub(crate) fn reverse_line_feed(&mut self) {
        self.pending_wrap = false;
        if self.cursor_y == self.top_margin {
            self.scroll_down(1);
        } else if self.cursor_y > 0 {
            self.cursor_y -= 1;
        }
    }

    /// Rotate the scroll region up: the top row falls out, a blank row
    /// enters at the bottom margin.
    pub(crate) fn scroll_up(&mut self, n: u32) {
        let n = n.min(self.bottom_margin - self.top_margin + 1);
        for _ in 0..n {
            self.rows.remove(self.top_margin as usize);
            self.rows.insert(self.bottom_margin as usize, Row::new());
        }
    }

    pub(crate) fn scroll_down(&mut self, n: u32) {
        let n = n.min(self.bottom_margin - self.top_margin + 1);
        for _ in 0..n {
            self.rows.remove(self.bottom_margin as usize);
            self.rows.insert(self.top_margin as usize, Row::new());
        }
    }

    pub(crate) fn move_cursor(&mut self, x: u32, y: u32) {
        self.cursor_x = x.min(self.width - 1);
        self.cursor_y = y.min(self.height - 1);
        self.pending_wrap = false;
    }

    /// Vertical clamp honoring origin mode.
    pub(crate) fn row_bounds(&self) -> (u32, u32) {
        if self.mode.contains(TermMode::ORIGIN) {
            (self.top_margin, self.bottom_margin)
        } else {
            (0, self.height - 1)
        }
    }

    pub(crate) fn set_margins(&mut self, top: u32, bottom: u32) {
        let top = top.min(self.height - 1);
        let bottom = bottom.min(self.height - 1);
        if bottom <= top {
            return;
        }
        self.top_margin = top;
        self.bottom_margin = bottom;
        let (home, _) = self.row_bounds();
        self.move_cursor(0, home);
    }

    pub(crate) fn margins(&self) -> (u32, u32) {
        (self.top_margin, self.bottom_margin)
    }

    pub(crate) fn cursor_in_scroll_region(&self) -> bool {
        self.cursor_y >= self.top_margin && self.cursor_y <= self.bottom_margin
    }

    // ---- tabs ------------------------------------------------------------

    pub(crate) fn reset_tabs(&mut self) {
        self.tabs = (0..self.width)
            .map(|x| x > 0 && x % self.tab_width == 0)
            .collect();
    }

    pub(crate) fn set_tab(&mut self, x: u32) {
        if let Some(t) = self.tabs.get_mut(x as usize) {
            *t = true;
        }
    }

    pub(crate) fn clear_tab(&mut self, x: u32) {
        if let Some(t) = self.tabs.get_mut(x as usize) {
            *t = false;
        }
    }

    pub(crate) fn clear_all_tabs(&mut self) {
        self.tabs.iter_mut().for_each(|t| *t = false);
    }

    pub(crate) fn tab_forward(&mut self, n: u32) {
        let mut x = self.cursor_x.min(self.width - 1);
        for _ in 0..n.max(1) {
            x = ((x + 1)..self.width)
                .find(|&i| self.tabs[i as usize])
                .unwrap_or(self.width - 1);
        }
        self.cursor_x = x;
        self.pending_wrap = false;
    }

    pub(crate) fn tab_backward(&mut self, n: u32) {
        let mut x = self.cursor_x.min(self.width - 1);
        for _ in 0..n.max(1) {
            x = (0..x).rev().find(|&i| self.tabs[i as usize]).unwrap_or(0);
        }
        self.cursor_x = x;
        self.pending_wrap = false;
    }

    // ---- erase -----------------------------------------------------------

    /// Erase `[start, end)` of a row, optionally skipping DECSCA-protected
    /// runs.
    pub(crate) fn erase_row_region(&mut self, y: u32, start: u32, end: u32, selective: bool) {
        let eng = self.eng;
        let row = &mut self.rows[y as usize];
        if !selective {
            row.erase(start, end, &eng);
            return;
        }
        let protected: Vec<(u32, u32)> = row
            .ranges()
            .iter()
            .filter(|r| r.attrs.flags.contains(AttrFlags::PROTECTED))
            .map(|r| (r.start, r.end))
            .collect();
        let mut col = start;
        for (ps, pe) in protected {
            if pe < col || ps >= end {
                continue;
            }
            if ps > col {
                row.erase(col, ps.min(end), &eng);
            }
            col = pe + 1;
        }
        if col < end {
            row.erase(col, end, &eng);
        }
    }

    pub(crate) fn erase_display(&mut self, kind: u32, selective: bool) {
        let (x, y) = (self.cursor_x.min(self.width - 1), self.cursor_y);
        match kind {
            0 => {
                self.erase_row_region(y, x, self.width, selective);
                for row in (y + 1)..self.height {
                    self.erase_row_region(row, 0, self.width, selective);
                }
            }
            1 => {
                for row in 0..y {
                    self.erase_row_region(row, 0, self.width, selective);
                }
                self.erase_row_region(y, 0, x + 1, selective);
            }
            2 | 3 => {
                for row in 0..self.height {
                    self.erase_row_region(row, 0, self.width, selective);
                }
            }
            _ => {}
        }
    }

    pub(crate) fn erase_line(&mut self, kind: u32, selective: bool) {
        let (x, y) = (self.cursor_x.min(self.width - 1), self.cursor_y);
        match kind {
            0 => self.erase_row_region(y, x, self.width, selective),
            1 => self.erase_row_region(y, 0, x + 1, selective),
            2 => self.erase_row_region(y, 0, self.width, selective),
            _ => {}
        }
    }

    pub(crate) fn insert_lines(&mut self, n: u32) {
        if !self.cursor_in_scroll_region() {
            return;
        }
        let n = n.max(1).min(self.bottom_margin - self.cursor_y + 1);
        for _ in 0..n {
            self.rows.remove(self.bottom_margin as usize);
            self.rows.insert(self.cursor_y as usize, Row::new());
        }
        self.carriage_return();
    }

    pub(crate) fn delete_lines(&mut self, n: u32) {
        if !self.cursor_in_scroll_region() {
            return;
        }
        let n = n.max(1).min(self.bottom_margin - self.cursor_y + 1);
        for _ in 0..n {
            self.rows.remove(self.cursor_y as usize);
            self.rows.insert(self.bottom_margin as usize, Row::new());
        }
        self.carriage_return();
    }

    // ---- alternate screen -----------------------------------------------

    pub(crate) fn enter_alt_screen(&mut self, clear: bool) {
        if self.alt_active {
            return;
        }
        std::mem::swap(&mut self.rows, &mut self.spare_rows);
        self.alt_active = true;
        if clear {
            for row in &mut self.rows {
                *row = Row::new();
            }
        }
    }

    pub(crate) fn leave_alt_screen(&mut self) {
        if !self.alt_active {
            return;
        }
        std::mem::swap(&mut self.rows, &mut self.spare_rows);
        self.alt_active = false;
    }

    // ---- saved cursor ----------------------------------------------------

    pub(crate) fn save_cursor(&mut self) {
        self.saved_cursor = Some(SavedCursor {
            x: self.cursor_x,
            y: self.cursor_y,
            attrs: self.attrs,
            charsets: *self.charset.charsets(),
            left: self.charset.left(),
            right: self.charset.right(),
            next_left: self.charset.next_left(),
            origin: self.mode.contains(TermMode::ORIGIN),
            pending_wrap: self.pending_wrap,
        });
    }

    pub(crate) fn restore_cursor(&mut self) {
        let Some(saved) = self.saved_cursor.clone() else {
            self.move_cursor(0, 0);
            self.attrs = CellAttributes::default();
            return;
        };
        self.cursor_x = saved.x.min(self.width - 1);
        self.cursor_y = saved.y.min(self.height - 1);
        self.attrs = saved.attrs;
        self.charset
            .set_all(saved.charsets, saved.left, saved.right, saved.next_left);
        self.mode.set(TermMode::ORIGIN, saved.origin);
        self.pending_wrap = saved.pending_wrap;
    }

    // ---- geometry change and reset ---------------------------------------

    /// DECCOLM-style resize: the screen clears, margins and cursor reset.
    pub(crate) fn resize_clear(&mut self, width: u32) {
        self.width = width.max(2);
        self.rows = (0..self.height).map(|_| Row::new()).collect();
        self.spare_rows = (0..self.height).map(|_| Row::new()).collect();
        self.top_margin = 0;
        self.bottom_margin = self.height - 1;
        self.left_margin = 0;
        self.right_margin = self.width - 1;
        self.reset_tabs();
        self.move_cursor(0, 0);
    }

    /// Full emulator reset (RIS / DECSTR).
    pub(crate) fn reset(&mut self) {
        self.rows = (0..self.height).map(|_| Row::new()).collect();
        self.spare_rows = (0..self.height).map(|_| Row::new()).collect();
        self.alt_active = false;
        self.cursor_x = 0;
        self.cursor_y = 0;
        self.pending_wrap = false;
        self.attrs = CellAttributes::default();
        self.mode = TermMode::default();
        self.top_margin = 0;
        self.bottom_margin = self.height - 1;
        self.left_margin = 0;
        self.right_margin = self.width - 1;
        self.reset_tabs();
        self.charset = CharsetMap::default();
        self.saved_cursor = None;
        self.saved_modes.clear();
        self.mouse_mode = MouseMode::Off;
        self.mouse_encoding = MouseEncoding::Utf8;
        self.cursor_style = 1;
        self.palette.clear();
        self.current_link = 0;
        self.last_printed = None;
    }

    // ---- control and print path ------------------------------------------

    /// Execute the codepoint at the shared control/print leaf.
    pub(crate) fn execute(&mut self, c: u32) {
        match c {
            0x05 => {
                if !self.answerback.is_empty() {
                    let answer = self.answerback.clone();
                    self.reply(answer);
                }
            }
            0x07 => {
                self.bells += 1;
            }
            0x08 => {
                self.pending_wrap = false;
                self.cursor_x = self.cursor_x.min(self.width - 1).saturating_sub(1);
            }
            0x09 => self.tab_forward(1),
            0x0a | 0x0b | 0x0c => {
                self.line_feed();
                if self.mode.contains(TermMode::LINEFEED) {
                    self.carriage_return();
                }
            }
            0x0d => self.carriage_return(),
            0x0e => self.charset.set_left(1),
            0x0f => self.charset.set_left(0),
            0x84 => self.line_feed(),
            0x85 => {
                self.carriage_return();
                self.line_feed();
            }
            0x88 => self.set_tab(self.cursor_x.min(self.width - 1)),
            0x8d => self.reverse_line_feed(),
            0x8e => self.charset.set_single_left(2),
            0x8f => self.charset.set_single_left(3),
            c if core_parser::Machine::is_control_code(c) => {
                debug!(target: "emu.control", codepoint = c, "ignored control code");
            }
            _ => self.printable(c),
        }
    }

    fn printable(&mut self, c: u32) {
        let mapped = self.charset.map(c);
        let Some(ch) = char::from_u32(mapped) else {
            return;
        };

        if self.eng.is_zero_width(ch) {
            // Zero-width input attaches to the cluster the cursor just
            // passed. The cluster's width stays what it was at write time.
            let attach_x = if self.pending_wrap {
                self.width
            } else {
                self.cursor_x
            };
            if attach_x > 0 {
                let eng = self.eng;
                let row = self.row_mut(self.cursor_y);
                let mut cur = Cursor::new(attach_x);
                row.update_cursor(&mut cur, &eng);
                row.add_combiner(&cur, ch);
            }
            return;
        }

        let w = u32::from(self.eng.width(ch).max(1));
        if self.pending_wrap && self.mode.contains(TermMode::AUTOWRAP) {
            let flags = self.row(self.cursor_y).line_flags() | LineFlags::WRAPPED;
            self.row_mut(self.cursor_y).set_line_flags(flags);
            self.carriage_return();
            self.line_feed();
        }
        self.pending_wrap = false;
        if self.cursor_x + w > self.width {
            if self.mode.contains(TermMode::AUTOWRAP) {
                let flags = self.row(self.cursor_y).line_flags() | LineFlags::WRAPPED;
                self.row_mut(self.cursor_y).set_line_flags(flags);
                self.carriage_return();
                self.line_feed();
            } else {
                self.cursor_x = self.width - w;
            }
        }

        let eng = self.eng;
        let width = self.width;
        let x = self.cursor_x;
        let insert = self.mode.contains(TermMode::INSERT);
        let autowrap = self.mode.contains(TermMode::AUTOWRAP);
        let mut attrs = self.attrs;
        attrs.link = self.current_link;
        let row = self.row_mut(self.cursor_y);

        if insert {
            for _ in 0..w {
                row.insert(x, &eng);
            }
            if row.columns() > width {
                row.resize(width, &eng);
            }
        }

        let mut cur = Cursor::new(x);
        row.replace(&mut cur, attrs, ch, w as u8, &eng);

        self.cursor_x = x + w;
        if self.cursor_x >= width {
            self.cursor_x = width - 1;
            if autowrap {
                self.pending_wrap = true;
            }
        }
        self.last_printed = Some((ch, w as u8));
    }

    /// Re-print the last graphic character (REP).
    pub(crate) fn repeat_last(&mut self, n: u32) {
        let Some((ch, _)) = self.last_printed else {
            return;
        };
        for _ in 0..n.max(1) {
            self.printable(ch as u32);
        }
    }

    /// DECALN: fill every cell with 'E'.
    pub(crate) fn screen_alignment_test(&mut self) {
        for row in &mut self.rows {
            let mut fresh = Row::new();
            for _ in 0..self.width {
                fresh.append(CellAttributes::default(), 'E', 1);
            }
            *row = fresh;
        }
        self.top_margin = 0;
        self.bottom_margin = self.height - 1;
        self.move_cursor(0, 0);
    }
}
