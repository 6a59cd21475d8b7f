//! The emulator shell: parser runtime bound to the terminal state.

use core_parser::Machine;

use crate::config::Config;
use crate::mouse::MouseEvent;
use crate::term::Term;

/// An XTerm-compatible emulator core. Feed it decoded codepoints; read
/// screen state and drain replies.
pub struct Emulator {
    machine: Machine,
    term: Term,
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Emulator {
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        let mut machine = Machine::new();
        machine.set_text_field_max(config.file.parser.text_field_max);
        Emulator {
            machine,
            term: Term::new(config),
        }
    }

    /// Feed one decoded codepoint through the state machine.
    pub fn process(&mut self, c: u32) {
        self.machine.process(c, &mut self.term);
    }

    /// Convenience wrapper feeding every scalar of a string.
    pub fn process_str(&mut self, s: &str) {
        for ch in s.chars() {
            self.process(ch as u32);
        }
    }

    /// Encode a mouse event under the current tracking mode; the wire
    /// bytes join the reply buffer.
    pub fn mouse_event(&mut self, ev: &MouseEvent, x: u32, y: u32) {
        self.term.mouse_event(ev, x, y);
    }

    /// Abort any partially parsed sequence.
    pub fn reset_parser(&mut self) {
        self.machine.reset();
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn term_mut(&mut self) -> &mut Term {
        &mut self.term
    }

    /// Drain pending query responses and mouse reports.
    pub fn take_replies(&mut self) -> Vec<u8> {
        self.term.take_replies()
    }
}
