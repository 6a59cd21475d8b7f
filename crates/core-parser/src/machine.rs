//! The state-machine runtime.
//!
//! Drives the command graph one codepoint at a time, collecting captured
//! parameters, promoting 7-bit `ESC x` introducers to their 8-bit C1
//! forms, and recovering locally from anything it does not recognize.
//! Dispatch happens only at the leaf of a fully matched sequence, so a
//! malformed sequence can never half-apply.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::edge::Disposition;
use crate::error::ParseError;
use crate::graph::Graph;
use crate::HandlerId;

const ESC: u32 = 0x1b;
/// `ESC x` promotes to `x + 0x40` for these followers.
const ESCAPE_FOLLOWERS: &[u8] = b"DEHMNOPVWXZ[\\]^_";
/// C1 introducers (and ESC) that abort an in-progress sequence.
const RESTART_CODES: &[u32] = &[0x1b, 0x90, 0x9b, 0x9d, 0x9e, 0x9f];
/// Diagnostic dumps stop after this many codepoints.
const DUMP_LIMIT: usize = 100;
/// Default cap for text parameters; configurable per machine.
pub const SEQUENCE_FIELD_MAX: usize = 4096;

/// Read-only view of the captured state, handed to handlers at dispatch.
#[derive(Clone, Copy)]
pub struct Params<'a> {
    vars: &'a [(u8, String)],
    cur: &'a [u32],
    all: &'a [u32],
}

impl<'a> Params<'a> {
    /// First capture for a variable, or the empty string.
    pub fn var(&self, n: u8) -> &'a str {
        self.vars
            .iter()
            .find(|(v, _)| *v == n)
            .map(|(_, s)| s.as_str())
            .unwrap_or("")
    }

    /// All captures for a variable, in capture order.
    pub fn var_list(&self, n: u8) -> impl Iterator<Item = &'a str> {
        self.vars
            .iter()
            .filter(move |(v, _)| *v == n)
            .map(|(_, s)| s.as_str())
    }

    pub fn var_count(&self, n: u8) -> usize {
        self.vars.iter().filter(|(v, _)| *v == n).count()
    }

    /// First capture parsed as a number; empty or malformed captures
    /// default to 0.
    pub fn num(&self, n: u8) -> u32 {
        self.var(n).parse().unwrap_or(0)
    }

    /// Every capture for a variable parsed as a number, empty segments
    /// defaulting to 0. A sequence with no captures yields one implicit 0.
    pub fn nums(&self, n: u8) -> Vec<u32> {
        let list: Vec<u32> = self.var_list(n).map(|s| s.parse().unwrap_or(0)).collect();
        if list.is_empty() { vec![0] } else { list }
    }

    /// The parameter currently being accumulated.
    pub fn cur_sequence(&self) -> &'a [u32] {
        self.cur
    }

    /// The raw sequence so far, for diagnostics and introducer peeking.
    pub fn all_sequence(&self) -> &'a [u32] {
        self.all
    }

    /// Final codepoint of the sequence; for the shared control/print leaf
    /// this is the codepoint being executed or printed.
    pub fn last(&self) -> Option<u32> {
        self.all.last().copied()
    }
}

/// Receiver side of the dispatch contract: the emulator implements this.
pub trait Dispatch {
    fn dispatch(&mut self, id: HandlerId, params: Params<'_>);

    /// Diagnostic hook; the default swallows the report.
    fn internal_error(&mut self, _err: &ParseError) {}
}

pub struct Machine {
    graph: Arc<Graph>,
    node: u32,
    cur: Vec<u32>,
    all: Vec<u32>,
    vars: Vec<(u8, String)>,
    have_esc: bool,
    text_field_max: usize,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// Runtime over the shared standard graph.
    pub fn new() -> Self {
        Self::with_graph(Graph::standard())
    }

    pub fn with_graph(graph: Arc<Graph>) -> Self {
        let node = graph.root();
        Machine {
            graph,
            node,
            cur: Vec::new(),
            all: Vec::new(),
            vars: Vec::new(),
            have_esc: false,
            text_field_max: SEQUENCE_FIELD_MAX,
        }
    }

    /// Adjust the text-parameter cap (OSC/DCS bodies).
    pub fn set_text_field_max(&mut self, max: usize) {
        self.text_field_max = max;
    }

    #[inline]
    pub fn is_control_code(c: u32) -> bool {
        c <= 0x1f || (0x7f..=0x9f).contains(&c)
    }

    #[inline]
    pub fn is_restart_code(c: u32) -> bool {
        RESTART_CODES.contains(&c)
    }

    fn is_escape_follower(c: u32) -> bool {
        u8::try_from(c).is_ok_and(|b| ESCAPE_FOLLOWERS.contains(&b))
    }

    #[inline]
    pub fn cur_sequence(&self) -> &[u32] {
        &self.cur
    }

    #[inline]
    pub fn all_sequence(&self) -> &[u32] {
        &self.all
    }

    #[inline]
    pub(crate) fn text_field_max(&self) -> usize {
        self.text_field_max
    }

    /// Abandon any in-progress sequence and return to the root.
    pub fn reset(&mut self) {
        self.node = self.graph.root();
        self.cur.clear();
        self.all.clear();
        self.vars.clear();
        self.have_esc = false;
    }

    pub(crate) fn push(&mut self, c: u32) {
        self.cur.push(c);
        self.all.push(c);
    }

    /// Start accumulating the next parameter.
    pub(crate) fn next_field(&mut self) {
        self.cur.clear();
    }

    /// Capture the current parameter under a variable number.
    pub(crate) fn capture_var(&mut self, var: u8) {
        let s: String = self
            .cur
            .iter()
            .map(|&c| char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
        self.vars.push((var, s));
    }

    pub(crate) fn push_var_codepoint(&mut self, var: u8, c: u32) {
        let s = char::from_u32(c)
            .unwrap_or(char::REPLACEMENT_CHARACTER)
            .to_string();
        self.vars.push((var, s));
    }

    /// Feed one codepoint. NUL is ignored in every state; a pending 7-bit
    /// ESC is resolved against the follower table first.
    pub fn process(&mut self, c: u32, sink: &mut dyn Dispatch) {
        if c == 0 {
            return;
        }
        if self.have_esc {
            self.have_esc = false;
            if Self::is_escape_follower(c) {
                self.process_main(c + 0x40, sink);
            } else {
                self.process_main(ESC, sink);
                self.process_main(c, sink);
            }
        } else if c == ESC {
            self.have_esc = true;
        } else {
            self.process_main(c, sink);
        }
    }

    fn process_main(&mut self, c: u32, sink: &mut dyn Dispatch) {
        let graph = self.graph.clone();
        let Some(edge_id) = graph.find_edge(self.node, self, c) else {
            self.all.push(c);
            self.report_unrecognized(sink);
            return;
        };
        let edge = graph.edge(edge_id);
        match edge.process(self, c) {
            Disposition::Move => {
                self.node = edge.next;
                if let Some(id) = graph.leaf_of(self.node) {
                    self.call(id, sink);
                    self.reset();
                }
            }
            Disposition::Call => {
                let id = graph
                    .leaf_of(edge.next)
                    .expect("control edge target carries a handler");
                self.call(id, sink);
                // The control codepoint was pushed for the handler's
                // benefit only; it is not part of the sequence.
                self.cur.pop();
                self.all.pop();
            }
            Disposition::Skip => {
                self.node = edge.next;
                self.process_main(c, sink);
            }
            Disposition::Restart => {
                trace!(target: "parser.machine", codepoint = c, "restart");
                self.reset();
                self.process(c, sink);
            }
            Disposition::Reset => self.reset(),
            Disposition::Stay => {}
        }
    }

    fn call(&mut self, id: HandlerId, sink: &mut dyn Dispatch) {
        if id != HandlerId::Process {
            trace!(target: "parser.dispatch", handler = ?id);
        }
        let params = Params {
            vars: &self.vars,
            cur: &self.cur,
            all: &self.all,
        };
        sink.dispatch(id, params);
    }

    fn report_unrecognized(&mut self, sink: &mut dyn Dispatch) {
        let dump = self.dump_state();
        debug!(target: "parser.machine", sequence = %dump, "unrecognized control sequence");
        self.reset();
        sink.internal_error(&ParseError::UnrecognizedSequence(dump));
    }

    /// Printable rendition of the raw sequence for diagnostics: a lone
    /// control code prints caret-style, everything else space-separated
    /// with non-printables bracketed as `(nnn)`.
    fn dump_state(&self) -> String {
        if self.all.len() == 1 {
            let c = self.all[0];
            if c < 0x20 {
                return format!("^{}", char::from_u32(0x40 + c).unwrap_or('?'));
            }
            if c == 0x7f {
                return "^?".to_string();
            }
        }
        let mut out = String::new();
        for (i, &c) in self.all.iter().enumerate() {
            if i == DUMP_LIMIT {
                out.push_str(" ...");
                break;
            }
            if i > 0 {
                out.push(' ');
            }
            if (0x20..=0x7e).contains(&c) {
                out.push(char::from_u32(c).unwrap_or('?'));
            } else {
                out.push_str(&format!("({c})"));
            }
        }
        out
    }
}
