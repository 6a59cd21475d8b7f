//! Edge primitives of the state-machine graph.
//!
//! Each edge is a matcher/consumer pair: `matches` decides whether the
//! edge accepts a codepoint in the current parser state, `process` consumes
//! it and tells the runtime how to proceed. Literal edges live in a node's
//! keyed map and are never match-tested; every other kind sits in the
//! node's ordered list.

use crate::machine::Machine;

/// Index of a node in the graph arena.
pub type NodeId = u32;
/// Index of an edge in the graph arena.
pub type EdgeId = u32;

/// Numeric parameters stop matching past this many digits.
const NUMERIC_MAX: usize = 32;

#[inline]
fn is_digit(c: u32) -> bool {
    (0x30..=0x39).contains(&c)
}

/// What the runtime does after an edge consumed a codepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Keep the current node.
    Stay,
    /// Advance to the edge's target; dispatch and reset if it is a leaf.
    Move,
    /// Advance to the target, then re-process the same codepoint there.
    Skip,
    /// Abort the sequence and re-process the codepoint from the root.
    Restart,
    /// Abort the sequence.
    Reset,
    /// Dispatch the target's handler without advancing.
    Call,
}

#[derive(Debug, Clone)]
pub enum EdgeKind {
    /// Exact codepoint; also the shared match-anything print edge.
    Literal,
    /// Any C0/C1 control code; restart codes abort an open sequence.
    Control,
    /// One codepoint captured as a variable.
    SingleChar { var: u8 },
    /// A digit string ended by one of the accepted terminators.
    SingleNumeric { var: u8, terminators: Vec<u32> },
    /// Semicolon-separated digit strings; each segment is one capture.
    MultiNumeric {
        var: u8,
        separator: u32,
        terminators: Vec<u32>,
    },
    /// Free text up to a terminator, bounded by the configured field cap.
    SingleText { var: u8, terminators: Vec<u32> },
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub kind: EdgeKind,
    pub next: NodeId,
}

impl Edge {
    pub fn new(kind: EdgeKind, next: NodeId) -> Self {
        Edge { kind, next }
    }

    pub fn matches(&self, st: &Machine, c: u32) -> bool {
        match &self.kind {
            EdgeKind::Literal => true,
            EdgeKind::Control => Machine::is_control_code(c),
            EdgeKind::SingleChar { .. } => true,
            EdgeKind::SingleNumeric { terminators, .. } => {
                if terminators.contains(&c) {
                    return true;
                }
                if st.cur_sequence().len() > NUMERIC_MAX {
                    return false;
                }
                is_digit(c)
            }
            EdgeKind::MultiNumeric {
                separator,
                terminators,
                ..
            } => {
                if terminators.contains(&c) || c == *separator {
                    return true;
                }
                if st.cur_sequence().len() > NUMERIC_MAX {
                    return false;
                }
                is_digit(c)
            }
            EdgeKind::SingleText { terminators, .. } => {
                if terminators.contains(&c) {
                    return true;
                }
                if st.cur_sequence().len() > st.text_field_max() {
                    return false;
                }
                !Machine::is_restart_code(c)
            }
        }
    }

    pub fn process(&self, st: &mut Machine, c: u32) -> Disposition {
        match &self.kind {
            EdgeKind::Literal => {
                st.push(c);
                st.next_field();
                Disposition::Move
            }
            EdgeKind::Control => {
                let rc = if Machine::is_restart_code(c) {
                    if st.all_sequence().is_empty() {
                        Disposition::Move
                    } else {
                        Disposition::Restart
                    }
                } else {
                    Disposition::Call
                };
                // No next_field here: an embedded control char must not
                // start a new parameter.
                st.push(c);
                rc
            }
            EdgeKind::SingleChar { var } => {
                st.push_var_codepoint(*var, c);
                st.push(c);
                st.next_field();
                Disposition::Move
            }
            EdgeKind::SingleNumeric { var, terminators } => {
                if terminators.contains(&c) {
                    st.capture_var(*var);
                    st.next_field();
                    return Disposition::Skip;
                }
                st.push(c);
                Disposition::Stay
            }
            EdgeKind::MultiNumeric {
                var,
                separator,
                terminators,
            } => {
                if terminators.contains(&c) {
                    st.capture_var(*var);
                    st.next_field();
                    return Disposition::Skip;
                }
                if c == *separator {
                    st.capture_var(*var);
                    st.push(c);
                    st.next_field();
                    return Disposition::Stay;
                }
                st.push(c);
                Disposition::Stay
            }
            EdgeKind::SingleText { var, terminators } => {
                if terminators.contains(&c) {
                    st.capture_var(*var);
                    st.next_field();
                    return Disposition::Skip;
                }
                st.push(c);
                Disposition::Stay
            }
        }
    }

    /// Structural kind check used while sharing edges during graph build.
    pub(crate) fn is_kind(&self, other: &EdgeKind) -> bool {
        matches!(
            (&self.kind, other),
            (EdgeKind::SingleNumeric { .. }, EdgeKind::SingleNumeric { .. })
                | (EdgeKind::MultiNumeric { .. }, EdgeKind::MultiNumeric { .. })
                | (EdgeKind::SingleText { .. }, EdgeKind::SingleText { .. })
        )
    }

    pub(crate) fn add_terminator(&mut self, terminator: u32) {
        match &mut self.kind {
            EdgeKind::SingleNumeric { terminators, .. }
            | EdgeKind::MultiNumeric { terminators, .. }
            | EdgeKind::SingleText { terminators, .. } => {
                if !terminators.contains(&terminator) {
                    terminators.push(terminator);
                }
            }
            _ => {}
        }
    }
}
