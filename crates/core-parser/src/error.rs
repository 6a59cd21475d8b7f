//! Parser diagnostics.
//!
//! No error escapes the parser: every malformed input produces at most one
//! diagnostic through [`crate::Dispatch::internal_error`] followed by a
//! reset. A parameter overflowing its length cap surfaces the same way,
//! because the overflowing edge refuses to match and the sequence becomes
//! unrecognizable.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No edge matched at a non-root node. Carries a printable dump of the
    /// full sequence, bracketing non-printable codepoints as `(nnn)` and
    /// truncating past 100 codepoints.
    #[error("unrecognized control sequence: {0}")]
    UnrecognizedSequence(String),
}
