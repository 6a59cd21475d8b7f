//! XTerm-compatible emulator shell.
//!
//! Binds the control-sequence parser to the cell-grid model: command
//! dispatch, charset designation and invocation, screen and cursor state,
//! OSC handling, mouse-event encoding, and TOML configuration. Strictly
//! single-threaded; nothing here blocks or performs I/O beyond reading the
//! config file.

pub mod charset;
pub mod config;
mod dispatch;
mod emulator;
pub mod mouse;
mod osc;
mod term;

pub use config::Config;
pub use emulator::Emulator;
pub use term::{Term, TermMode};
