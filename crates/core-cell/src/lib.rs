//! Cell-grid row model.
//!
//! One logical terminal row: a UTF-8 buffer of user-perceived clusters,
//! column/cluster bookkeeping, and a coalesced run-length encoding of cell
//! attributes in column space. All mutators preserve the double-width
//! atomicity and run invariants documented on [`Row`].

mod attrs;
mod cursor;
mod row;

pub use attrs::{AttrFlags, AttrRange, CellAttributes, Color};
pub use cursor::{Cursor, CursorFlags};
pub use row::{LineFlags, Row};
