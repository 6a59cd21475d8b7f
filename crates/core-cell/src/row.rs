//! The cell row: cluster text plus coalesced attribute runs.
//!
//! A row owns a UTF-8 buffer of clusters in left-to-right order, a cluster
//! count, a column count, and a run-length encoding of per-cell attributes
//! keyed in *column* space (inclusive ends). The implicit default attribute
//! fills every column no run covers.
//!
//! Invariants, restored after every public mutation:
//! - `columns` equals the sum of the cluster widths.
//! - Runs are sorted, disjoint, and never touch with equal attributes.
//! - A run over a double-width cluster spans both of its columns and
//!   carries `DBL_WIDTH_CHAR`; splitting the cluster clears the flag and
//!   leaves two single blanks. No half-width orphan ever persists.
//! - Combining codepoints always follow their base; no operation splits a
//!   cluster except `split_char`.
//!
//! Per-cluster widths are always taken from the oracle during scans. The
//! stored `columns` total is authoritative only for overreach arithmetic,
//! which lets restored rows disagree with the oracle without breaking the
//! cursor contract.

use bitflags::bitflags;
use core_unicode::WidthEngine;

use crate::attrs::{AttrFlags, AttrRange, CellAttributes};
use crate::cursor::{Cursor, CursorFlags};

bitflags! {
    /// Per-line rendering attributes (DECDWL / DECDHL) and wrap state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LineFlags: u8 {
        const DOUBLE_WIDTH  = 1 << 0;
        const DOUBLE_TOP    = 1 << 1;
        const DOUBLE_BOTTOM = 1 << 2;
        const WRAPPED       = 1 << 3;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    text: String,
    clusters: u32,
    columns: u32,
    ranges: Vec<AttrRange>,
    line_flags: LineFlags,
}

/// Position of the cluster containing a column, produced by a scan.
struct Spot {
    /// Starting column of the cluster; total measured columns at the end.
    col: u32,
    /// Cluster index.
    pos: u32,
    /// Byte offset of the cluster start; text length at the end.
    ptr: usize,
    /// Byte length of the cluster; 0 at the end.
    len: usize,
    /// Cluster width; 0 at the end.
    width: u8,
}

impl Row {
    pub fn new() -> Self {
        Row::default()
    }

    /// Reconstitute a row from transferred parts without re-segmentation.
    pub fn restore(text: impl Into<String>, clusters: u32, columns: u32) -> Self {
        Row {
            text: text.into(),
            clusters,
            columns,
            ranges: Vec::new(),
            line_flags: LineFlags::empty(),
        }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    #[inline]
    pub fn clusters(&self) -> u32 {
        self.clusters
    }

    #[inline]
    pub fn ranges(&self) -> &[AttrRange] {
        &self.ranges
    }

    /// Install a complete run vector (wire restore and tests). The caller
    /// is responsible for handing over sorted, disjoint runs.
    pub fn set_ranges(&mut self, ranges: Vec<AttrRange>) {
        self.ranges = ranges;
    }

    #[inline]
    pub fn line_flags(&self) -> LineFlags {
        self.line_flags
    }

    pub fn set_line_flags(&mut self, flags: LineFlags) {
        self.line_flags = flags;
    }

    /// Locate the cluster containing column `x`.
    fn spot_at(&self, eng: &WidthEngine, x: u32) -> Spot {
        let mut col = 0u32;
        let mut pos = 0u32;
        for cl in eng.segment(&self.text) {
            let w = cl.width as u32;
            if w > 0 && x >= col && x < col + w {
                return Spot {
                    col,
                    pos,
                    ptr: cl.range.start,
                    len: cl.len(),
                    width: cl.width,
                };
            }
            col += w;
            pos += 1;
        }
        Spot {
            col,
            pos,
            ptr: self.text.len(),
            len: 0,
            width: 0,
        }
    }

    /// Reconcile `pos`, `ptr` and the alignment flags from the cursor's
    /// intended column.
    pub fn update_cursor(&self, cursor: &mut Cursor, eng: &WidthEngine) {
        let x = cursor.x();
        let s = self.spot_at(eng, x);
        if s.width == 0 {
            // Past the measured content: virtual trailing blanks, counted
            // against the stored column total.
            let pos = self.clusters + x.saturating_sub(self.columns);
            cursor.resolve(pos, self.text.len(), CursorFlags::empty());
        } else if s.col == x {
            let flags = if s.width == 2 {
                CursorFlags::ON_DOUBLE_LEFT
            } else {
                CursorFlags::empty()
            };
            cursor.resolve(s.pos, s.ptr, flags);
        } else {
            cursor.resolve(s.pos, s.ptr, CursorFlags::ON_DOUBLE_RIGHT);
        }
    }

    /// Append one cluster of the given width at the end of the row.
    pub fn append(&mut self, attrs: CellAttributes, cp: char, width: u8) {
        debug_assert!(width == 1 || width == 2, "append width must be 1 or 2");
        let start = self.columns;
        self.text.push(cp);
        self.clusters += 1;
        self.columns += width as u32;
        if !attrs.is_default() {
            let mut attrs = attrs;
            if width == 2 {
                attrs.flags |= AttrFlags::DBL_WIDTH_CHAR;
            }
            self.push_range(start, start + width as u32 - 1, attrs);
        }
    }

    /// Overwrite `width` columns at the cursor with one cluster.
    ///
    /// Double-width clusters cut by either edge of the written region are
    /// split into blanks first, so no half survives; writing past the end
    /// grows the row, and a cursor beyond the end materializes the virtual
    /// blanks in between.
    pub fn replace(
        &mut self,
        cursor: &mut Cursor,
        attrs: CellAttributes,
        cp: char,
        width: u8,
        eng: &WidthEngine,
    ) {
        debug_assert!(width == 1 || width == 2, "replace width must be 1 or 2");
        let x = cursor.x();
        while self.columns < x {
            self.append(CellAttributes::default(), ' ', 1);
        }
        self.update_cursor(cursor, eng);
        if cursor.flags().contains(CursorFlags::ON_DOUBLE_RIGHT) {
            self.split_char(cursor.ptr(), x - 1, eng);
            self.update_cursor(cursor, eng);
        }

        let w = w32(width);
        // Consume whole clusters covering [x, x+w); split any cluster the
        // end boundary would cut in half.
        let (lo, hi, removed, covered) = loop {
            let lo = cursor.ptr();
            let mut covered = 0u32;
            let mut hi = lo;
            let mut removed = 0u32;
            let mut straddle = None;
            for cl in eng.segment(&self.text[lo..]) {
                if covered >= w {
                    break;
                }
                let cw = cl.width as u32;
                if covered + cw > w {
                    straddle = Some((lo + cl.range.start, x + covered));
                    break;
                }
                covered += cw;
                hi = lo + cl.range.end;
                removed += 1;
            }
            match straddle {
                Some((ptr, col)) => {
                    self.split_char(ptr, col, eng);
                }
                None => break (lo, hi, removed, covered),
            }
        };

        let mut buf = [0u8; 4];
        self.text.replace_range(lo..hi, cp.encode_utf8(&mut buf));
        self.clusters = self.clusters - removed + 1;
        self.columns += w - covered;

        self.ranges_erase(x, x + w);
        if !attrs.is_default() {
            let mut attrs = attrs;
            if width == 2 {
                attrs.flags |= AttrFlags::DBL_WIDTH_CHAR;
            }
            self.ranges_set(x, x + w - 1, attrs);
        }
        self.coalesce();
        self.update_cursor(cursor, eng);
    }

    /// Insert one blank single-width column at `col`, shifting the rest of
    /// the row right.
    pub fn insert(&mut self, col: u32, eng: &WidthEngine) {
        let col = col.min(self.columns);
        let s = self.spot_at(eng, col);
        let ptr = if s.width == 0 {
            self.text.len()
        } else if s.col == col {
            s.ptr
        } else {
            // Falls inside a double-width cluster: break it apart first.
            self.split_char(s.ptr, s.col, eng);
            s.ptr + (col - s.col) as usize
        };
        self.text.insert(ptr, ' ');
        self.clusters += 1;
        self.columns += 1;
        self.ranges_open(col);
        self.coalesce();
    }

    /// Remove one column, shifting the rest of the row left. Removing
    /// either half of a double-width cluster blanks the other half first.
    pub fn remove(&mut self, col: u32, eng: &WidthEngine) {
        if col >= self.columns {
            return;
        }
        let s = self.spot_at(eng, col);
        if s.width == 0 {
            // Virtual trailing region; only the bookkeeping shrinks.
            self.columns -= 1;
            self.ranges_delete(col, 1);
            self.coalesce();
            return;
        }
        let (ptr, len) = if s.width == 2 {
            self.split_char(s.ptr, s.col, eng);
            (s.ptr + (col - s.col) as usize, 1)
        } else {
            (s.ptr, s.len)
        };
        self.text.replace_range(ptr..ptr + len, "");
        self.clusters -= 1;
        self.columns -= 1;
        self.ranges_delete(col, 1);
        self.coalesce();
    }

    /// Replace columns `[start, end)` with default-attribute blanks. `end`
    /// past the row is clamped; an empty interval is a no-op.
    pub fn erase(&mut self, start: u32, end: u32, eng: &WidthEngine) {
        let end = end.min(self.columns);
        if start >= end {
            return;
        }
        self.split_boundary(start, eng);
        self.split_boundary(end, eng);

        let mut lo = self.text.len();
        let mut hi = self.text.len();
        let mut removed = 0u32;
        let mut col = 0u32;
        for cl in eng.segment(&self.text) {
            let c0 = col;
            col += cl.width as u32;
            if c0 < start {
                continue;
            }
            if c0 >= end {
                break;
            }
            if removed == 0 {
                lo = cl.range.start;
            }
            hi = cl.range.end;
            removed += 1;
        }

        let blanks = " ".repeat((end - start) as usize);
        self.text.replace_range(lo..hi, &blanks);
        self.clusters = self.clusters - removed + (end - start);
        self.ranges_erase(start, end);
        self.coalesce();
    }

    /// Truncate to `new_columns` or extend with default blanks. Truncation
    /// through a double-width cluster blanks its left half.
    pub fn resize(&mut self, new_columns: u32, eng: &WidthEngine) {
        if new_columns == self.columns {
            return;
        }
        if new_columns > self.columns {
            for _ in self.columns..new_columns {
                self.text.push(' ');
                self.clusters += 1;
            }
            self.columns = new_columns;
            return;
        }
        self.split_boundary(new_columns, eng);

        let mut col = 0u32;
        let mut keep_bytes = 0usize;
        let mut keep_clusters = 0u32;
        for cl in eng.segment(&self.text) {
            if col >= new_columns {
                break;
            }
            col += cl.width as u32;
            keep_bytes = cl.range.end;
            keep_clusters += 1;
        }
        self.text.truncate(keep_bytes);
        self.clusters = keep_clusters;
        self.columns = new_columns;

        self.ranges.retain(|r| r.start < new_columns);
        for r in &mut self.ranges {
            if r.end >= new_columns {
                r.end = new_columns - 1;
            }
        }
        self.coalesce();
    }

    /// Bytes of the clusters whose starting column lies in `[start, end)`.
    ///
    /// Clusters are never split: a double-width cluster is excluded when
    /// `start` lands on its right half and included when `end` covers only
    /// its left half.
    pub fn substr(&self, start: u32, end: u32, eng: &WidthEngine) -> &str {
        if start >= end {
            return "";
        }
        let mut col = 0u32;
        let mut lo = 0usize;
        let mut hi = 0usize;
        let mut found = false;
        for cl in eng.segment(&self.text) {
            let c0 = col;
            col += cl.width as u32;
            if c0 < start {
                continue;
            }
            if c0 >= end {
                break;
            }
            if !found {
                lo = cl.range.start;
                found = true;
            }
            hi = cl.range.end;
        }
        if !found { "" } else { &self.text[lo..hi] }
    }

    /// `substr` from `start` through the end of the row.
    pub fn substr_to_end(&self, start: u32, eng: &WidthEngine) -> &str {
        self.substr(start, u32::MAX, eng)
    }

    /// Convert the cluster at byte offset `ptr` (starting at column `col`)
    /// into as many single-width blanks as it occupied, preserving the
    /// column count. Returns the byte offset of the first blank.
    pub fn split_char(&mut self, ptr: usize, col: u32, eng: &WidthEngine) -> usize {
        let Some(cl) = eng.segment(&self.text[ptr..]).next() else {
            return ptr;
        };
        let w = cl.width as usize;
        if w == 0 {
            // Splitting a zero-width cluster would invent a column; leave
            // the cluster alone.
            debug_assert!(false, "split_char on a zero-width cluster");
            return ptr;
        }
        let blanks = " ".repeat(w);
        self.text.replace_range(ptr..ptr + cl.len(), &blanks);
        self.clusters += w as u32 - 1;
        if w == 2 {
            self.ranges_clear_dwf(col);
        }
        self.coalesce();
        ptr
    }

    /// Remove the cluster at `ptr` with all its trailing combiners,
    /// decrementing `clusters` but not `columns`; the caller accounts for
    /// the width. Runs do not move because no column does.
    pub fn merge_chars(&mut self, ptr: usize, _col: u32, eng: &WidthEngine) {
        let Some(cl) = eng.segment(&self.text[ptr..]).next() else {
            return;
        };
        let len = cl.len();
        self.text.replace_range(ptr..ptr + len, "");
        self.clusters -= 1;
    }

    /// Remove the cluster at `ptr` entirely, shrinking both `clusters` and
    /// `columns` by its width and shifting later runs left.
    pub fn remove_char(&mut self, ptr: usize, col: u32, eng: &WidthEngine) {
        let Some(cl) = eng.segment(&self.text[ptr..]).next() else {
            return;
        };
        let w = cl.width as u32;
        let len = cl.len();
        self.text.replace_range(ptr..ptr + len, "");
        self.clusters -= 1;
        self.columns = self.columns.saturating_sub(w);
        if w > 0 {
            self.ranges_delete(col, w);
            self.coalesce();
        }
    }

    /// Attach a zero-width codepoint to the cluster ending at the cursor.
    /// A cursor at the start of the row has no base to combine with; the
    /// input is dropped.
    pub fn add_combiner(&mut self, cursor: &Cursor, cp: char) {
        let ptr = cursor.ptr();
        if ptr == 0 || ptr > self.text.len() {
            return;
        }
        self.text.insert(ptr, cp);
    }

    /// Split a double-width cluster cut in half by a column boundary.
    fn split_boundary(&mut self, boundary: u32, eng: &WidthEngine) {
        let s = self.spot_at(eng, boundary);
        if s.width == 2 && s.col < boundary {
            self.split_char(s.ptr, s.col, eng);
        }
    }

    // ---- run maintenance -------------------------------------------------

    /// Append a run at the tail, merging into the previous run when the
    /// attributes match and the columns abut.
    fn push_range(&mut self, start: u32, end: u32, attrs: CellAttributes) {
        if let Some(last) = self.ranges.last_mut()
            && last.attrs == attrs
            && last.end + 1 == start
        {
            last.end = end;
            return;
        }
        self.ranges.push(AttrRange::new(start, end, attrs));
    }

    /// Remove run coverage over `[start, end)` without moving columns.
    fn ranges_erase(&mut self, start: u32, end: u32) {
        if start >= end {
            return;
        }
        let last = end - 1;
        let mut out = Vec::with_capacity(self.ranges.len() + 1);
        for r in self.ranges.drain(..) {
            if r.end < start || r.start > last {
                out.push(r);
            } else if r.start < start && r.end > last {
                out.push(AttrRange::new(r.start, start - 1, r.attrs));
                out.push(AttrRange::new(end, r.end, r.attrs));
            } else if r.start < start {
                out.push(AttrRange::new(r.start, start - 1, r.attrs));
            } else if r.end > last {
                out.push(AttrRange::new(end, r.end, r.attrs));
            }
            // fully covered: dropped
        }
        self.ranges = out;
    }

    /// Install a run over the inclusive interval, assuming its coverage was
    /// just erased.
    fn ranges_set(&mut self, start: u32, end: u32, attrs: CellAttributes) {
        let idx = self.ranges.partition_point(|r| r.start < start);
        self.ranges.insert(idx, AttrRange::new(start, end, attrs));
    }

    /// Open a one-column gap at `col`: runs starting at or after it shift
    /// right, a run straddling it splits around the new blank.
    fn ranges_open(&mut self, col: u32) {
        let mut out = Vec::with_capacity(self.ranges.len() + 1);
        for r in self.ranges.drain(..) {
            if r.start >= col {
                out.push(AttrRange::new(r.start + 1, r.end + 1, r.attrs));
            } else if r.end >= col {
                out.push(AttrRange::new(r.start, col - 1, r.attrs));
                out.push(AttrRange::new(col + 1, r.end + 1, r.attrs));
            } else {
                out.push(r);
            }
        }
        self.ranges = out;
    }

    /// Delete `width` columns starting at `col`: coverage inside vanishes,
    /// later runs shift left.
    fn ranges_delete(&mut self, col: u32, width: u32) {
        let cut_end = col + width;
        let mut out = Vec::with_capacity(self.ranges.len());
        for r in self.ranges.drain(..) {
            let s = if r.start >= cut_end {
                r.start - width
            } else if r.start >= col {
                col
            } else {
                r.start
            };
            let e = if r.end >= cut_end {
                r.end - width
            } else if r.end >= col {
                match col.checked_sub(1) {
                    Some(e) => e,
                    None => continue,
                }
            } else {
                r.end
            };
            if e >= s {
                out.push(AttrRange::new(s, e, r.attrs));
            }
        }
        self.ranges = out;
    }

    /// Clear the double-width marker over one cluster's two columns. A run
    /// spanning several double-width clusters splits around this one; a
    /// marker-only run degenerates to the default and vanishes.
    fn ranges_clear_dwf(&mut self, col: u32) {
        let covering = self
            .ranges
            .iter()
            .find(|r| r.start <= col && col <= r.end)
            .copied();
        let Some(r) = covering else {
            return;
        };
        if !r.attrs.flags.contains(AttrFlags::DBL_WIDTH_CHAR) {
            return;
        }
        let mut attrs = r.attrs;
        attrs.flags.remove(AttrFlags::DBL_WIDTH_CHAR);
        self.ranges_erase(col, col + 2);
        if !attrs.is_default() {
            self.ranges_set(col, col + 1, attrs);
        }
    }

    /// Merge adjacent runs with equal attributes and drop degenerates.
    fn coalesce(&mut self) {
        let mut out: Vec<AttrRange> = Vec::with_capacity(self.ranges.len());
        for r in self.ranges.drain(..) {
            if r.end < r.start {
                continue;
            }
            if let Some(last) = out.last_mut()
                && last.attrs == r.attrs
                && last.end + 1 == r.start
            {
                last.end = r.end;
                continue;
            }
            out.push(r);
        }
        self.ranges = out;
    }
}

#[inline]
fn w32(w: u8) -> u32 {
    w as u32
}
