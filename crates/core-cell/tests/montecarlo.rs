//! Randomized integrity soak over a fixed-width row.
//!
//! Mirrors the shape of real terminal traffic: bursts of attributed
//! writes, the occasional wide character, and region erases, with the row
//! invariants checked after every operation.

mod common;

use common::*;
use core_cell::{AttrRange, CellAttributes, Cursor, Row};
use proptest::prelude::*;

const ROW_LENGTH: u32 = 80;

#[derive(Debug, Clone)]
enum Op {
    /// Write `count` single-width characters starting at `start`.
    Write { start: u32, count: u32, attr: u8 },
    /// Write one double-width character at `start`.
    WriteWide { start: u32, attr: u8 },
    /// Erase a region.
    Erase { start: u32, count: u32 },
    /// Insert then truncate back to the row length.
    Insert { at: u32 },
    /// Remove then pad back out.
    Remove { at: u32 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..ROW_LENGTH, 0..ROW_LENGTH / 2, 0u8..4).prop_map(|(start, count, attr)| {
            Op::Write { start, count, attr }
        }),
        2 => (0..ROW_LENGTH, 0u8..4).prop_map(|(start, attr)| Op::WriteWide { start, attr }),
        1 => (0..ROW_LENGTH, 0..ROW_LENGTH / 2).prop_map(|(start, count)| {
            Op::Erase { start, count }
        }),
        1 => (0..ROW_LENGTH).prop_map(|at| Op::Insert { at }),
        1 => (0..ROW_LENGTH).prop_map(|at| Op::Remove { at }),
    ]
}

fn attr_of(code: u8) -> CellAttributes {
    match code {
        0 => CellAttributes::default(),
        n => flags(n as u32),
    }
}

fn check_integrity(r: &Row) {
    let measured: u32 = eng().segment(r.text()).map(|c| c.width as u32).sum();
    assert_eq!(r.columns(), measured, "column bookkeeping drifted");

    let rs: &[AttrRange] = r.ranges();
    for run in rs {
        assert!(run.start <= run.end, "inverted run");
        assert!(run.end < r.columns(), "run beyond the row");
        assert!(!run.attrs.is_default(), "explicit default run");
    }
    for pair in rs.windows(2) {
        assert!(pair[0].end < pair[1].start, "overlapping runs");
        assert!(
            !(pair[0].end + 1 == pair[1].start && pair[0].attrs == pair[1].attrs),
            "uncoalesced equal neighbors"
        );
    }
}

fn apply(r: &mut Row, op: &Op) {
    let e = eng();
    match *op {
        Op::Write { start, count, attr } => {
            let count = count.min(ROW_LENGTH - start);
            let mut cursor = Cursor::new(start);
            for i in 0..count {
                cursor.set_x(start + i);
                r.update_cursor(&mut cursor, &e);
                r.replace(&mut cursor, attr_of(attr), 'A', 1, &e);
            }
        }
        Op::WriteWide { start, attr } => {
            let start = start.min(ROW_LENGTH - 2);
            let mut cursor = Cursor::new(start);
            r.update_cursor(&mut cursor, &e);
            r.replace(&mut cursor, attr_of(attr), '\u{FFE6}', 2, &e);
        }
        Op::Erase { start, count } => {
            r.erase(start, start + count, &e);
        }
        Op::Insert { at } => {
            r.insert(at, &e);
            r.resize(ROW_LENGTH, &e);
        }
        Op::Remove { at } => {
            r.remove(at, &e);
            r.resize(ROW_LENGTH, &e);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn row_invariants_survive_random_traffic(ops in prop::collection::vec(op_strategy(), 1..120)) {
        let mut r = Row::new();
        for _ in 0..ROW_LENGTH {
            r.append(CellAttributes::default(), ' ', 1);
        }
        check_integrity(&r);

        for op in &ops {
            apply(&mut r, op);
            check_integrity(&r);
            prop_assert_eq!(r.columns(), ROW_LENGTH);
        }
    }
}
