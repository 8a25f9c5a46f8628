//! Type Scan - Find the Next Cell With a Given Widetag
//!
//! Steps through memory laid out as consecutive 2-word cells (primitive
//! object tables, list-like areas). Only the first word of each cell is
//! inspected. Regions holding variable-length objects must be walked with
//! the symbol search instead; stepping by 2 words would land mid-object.

use super::ScanContext;
use crate::heap::RegionOracle;
use crate::logging::ScanEvent;
use crate::object::{widetag_of, ObjectSizeOracle, WideTag, WORD_BYTES};
use std::time::Instant;

/// Words per cell
pub const CELL_WORDS: usize = 2;

const CELL_BYTES: usize = CELL_WORDS * WORD_BYTES;

/// How many words a type scan may read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// Stop only at a match or the region boundary
    Unbounded,
    /// Words left; each examined cell costs [`CELL_WORDS`]
    Words(usize),
}

impl Budget {
    /// Budget of `n` words
    pub fn words(n: usize) -> Self {
        Budget::Words(n)
    }

    /// Words left, or None if unbounded
    pub fn remaining(&self) -> Option<usize> {
        match self {
            Budget::Unbounded => None,
            Budget::Words(n) => Some(*n),
        }
    }

    /// True once a bounded budget reaches zero
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Budget::Words(0))
    }

    fn charge(&mut self, words: usize) {
        if let Budget::Words(n) = self {
            *n = n.saturating_sub(words);
        }
    }
}

impl From<Option<usize>> for Budget {
    fn from(words: Option<usize>) -> Self {
        words.map_or(Budget::Unbounded, Budget::Words)
    }
}

/// Advance `cursor` to the next cell whose first word has widetag `tag`
///
/// While the budget allows and `cursor` is managed memory, reads the word
/// at `cursor`, charges the budget 2 words, and either stops on a match or
/// steps `cursor` forward one cell.
///
/// Returns true with `cursor` at the matching cell. Returns false when the
/// cursor leaves managed memory or the budget runs out; `cursor` then
/// points at the first cell not examined. `cursor` and `budget` are left
/// as scan state either way, so a caller can resume.
pub fn find_next_of_type<R, S>(
    ctx: &ScanContext<'_, R, S>,
    tag: WideTag,
    cursor: &mut usize,
    budget: &mut Budget,
) -> bool
where
    R: RegionOracle + ?Sized,
    S: ObjectSizeOracle,
{
    let timer = Instant::now();
    let start = *cursor;
    ctx.emit(ScanEvent::ScanStart {
        scanner: "type",
        start,
        end: None,
    });

    let mut examined = 0u64;
    let found = loop {
        if budget.is_exhausted() {
            ctx.emit(ScanEvent::BudgetExhausted {
                cursor: *cursor,
                examined,
            });
            break false;
        }

        let Some(word) = ctx.view().load(*cursor) else {
            break false;
        };
        budget.charge(CELL_WORDS);
        examined += 1;
        ctx.bump(|s| &s.cells_examined);

        if widetag_of(word) == Some(tag) {
            break true;
        }

        match cursor.checked_add(CELL_BYTES) {
            Some(next) => *cursor = next,
            None => break false,
        }
    };

    log::debug!(
        "type scan for {:?} from {:#x}: {} after {} cells",
        tag,
        start,
        if found { "found" } else { "not found" },
        examined
    );
    ctx.emit(ScanEvent::ScanEnd {
        scanner: "type",
        visited: examined,
        found: found.then_some(*cursor),
        duration_us: timer.elapsed().as_micros() as u64,
    });

    found
}

/// Iterator over successive cells carrying one widetag
///
/// Created by [`ScanContext::cells_of_type`]. After each match the scan
/// resumes one cell further on, sharing a single budget.
pub struct TypeCells<'c, 'r, R: RegionOracle + ?Sized, S> {
    ctx: &'c ScanContext<'r, R, S>,
    tag: WideTag,
    cursor: usize,
    budget: Budget,
    done: bool,
}

impl<'c, 'r, R: RegionOracle + ?Sized, S: ObjectSizeOracle> TypeCells<'c, 'r, R, S> {
    pub(super) fn new(ctx: &'c ScanContext<'r, R, S>, tag: WideTag, start: usize, budget: Budget) -> Self {
        Self {
            ctx,
            tag,
            cursor: start,
            budget,
            done: false,
        }
    }

    /// Budget left
    pub fn budget(&self) -> Budget {
        self.budget
    }
}

impl<R: RegionOracle + ?Sized, S: ObjectSizeOracle> Iterator for TypeCells<'_, '_, R, S> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.done {
            return None;
        }
        if !find_next_of_type(self.ctx, self.tag, &mut self.cursor, &mut self.budget) {
            self.done = true;
            return None;
        }
        let hit = self.cursor;
        match self.cursor.checked_add(CELL_BYTES) {
            Some(next) => self.cursor = next,
            None => self.done = true,
        }
        Some(hit)
    }
}
