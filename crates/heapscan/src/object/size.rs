//! Object Sizing
//!
//! Walkers advance past an object by asking how many words it spans. The
//! answer depends only on the header and, for vectors, the length slot.

use super::layout::{align_words, vector, CONS_SIZE};
use super::tag::{fixnum_value, header_data, is_header, widetag_of, WideTag, Word, WORD_BYTES};
use crate::heap::RegionOracle;
use crate::memory::HeapView;

/// Computes object sizes in words
pub trait ObjectSizeOracle {
    /// Words spanned by the object whose first word is `header` at `address`
    ///
    /// Must be at least 1. `header` is the word already read from `address`.
    fn object_size_words<R: RegionOracle + ?Sized>(
        &self,
        view: &HeapView<'_, R>,
        header: Word,
        address: usize,
    ) -> usize;
}

/// Size oracle for this crate's object layouts
///
/// | Kind | Words |
/// |------|-------|
/// | non-header word (list cell) | 2 |
/// | fixed object | `1 + header data` |
/// | simple vector | `2 + n` |
/// | u8 array | `2 + ceil(n / 8)` |
/// | base string | `2 + ceil((n + 1) / 8)` |
/// | character string | `2 + ceil((n + 1) * 4 / 8)` |
///
/// Every size is rounded up to an even word count.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutSizeOracle;

impl LayoutSizeOracle {
    /// Words needed for a vector of kind `tag` holding `len` elements
    ///
    /// Includes the header and length slot.
    pub fn vector_words(tag: WideTag, len: u64) -> Option<usize> {
        let len = usize::try_from(len).ok()?;
        let data = match tag {
            WideTag::SimpleVector => len,
            WideTag::SimpleArrayU8 => len.checked_add(WORD_BYTES - 1)? / WORD_BYTES,
            WideTag::SimpleBaseString => len.checked_add(WORD_BYTES)? / WORD_BYTES,
            WideTag::SimpleCharacterString => {
                len.checked_add(1)?.checked_mul(4)?.checked_add(WORD_BYTES - 1)? / WORD_BYTES
            },
            _ => return None,
        };
        data.checked_add(vector::DATA_SLOT).map(align_words)
    }
}

impl ObjectSizeOracle for LayoutSizeOracle {
    fn object_size_words<R: RegionOracle + ?Sized>(
        &self,
        view: &HeapView<'_, R>,
        header: Word,
        address: usize,
    ) -> usize {
        if !is_header(header) {
            return CONS_SIZE;
        }

        // is_header guarantees a known widetag
        let Some(tag) = widetag_of(header) else {
            return CONS_SIZE;
        };

        if tag.is_vector() {
            return view
                .load_slot(address, vector::LENGTH_SLOT)
                .and_then(fixnum_value)
                .and_then(|len| Self::vector_words(tag, len))
                .unwrap_or(CONS_SIZE);
        }

        usize::try_from(header_data(header))
            .ok()
            .and_then(|data| data.checked_add(1))
            .map(align_words)
            .unwrap_or(CONS_SIZE)
    }
}
