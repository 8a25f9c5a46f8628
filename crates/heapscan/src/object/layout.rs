//! Object Layouts
//!
//! Symbol Layout (6 words):
//! ┌─────────────────────────────────────────┐
//! │ Header (widetag Symbol, data = 5)       │  word 0
//! ├─────────────────────────────────────────┤
//! │ Hash                                    │  word 1
//! │ Value                                   │  word 2
//! │ Info                                    │  word 3
//! │ Name  (OtherPointer -> string vector)   │  word 4
//! │ Package                                 │  word 5
//! └─────────────────────────────────────────┘
//!
//! Vector Layout:
//! ┌─────────────────────────────────────────┐
//! │ Header (widetag = element kind)         │  word 0
//! ├─────────────────────────────────────────┤
//! │ Length (fixnum, element count)          │  word 1
//! ├─────────────────────────────────────────┤
//! │ Data ...                                │  word 2..
//! └─────────────────────────────────────────┘

use super::tag::WORD_BYTES;

/// Symbol slot indices
pub mod symbol {
    pub const HASH_SLOT: usize = 1;
    pub const VALUE_SLOT: usize = 2;
    pub const INFO_SLOT: usize = 3;
    pub const NAME_SLOT: usize = 4;
    pub const PACKAGE_SLOT: usize = 5;

    /// Header data of a symbol (payload words)
    pub const HEADER_DATA: u64 = 5;
    /// Symbol size in words
    pub const SIZE: usize = 6;
}

/// Vector slot indices
pub mod vector {
    pub const LENGTH_SLOT: usize = 1;
    pub const DATA_SLOT: usize = 2;
}

/// Size of a list cell in words
pub const CONS_SIZE: usize = 2;

/// Objects are allocated in units of this many words
pub const OBJECT_GRANULE_WORDS: usize = 2;

/// Byte address of slot `index` of the object at `base`
#[inline]
pub fn slot_address(base: usize, index: usize) -> Option<usize> {
    index
        .checked_mul(WORD_BYTES)
        .and_then(|offset| base.checked_add(offset))
}

/// Round a word count up to the allocation granule
#[inline]
pub fn align_words(words: usize) -> usize {
    (words + OBJECT_GRANULE_WORDS - 1) & !(OBJECT_GRANULE_WORDS - 1)
}
