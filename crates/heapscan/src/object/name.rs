//! Symbol Name Views
//!
//! A symbol's name is a string vector in one of two encodings: a base
//! string with one byte per character, or a character string with one
//! 32-bit code point per character. Both are read through [`CharSeq`] so
//! the comparison is written once.

use super::layout::{slot_address, vector};
use super::tag::{fixnum_value, lowtag_of, native_pointer, widetag_of, LowTag, WideTag, Word};
use crate::heap::RegionOracle;
use crate::memory::HeapView;
use serde::Serialize;

/// Storage encoding of a name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NameEncoding {
    /// 8 bits per character
    Narrow,
    /// 32 bits per character
    Wide,
}

impl NameEncoding {
    /// Encoding stored under a widetag
    pub fn from_widetag(tag: WideTag) -> Option<Self> {
        match tag {
            WideTag::SimpleBaseString => Some(NameEncoding::Narrow),
            WideTag::SimpleCharacterString => Some(NameEncoding::Wide),
            _ => None,
        }
    }

    /// Bytes per stored character
    pub fn char_bytes(self) -> usize {
        match self {
            NameEncoding::Narrow => 1,
            NameEncoding::Wide => 4,
        }
    }
}

/// Read-only character sequence
pub trait CharSeq {
    /// Declared length in characters
    fn length(&self) -> usize;

    /// Character `i` as a code point
    ///
    /// None when `i` is past the length or the storage cannot be read.
    fn char_at(&self, i: usize) -> Option<u32>;
}

/// Decoded name vector header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameRef {
    address: usize,
    encoding: NameEncoding,
    tagged_length: Word,
}

impl NameRef {
    /// Decode the string a name slot points at
    ///
    /// Returns None unless `name_word` is an other-pointer into managed
    /// memory whose header is a base or character string with a fixnum
    /// length.
    pub fn decode<R: RegionOracle + ?Sized>(view: &HeapView<'_, R>, name_word: Word) -> Option<Self> {
        if lowtag_of(name_word) != LowTag::OtherPointer {
            return None;
        }
        let address = native_pointer(name_word);
        let encoding = widetag_of(view.load(address)?).and_then(NameEncoding::from_widetag)?;
        let tagged_length = view.load_slot(address, vector::LENGTH_SLOT)?;
        fixnum_value(tagged_length)?;
        Some(Self {
            address,
            encoding,
            tagged_length,
        })
    }

    /// Address of the string header
    pub fn address(&self) -> usize {
        self.address
    }

    /// Storage encoding
    pub fn encoding(&self) -> NameEncoding {
        self.encoding
    }

    /// Length slot as stored (a fixnum)
    pub fn tagged_length(&self) -> Word {
        self.tagged_length
    }

    /// Length in characters
    pub fn length(&self) -> usize {
        fixnum_value(self.tagged_length).map_or(0, |n| n as usize)
    }

    /// Character view over the name's storage
    pub fn chars<'v, 'r, R: RegionOracle + ?Sized>(
        &self,
        view: &'v HeapView<'r, R>,
    ) -> NameChars<'v, 'r, R> {
        NameChars {
            view,
            name: *self,
        }
    }
}

/// Character view of a name in either encoding
pub struct NameChars<'v, 'r, R: RegionOracle + ?Sized> {
    view: &'v HeapView<'r, R>,
    name: NameRef,
}

impl<R: RegionOracle + ?Sized> CharSeq for NameChars<'_, '_, R> {
    fn length(&self) -> usize {
        self.name.length()
    }

    fn char_at(&self, i: usize) -> Option<u32> {
        if i >= self.length() {
            return None;
        }
        let data = slot_address(self.name.address, vector::DATA_SLOT)?;
        let addr = data.checked_add(i.checked_mul(self.name.encoding.char_bytes())?)?;
        match self.name.encoding {
            NameEncoding::Narrow => self.view.load_u8(addr).map(u32::from),
            NameEncoding::Wide => self.view.load_u32(addr),
        }
    }
}

impl CharSeq for [u8] {
    fn length(&self) -> usize {
        self.len()
    }

    fn char_at(&self, i: usize) -> Option<u32> {
        self.get(i).copied().map(u32::from)
    }
}

impl CharSeq for [u32] {
    fn length(&self) -> usize {
        self.len()
    }

    fn char_at(&self, i: usize) -> Option<u32> {
        self.get(i).copied()
    }
}

/// Compare a stored name against an ASCII target
///
/// The caller has already checked that the lengths agree. Characters are
/// compared in order; the first difference (or unreadable character) is a
/// mismatch. A NUL in `target` that the name also holds at that position
/// ends the comparison as a match, so `b"AB\0XY"` equals a name stored as
/// `"AB"` followed by NULs.
pub fn compare_ascii<S: CharSeq + ?Sized>(name: &S, target: &[u8]) -> bool {
    for (i, &byte) in target.iter().enumerate() {
        match name.char_at(i) {
            Some(ch) if ch == u32::from(byte) => {
                if byte == 0 {
                    return true;
                }
            },
            _ => return false,
        }
    }
    true
}
