//! Tagged Word Decoding
//!
//! Every heap word carries its interpretation in its low bits. All bit
//! layout knowledge lives here; scanners only see `LowTag` and `WideTag`.
//!
//! Word Layout (64-bit):
//! ```text
//! ┌─────────────────────────────────────────────────┬──────┐
//! │                  value / address                │ 3..0 │  <- lowtag
//! └─────────────────────────────────────────────────┴──────┘
//!
//! Header word:
//! ┌─────────────────────────────────────────┬──────────────┐
//! │        header data (63..8)              │ widetag 7..0 │
//! └─────────────────────────────────────────┴──────────────┘
//! ```
//!
//! Fixnums use a single tag bit: any word with bit 0 clear is a fixnum.

/// Heap word
pub type Word = u64;

/// Bytes per heap word
pub const WORD_BYTES: usize = 8;

/// Number of lowtag bits
pub const N_LOWTAG_BITS: u32 = 4;
/// Lowtag mask
pub const LOWTAG_MASK: Word = (1 << N_LOWTAG_BITS) - 1;

/// Number of widetag bits
pub const N_WIDETAG_BITS: u32 = 8;
/// Widetag mask
pub const WIDETAG_MASK: Word = (1 << N_WIDETAG_BITS) - 1;

/// Shift of the header data field
pub const HEADER_DATA_SHIFT: u32 = N_WIDETAG_BITS;

/// Number of fixnum tag bits
pub const N_FIXNUM_TAG_BITS: u32 = 1;
/// Fixnum tag mask
pub const FIXNUM_TAG_MASK: Word = (1 << N_FIXNUM_TAG_BITS) - 1;

/// Lowtag class of a heap word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LowTag {
    /// Immediate integer
    Fixnum,
    /// Header word, character, or other immediate
    OtherImmediate,
    /// Pointer to an instance
    InstancePointer,
    /// Pointer to a list cell
    ListPointer,
    /// Pointer to a function object
    FunPointer,
    /// Pointer to any other heap object
    OtherPointer,
}

impl LowTag {
    /// Decode the lowtag of a word
    ///
    /// Total over all 16 bit patterns.
    #[inline]
    pub fn of(word: Word) -> LowTag {
        if word & FIXNUM_TAG_MASK == 0 {
            return LowTag::Fixnum;
        }
        match word & LOWTAG_MASK {
            0x3 => LowTag::InstancePointer,
            0x7 => LowTag::ListPointer,
            0xB => LowTag::FunPointer,
            0xF => LowTag::OtherPointer,
            _ => LowTag::OtherImmediate,
        }
    }

    /// Pointer class, or None for the non-pointer classes
    pub fn pointer_tag(self) -> Option<PointerTag> {
        match self {
            LowTag::InstancePointer => Some(PointerTag::Instance),
            LowTag::ListPointer => Some(PointerTag::List),
            LowTag::FunPointer => Some(PointerTag::Fun),
            LowTag::OtherPointer => Some(PointerTag::Other),
            LowTag::Fixnum | LowTag::OtherImmediate => None,
        }
    }

    /// True for the four pointer classes
    pub fn is_pointer(self) -> bool {
        self.pointer_tag().is_some()
    }
}

/// The lowtags a pointer can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerTag {
    Instance,
    List,
    Fun,
    Other,
}

impl PointerTag {
    /// Low bits OR-ed into the address
    #[inline]
    pub fn bits(self) -> Word {
        match self {
            PointerTag::Instance => 0x3,
            PointerTag::List => 0x7,
            PointerTag::Fun => 0xB,
            PointerTag::Other => 0xF,
        }
    }
}

impl From<PointerTag> for LowTag {
    fn from(tag: PointerTag) -> LowTag {
        match tag {
            PointerTag::Instance => LowTag::InstancePointer,
            PointerTag::List => LowTag::ListPointer,
            PointerTag::Fun => LowTag::FunPointer,
            PointerTag::Other => LowTag::OtherPointer,
        }
    }
}

/// Object kind code stored in the low byte of a header
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WideTag {
    Bignum = 0x11,
    Ratio = 0x15,
    DoubleFloat = 0x1D,
    Complex = 0x21,
    Instance = 0x31,
    ValueCell = 0x45,
    Symbol = 0x49,
    Fdefn = 0x51,
    Filler = 0x59,
    Character = 0x61,
    UnboundMarker = 0x69,
    SimpleVector = 0x89,
    SimpleArrayU8 = 0x95,
    SimpleBaseString = 0xE1,
    SimpleCharacterString = 0xE5,
}

impl WideTag {
    /// All widetags, in code order
    pub const ALL: [WideTag; 15] = [
        WideTag::Bignum,
        WideTag::Ratio,
        WideTag::DoubleFloat,
        WideTag::Complex,
        WideTag::Instance,
        WideTag::ValueCell,
        WideTag::Symbol,
        WideTag::Fdefn,
        WideTag::Filler,
        WideTag::Character,
        WideTag::UnboundMarker,
        WideTag::SimpleVector,
        WideTag::SimpleArrayU8,
        WideTag::SimpleBaseString,
        WideTag::SimpleCharacterString,
    ];

    /// Decode a widetag code
    pub fn from_code(code: u8) -> Option<WideTag> {
        Self::ALL.iter().copied().find(|tag| tag.code() == code)
    }

    /// Raw code
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// True if this code starts an object rather than being an immediate
    pub fn is_header(self) -> bool {
        !matches!(self, WideTag::Character | WideTag::UnboundMarker)
    }

    /// True for objects whose word 1 is a fixnum element count
    pub fn is_vector(self) -> bool {
        matches!(
            self,
            WideTag::SimpleVector
                | WideTag::SimpleArrayU8
                | WideTag::SimpleBaseString
                | WideTag::SimpleCharacterString
        )
    }

    /// Build a header word with the given data field
    #[inline]
    pub fn header(self, data: u64) -> Word {
        (data << HEADER_DATA_SHIFT) | self.code() as Word
    }
}

/// Low byte of a word as a widetag, if it is one
#[inline]
pub fn widetag_of(word: Word) -> Option<WideTag> {
    WideTag::from_code((word & WIDETAG_MASK) as u8)
}

/// Lowtag class of a word
#[inline]
pub fn lowtag_of(word: Word) -> LowTag {
    LowTag::of(word)
}

/// True if the word is an object header
///
/// A low byte that happens to equal a header code is not enough; the lowtag
/// must also be an other-immediate, which every widetag code satisfies.
#[inline]
pub fn is_header(word: Word) -> bool {
    lowtag_of(word) == LowTag::OtherImmediate && widetag_of(word).is_some_and(WideTag::is_header)
}

/// Data field of a header word
#[inline]
pub fn header_data(word: Word) -> u64 {
    word >> HEADER_DATA_SHIFT
}

/// Encode an integer as a fixnum
#[inline]
pub fn make_fixnum(n: u64) -> Word {
    n << N_FIXNUM_TAG_BITS
}

/// Decode a fixnum
///
/// None if the word is not a fixnum.
#[inline]
pub fn fixnum_value(word: Word) -> Option<u64> {
    (lowtag_of(word) == LowTag::Fixnum).then_some(word >> N_FIXNUM_TAG_BITS)
}

/// Strip the lowtag from a pointer word
#[inline]
pub fn native_pointer(word: Word) -> usize {
    (word & !LOWTAG_MASK) as usize
}

/// Tag an object address as a pointer
///
/// `address` must be 16-byte aligned; its low bits are overwritten.
#[inline]
pub fn make_lispobj(address: usize, tag: PointerTag) -> Word {
    (address as Word & !LOWTAG_MASK) | tag.bits()
}
