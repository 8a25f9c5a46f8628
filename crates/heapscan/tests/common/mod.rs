//! Test Utilities for heapscan Integration Tests
//!
//! `HeapFixture` lays real objects out in word buffers and registers them
//! as managed regions, so scans run against genuine addresses. Objects
//! live in one arena and symbol names in another; walking the object arena
//! therefore visits exactly the objects a test created.

#![allow(dead_code)]

use heapscan::heap::{HeapRegion, RegionOracle, RegionSet};
use heapscan::object::layout::{align_words, symbol, CONS_SIZE};
use heapscan::object::tag::{make_fixnum, make_lispobj, PointerTag, WideTag, Word, WORD_BYTES};
use std::cell::RefCell;

/// Default arena size in words
pub const DEFAULT_ARENA_WORDS: usize = 512;

const GRANULE_BYTES: usize = 2 * WORD_BYTES;

/// ============================================================================
/// ARENA
/// ============================================================================

/// Fixed-capacity word buffer with a 16-byte aligned base
///
/// Never reallocates, so addresses handed out stay valid.
pub struct Arena {
    buf: Vec<Word>,
    offset: usize,
    capacity: usize,
    top: usize,
}

impl Arena {
    pub fn with_capacity(capacity: usize) -> Self {
        let buf = vec![0; capacity + 1];
        let offset = usize::from(buf.as_ptr() as usize % GRANULE_BYTES != 0);
        Self {
            buf,
            offset,
            capacity,
            top: 0,
        }
    }

    /// Address of word `index`
    pub fn addr(&self, index: usize) -> usize {
        self.buf[self.offset..].as_ptr() as usize + index * WORD_BYTES
    }

    /// First address
    pub fn start(&self) -> usize {
        self.addr(0)
    }

    /// One past the last allocated word
    pub fn end(&self) -> usize {
        self.addr(self.top)
    }

    /// Words allocated so far
    pub fn used(&self) -> usize {
        self.top
    }

    /// Copy `words` in, padded to the 2-word granule; returns their address
    pub fn push(&mut self, words: &[Word]) -> usize {
        let size = align_words(words.len().max(1));
        assert!(
            self.top + size <= self.capacity,
            "arena overflow: {} + {} > {}",
            self.top,
            size,
            self.capacity
        );
        let at = self.offset + self.top;
        self.buf[at..at + words.len()].copy_from_slice(words);
        let address = self.addr(self.top);
        self.top += size;
        address
    }

    /// Overwrite word `index` (already allocated)
    pub fn poke(&mut self, index: usize, word: Word) {
        assert!(index < self.capacity);
        self.buf[self.offset + index] = word;
    }

    /// Write past `top` without allocating
    ///
    /// Used to plant readable but unmanaged data.
    pub fn plant_beyond_top(&mut self, words: &[Word]) -> usize {
        let at = self.offset + self.top;
        assert!(self.top + words.len() <= self.capacity);
        self.buf[at..at + words.len()].copy_from_slice(words);
        self.addr(self.top)
    }

    /// Region covering the allocated words
    pub fn region(&self) -> HeapRegion {
        HeapRegion::new(self.start(), self.end()).expect("arena has allocations")
    }
}

/// ============================================================================
/// OBJECT ENCODING
/// ============================================================================

/// Words of a base string holding `text`
pub fn base_string_words(text: &[u8]) -> Vec<Word> {
    let mut words = vec![WideTag::SimpleBaseString.header(0), make_fixnum(text.len() as u64)];
    // +1 for the trailing NUL
    let data_words = (text.len() + WORD_BYTES) / WORD_BYTES;
    for i in 0..data_words {
        let mut bytes = [0u8; WORD_BYTES];
        for (j, byte) in bytes.iter_mut().enumerate() {
            *byte = text.get(i * WORD_BYTES + j).copied().unwrap_or(0);
        }
        words.push(u64::from_ne_bytes(bytes));
    }
    words
}

/// Words of a character string holding `chars`
pub fn character_string_words(chars: &[u32]) -> Vec<Word> {
    let mut words = vec![
        WideTag::SimpleCharacterString.header(0),
        make_fixnum(chars.len() as u64),
    ];
    let data_words = ((chars.len() + 1) * 4 + WORD_BYTES - 1) / WORD_BYTES;
    for i in 0..data_words {
        // native order, as the runtime stores a 32-bit character array
        let mut bytes = [0u8; WORD_BYTES];
        bytes[..4].copy_from_slice(&chars.get(2 * i).copied().unwrap_or(0).to_ne_bytes());
        bytes[4..].copy_from_slice(&chars.get(2 * i + 1).copied().unwrap_or(0).to_ne_bytes());
        words.push(u64::from_ne_bytes(bytes));
    }
    words
}

/// Words of a symbol whose name slot holds `name_word`
pub fn symbol_words(name_word: Word) -> Vec<Word> {
    let mut words = vec![0; symbol::SIZE];
    words[0] = WideTag::Symbol.header(symbol::HEADER_DATA);
    words[symbol::HASH_SLOT] = make_fixnum(0x5eed);
    words[symbol::VALUE_SLOT] = WideTag::UnboundMarker.header(0);
    words[symbol::INFO_SLOT] = make_fixnum(0);
    words[symbol::NAME_SLOT] = name_word;
    words[symbol::PACKAGE_SLOT] = make_fixnum(1);
    words
}

/// ============================================================================
/// HEAP FIXTURE
/// ============================================================================

/// Synthetic heap: an object arena plus a separate name arena
pub struct HeapFixture {
    pub objects: Arena,
    pub names: Arena,
}

impl HeapFixture {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ARENA_WORDS)
    }

    pub fn with_capacity(words: usize) -> Self {
        Self {
            objects: Arena::with_capacity(words),
            names: Arena::with_capacity(words),
        }
    }

    /// Add a narrow name string; returns its tagged pointer
    pub fn narrow_name(&mut self, text: &[u8]) -> Word {
        make_lispobj(self.names.push(&base_string_words(text)), PointerTag::Other)
    }

    /// Add a wide name string; returns its tagged pointer
    pub fn wide_name(&mut self, chars: &[u32]) -> Word {
        make_lispobj(self.names.push(&character_string_words(chars)), PointerTag::Other)
    }

    /// Symbol with a narrow name
    pub fn symbol(&mut self, name: &str) -> usize {
        let name_word = self.narrow_name(name.as_bytes());
        self.symbol_with_name_word(name_word)
    }

    /// Symbol with a wide name
    pub fn wide_symbol(&mut self, name: &str) -> usize {
        let chars: Vec<u32> = name.chars().map(|c| c as u32).collect();
        let name_word = self.wide_name(&chars);
        self.symbol_with_name_word(name_word)
    }

    /// Symbol with an arbitrary name slot
    pub fn symbol_with_name_word(&mut self, name_word: Word) -> usize {
        self.objects.push(&symbol_words(name_word))
    }

    /// Simple vector of `items`
    pub fn vector(&mut self, items: &[Word]) -> usize {
        let mut words = vec![WideTag::SimpleVector.header(0), make_fixnum(items.len() as u64)];
        words.extend_from_slice(items);
        self.objects.push(&words)
    }

    /// Base string placed among the objects
    pub fn inline_string(&mut self, text: &[u8]) -> usize {
        self.objects.push(&base_string_words(text))
    }

    /// List cell
    pub fn cons(&mut self, car: Word, cdr: Word) -> usize {
        let address = self.objects.push(&[car, cdr]);
        debug_assert_eq!(CONS_SIZE, 2);
        address
    }

    /// Filler object spanning `words` words (at least 2)
    pub fn filler(&mut self, words: usize) -> usize {
        let mut body = vec![0; words.max(2)];
        body[0] = WideTag::Filler.header(body.len() as u64 - 1);
        self.objects.push(&body)
    }

    /// Two-word cell whose first word carries `tag`
    pub fn cell(&mut self, tag: WideTag) -> usize {
        self.objects.push(&[tag.header(1), make_fixnum(0)])
    }

    /// Two-word cell of plain fixnums
    pub fn blank_cell(&mut self) -> usize {
        self.objects.push(&[make_fixnum(0), make_fixnum(0)])
    }

    /// Start of the object arena
    pub fn start(&self) -> usize {
        self.objects.start()
    }

    /// End of the allocated objects
    pub fn end(&self) -> usize {
        self.objects.end()
    }

    /// Managed regions: both arenas (names only if any were added)
    pub fn regions(&self) -> RegionSet {
        let mut set = RegionSet::new();
        set.insert(self.objects.region()).expect("object arena region");
        if self.names.used() > 0 {
            set.insert(self.names.region()).expect("name arena region");
        }
        set
    }
}

impl Default for HeapFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// ============================================================================
/// RECORDING ORACLE
/// ============================================================================

/// Region oracle that remembers every query
pub struct RecordingOracle {
    inner: RegionSet,
    queries: RefCell<Vec<(usize, bool)>>,
}

impl RecordingOracle {
    pub fn new(inner: RegionSet) -> Self {
        Self {
            inner,
            queries: RefCell::new(Vec::new()),
        }
    }

    /// Addresses the oracle turned down
    pub fn rejected(&self) -> Vec<usize> {
        self.queries
            .borrow()
            .iter()
            .filter(|(_, managed)| !managed)
            .map(|(addr, _)| *addr)
            .collect()
    }

    /// Total queries
    pub fn query_count(&self) -> usize {
        self.queries.borrow().len()
    }
}

impl RegionOracle for RecordingOracle {
    fn is_managed_address(&self, addr: usize) -> bool {
        let managed = self.inner.is_managed_address(addr);
        self.queries.borrow_mut().push((addr, managed));
        managed
    }
}

/// Wide code points of an ASCII string
pub fn wide(text: &str) -> Vec<u32> {
    text.chars().map(|c| c as u32).collect()
}
