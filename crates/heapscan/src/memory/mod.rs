//! Memory View - Region-Checked Reads of Heap Words
//!
//! Every read the scanners perform goes through [`HeapView::load`]. It is
//! the only place in the crate that dereferences a raw address, and it
//! does so only after the region oracle has vouched for that address.
//!
//! # Safety
//!
//! Building a view is `unsafe`: the caller promises that every address the
//! oracle reports as managed is readable for one word and is not written or
//! relocated for as long as the view is in use. In practice that means the
//! collector is stopped, or the regions are known never to move.
//!
//! # Example
//!
//! ```rust
//! use heapscan::heap::HeapRegion;
//! use heapscan::memory::HeapView;
//!
//! let words = vec![7u64, 9];
//! let region = HeapRegion::from_words(&words).unwrap();
//! let view = unsafe { HeapView::new(&region) };
//!
//! assert_eq!(view.load(region.start()), Some(7));
//! assert_eq!(view.load(region.end()), None);
//! ```

use crate::heap::RegionOracle;
use crate::object::layout::slot_address;
use crate::object::tag::{Word, WORD_BYTES};

/// Read-only view of managed heap memory
pub struct HeapView<'r, R: RegionOracle + ?Sized> {
    regions: &'r R,
}

impl<'r, R: RegionOracle + ?Sized> HeapView<'r, R> {
    /// Create a view over the memory `regions` vouches for
    ///
    /// # Safety
    ///
    /// - Every address for which `regions.is_managed_address` returns true
    ///   must be valid for an aligned 8-byte read
    /// - That memory must not be mutated or unmapped while the view is used
    pub unsafe fn new(regions: &'r R) -> Self {
        Self { regions }
    }

    /// The region oracle behind this view
    pub fn regions(&self) -> &'r R {
        self.regions
    }

    /// True if `addr` is managed memory
    #[inline]
    pub fn is_managed(&self, addr: usize) -> bool {
        self.regions.is_managed_address(addr)
    }

    /// Read the word at `addr`
    ///
    /// None if the address is misaligned or not managed.
    #[inline]
    pub fn load(&self, addr: usize) -> Option<Word> {
        if addr % WORD_BYTES != 0 || !self.is_managed(addr) {
            return None;
        }
        // SAFETY: aligned, and the oracle vouched for it under the contract
        // accepted in `HeapView::new`.
        Some(unsafe { std::ptr::read(addr as *const Word) })
    }

    /// Read slot `index` of the object at `base`
    #[inline]
    pub fn load_slot(&self, base: usize, index: usize) -> Option<Word> {
        self.load(slot_address(base, index)?)
    }

    /// Read the byte at `addr`
    ///
    /// Bytes are taken in memory order, so this matches a direct byte read
    /// on either endianness.
    pub fn load_u8(&self, addr: usize) -> Option<u8> {
        let bytes = self.load(addr - addr % WORD_BYTES)?.to_ne_bytes();
        Some(bytes[addr % WORD_BYTES])
    }

    /// Read the native-endian 32-bit value at `addr`
    ///
    /// None unless `addr` is 4-byte aligned.
    pub fn load_u32(&self, addr: usize) -> Option<u32> {
        if addr % 4 != 0 {
            return None;
        }
        let bytes = self.load(addr - addr % WORD_BYTES)?.to_ne_bytes();
        let off = addr % WORD_BYTES;
        let mut half = [0u8; 4];
        half.copy_from_slice(&bytes[off..off + 4]);
        Some(u32::from_ne_bytes(half))
    }
}

impl<R: RegionOracle + ?Sized> Clone for HeapView<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: RegionOracle + ?Sized> Copy for HeapView<'_, R> {}

impl<R: RegionOracle + ?Sized> std::fmt::Debug for HeapView<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapView").finish_non_exhaustive()
    }
}
