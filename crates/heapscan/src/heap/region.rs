//! Region Membership - Which Addresses Hold Objects
//!
//! A region is a contiguous, word-aligned address range that holds valid,
//! scannable objects. The region set is the only authority the scanners
//! consult before reading a word.
//!
//! # Synchronization
//!
//! `RegionSet` is plain data. `SharedRegionSet` wraps it in a
//! `parking_lot::RwLock` so an allocator can publish or retire regions
//! while scanners hold a reference. Membership alone says nothing about
//! object motion: callers still scan only while the collector is stopped
//! or against regions that never move.

use crate::error::{Result, ScanError};
use crate::object::tag::{Word, WORD_BYTES};
use parking_lot::RwLock;

/// Heap-region membership predicate
///
/// Implementations must answer for single byte addresses. A `true`
/// answer promises that the word starting at that address is readable.
pub trait RegionOracle {
    /// True if `addr` lies inside managed memory
    fn is_managed_address(&self, addr: usize) -> bool;
}

impl<F> RegionOracle for F
where
    F: Fn(usize) -> bool,
{
    fn is_managed_address(&self, addr: usize) -> bool {
        self(addr)
    }
}

/// A half-open managed address range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapRegion {
    start: usize,
    end: usize,
}

impl HeapRegion {
    /// Create a region
    ///
    /// Both bounds must be word aligned and `start < end`.
    pub fn new(start: usize, end: usize) -> Result<Self> {
        for address in [start, end] {
            if address % WORD_BYTES != 0 {
                return Err(ScanError::MisalignedRegion {
                    address,
                    alignment: WORD_BYTES,
                });
            }
        }
        if start >= end {
            return Err(ScanError::EmptyRegion { start, end });
        }
        Ok(Self { start, end })
    }

    /// Region covering a word buffer
    ///
    /// # Examples
    ///
    /// ```rust
    /// use heapscan::heap::HeapRegion;
    ///
    /// let words = vec![0u64; 4];
    /// let region = HeapRegion::from_words(&words).unwrap();
    /// assert_eq!(region.len_words(), 4);
    /// ```
    pub fn from_words(words: &[Word]) -> Result<Self> {
        let start = words.as_ptr() as usize;
        Self::new(start, start + words.len() * WORD_BYTES)
    }

    /// Get start address
    pub fn start(&self) -> usize {
        self.start
    }

    /// Get end address (exclusive)
    pub fn end(&self) -> usize {
        self.end
    }

    /// Check if an address is within this region's bounds
    ///
    /// # Returns
    /// `true` if address is within [start, end), `false` otherwise
    #[inline]
    pub fn contains(&self, addr: usize) -> bool {
        addr >= self.start && addr < self.end
    }

    /// Region length in words
    pub fn len_words(&self) -> usize {
        (self.end - self.start) / WORD_BYTES
    }

    fn overlaps(&self, other: &HeapRegion) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl RegionOracle for HeapRegion {
    fn is_managed_address(&self, addr: usize) -> bool {
        self.contains(addr)
    }
}

/// Sorted set of non-overlapping regions
#[derive(Debug, Clone, Default)]
pub struct RegionSet {
    regions: Vec<HeapRegion>,
}

impl RegionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a region
    ///
    /// Fails if it overlaps a registered region.
    pub fn insert(&mut self, region: HeapRegion) -> Result<()> {
        let idx = self
            .regions
            .partition_point(|existing| existing.start < region.start);

        let neighbours = [idx.checked_sub(1), Some(idx)];
        for existing in neighbours.into_iter().flatten().filter_map(|i| self.regions.get(i)) {
            if existing.overlaps(&region) {
                return Err(ScanError::OverlappingRegion {
                    start: region.start,
                    end: region.end,
                    existing_start: existing.start,
                    existing_end: existing.end,
                });
            }
        }

        self.regions.insert(idx, region);
        Ok(())
    }

    /// Retire the region starting at `start`
    pub fn remove(&mut self, start: usize) -> Result<HeapRegion> {
        match self.regions.binary_search_by_key(&start, |r| r.start) {
            Ok(idx) => Ok(self.regions.remove(idx)),
            Err(_) => Err(ScanError::UnknownRegion { start }),
        }
    }

    /// Region containing `addr`
    pub fn region_for(&self, addr: usize) -> Option<&HeapRegion> {
        let idx = self.regions.partition_point(|r| r.start <= addr);
        let candidate = self.regions.get(idx.checked_sub(1)?)?;
        candidate.contains(addr).then_some(candidate)
    }

    /// Number of registered regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True if no region is registered
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterate regions in address order
    pub fn iter(&self) -> impl Iterator<Item = &HeapRegion> {
        self.regions.iter()
    }
}

impl RegionOracle for RegionSet {
    fn is_managed_address(&self, addr: usize) -> bool {
        self.region_for(addr).is_some()
    }
}

impl FromIterator<HeapRegion> for RegionSet {
    /// Collect regions, dropping any that overlap an earlier one
    fn from_iter<I: IntoIterator<Item = HeapRegion>>(iter: I) -> Self {
        let mut set = RegionSet::new();
        for region in iter {
            if let Err(e) = set.insert(region) {
                log::warn!("Dropping region while collecting: {}", e);
            }
        }
        set
    }
}

/// Region set shared between an allocator and scanners
#[derive(Debug, Default)]
pub struct SharedRegionSet {
    inner: RwLock<RegionSet>,
}

impl SharedRegionSet {
    /// Create an empty shared set
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a region
    pub fn publish(&self, region: HeapRegion) -> Result<()> {
        self.inner.write().insert(region)
    }

    /// Retire the region starting at `start`
    pub fn retire(&self, start: usize) -> Result<HeapRegion> {
        self.inner.write().remove(start)
    }

    /// Copy of the current set
    pub fn snapshot(&self) -> RegionSet {
        self.inner.read().clone()
    }
}

impl RegionOracle for SharedRegionSet {
    fn is_managed_address(&self, addr: usize) -> bool {
        self.inner.read().is_managed_address(addr)
    }
}
