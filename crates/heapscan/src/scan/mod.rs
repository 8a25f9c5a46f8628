//! Scan Module - Heap Search Primitives
//!
//! Two read-only traversals over managed memory:
//!
//! 1. **Type scan** ([`find_next_of_type`]) - steps through a table of
//!    2-word cells until one carries a requested widetag, optionally under
//!    a word budget
//! 2. **Symbol search** ([`find_symbol_by_name`]) - walks objects one by
//!    one, sizing each from its header, until a symbol's name equals a
//!    target string
//!
//! Both read memory only through the [`HeapView`] held by a
//! [`ScanContext`], so the region check is applied to every word they
//! touch. Neither reports errors: anything that is not the thing being
//! looked for is skipped.
//!
//! # Concurrency
//!
//! Scans take no locks. The caller must keep the collector from moving or
//! mutating the scanned memory for the duration of a scan.

pub mod symbol;
pub mod type_scan;

pub use symbol::{find_symbol_by_name, SymbolRef};
pub use type_scan::{find_next_of_type, Budget, TypeCells, CELL_WORDS};

use crate::config::ScanConfig;
use crate::error::Result;
use crate::heap::{HeapRegion, RegionOracle};
use crate::logging::{ScanEvent, ScanLogger};
use crate::memory::HeapView;
use crate::object::{LayoutSizeOracle, ObjectSizeOracle, WideTag};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Scan counters
///
/// Relaxed atomics; statistics only.
#[derive(Debug, Default)]
pub struct ScanStats {
    cells_examined: AtomicU64,
    objects_visited: AtomicU64,
    symbols_examined: AtomicU64,
    names_compared: AtomicU64,
    length_rejections: AtomicU64,
    candidates_skipped: AtomicU64,
}

/// Point-in-time copy of [`ScanStats`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanStatsSnapshot {
    /// Cells read by type scans
    pub cells_examined: u64,
    /// Object headers read by symbol searches
    pub objects_visited: u64,
    /// Objects whose header said symbol
    pub symbols_examined: u64,
    /// Name comparator invocations
    pub names_compared: u64,
    /// Symbols rejected on name length alone
    pub length_rejections: u64,
    /// Candidates rejected for any reason
    pub candidates_skipped: u64,
}

impl ScanStats {
    /// Copy current values
    pub fn snapshot(&self) -> ScanStatsSnapshot {
        ScanStatsSnapshot {
            cells_examined: self.cells_examined.load(Ordering::Relaxed),
            objects_visited: self.objects_visited.load(Ordering::Relaxed),
            symbols_examined: self.symbols_examined.load(Ordering::Relaxed),
            names_compared: self.names_compared.load(Ordering::Relaxed),
            length_rejections: self.length_rejections.load(Ordering::Relaxed),
            candidates_skipped: self.candidates_skipped.load(Ordering::Relaxed),
        }
    }

    /// Zero all counters
    pub fn reset(&self) {
        for counter in [
            &self.cells_examined,
            &self.objects_visited,
            &self.symbols_examined,
            &self.names_compared,
            &self.length_rejections,
            &self.candidates_skipped,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// Everything a scan needs: memory, sizing, settings, counters
///
/// Construction validates the [`ScanConfig`]. When `verbose` is set, scan
/// events go to a [`ScanLogger`] built from `config.logger` and owned by the
/// context; read them back with [`ScanContext::events`].
///
/// # Examples
///
/// ```rust
/// use heapscan::heap::HeapRegion;
/// use heapscan::memory::HeapView;
/// use heapscan::scan::{Budget, ScanContext};
/// use heapscan::{ScanConfig, WideTag};
///
/// let cells = vec![0u64, 0, WideTag::Fdefn.header(1), 0];
/// let region = HeapRegion::from_words(&cells).unwrap();
/// let ctx = ScanContext::new(unsafe { HeapView::new(&region) }, ScanConfig::default()).unwrap();
///
/// let mut cursor = region.start();
/// assert!(ctx.find_next_of_type(WideTag::Fdefn, &mut cursor, &mut Budget::Unbounded));
/// assert_eq!(cursor, region.start() + 16);
/// ```
pub struct ScanContext<'r, R: RegionOracle + ?Sized, S = LayoutSizeOracle> {
    view: HeapView<'r, R>,
    sizes: S,
    config: ScanConfig,
    stats: ScanStats,
    logger: ScanLogger,
}

impl<'r, R: RegionOracle + ?Sized> ScanContext<'r, R, LayoutSizeOracle> {
    /// Context using the built-in object layouts
    ///
    /// # Errors
    /// `ScanError::Configuration` if `config` fails validation
    pub fn new(view: HeapView<'r, R>, config: ScanConfig) -> Result<Self> {
        Self::with_size_oracle(view, LayoutSizeOracle, config)
    }
}

impl<'r, R: RegionOracle + ?Sized, S: ObjectSizeOracle> ScanContext<'r, R, S> {
    /// Context with a caller-supplied size oracle
    ///
    /// # Errors
    /// `ScanError::Configuration` if `config` fails validation
    pub fn with_size_oracle(view: HeapView<'r, R>, sizes: S, config: ScanConfig) -> Result<Self> {
        config.validate()?;

        let logger = ScanLogger::new(config.logger.clone());
        Ok(Self {
            view,
            sizes,
            config,
            stats: ScanStats::default(),
            logger,
        })
    }

    /// Checked memory view
    pub fn view(&self) -> &HeapView<'r, R> {
        &self.view
    }

    /// Size oracle
    pub fn sizes(&self) -> &S {
        &self.sizes
    }

    /// Scan settings
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Current counters
    pub fn stats(&self) -> ScanStatsSnapshot {
        self.stats.snapshot()
    }

    /// Zero the counters
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Event logger fed by verbose scans
    pub fn logger(&self) -> &ScanLogger {
        &self.logger
    }

    /// Events recorded so far (empty unless `verbose`)
    pub fn events(&self) -> Vec<ScanEvent> {
        self.logger
            .get_events()
            .into_iter()
            .map(|(_, event)| event)
            .collect()
    }

    /// See [`find_next_of_type`]
    pub fn find_next_of_type(&self, tag: WideTag, cursor: &mut usize, budget: &mut Budget) -> bool {
        type_scan::find_next_of_type(self, tag, cursor, budget)
    }

    /// Every cell from `start` carrying `tag`, within `budget`
    pub fn cells_of_type(&self, tag: WideTag, start: usize, budget: Budget) -> TypeCells<'_, 'r, R, S> {
        TypeCells::new(self, tag, start, budget)
    }

    /// See [`find_symbol_by_name`]
    pub fn find_symbol_by_name(&self, name: &[u8], start: usize, end: usize) -> Option<SymbolRef> {
        symbol::find_symbol_by_name(self, name, start, end)
    }

    /// Search a whole region for a symbol
    pub fn find_symbol_in(&self, name: &[u8], region: &HeapRegion) -> Option<SymbolRef> {
        self.find_symbol_by_name(name, region.start(), region.end())
    }

    #[inline]
    fn bump(&self, counter: fn(&ScanStats) -> &AtomicU64) {
        if self.config.stats_enabled {
            counter(&self.stats).fetch_add(1, Ordering::Relaxed);
        }
    }

    fn emit(&self, event: ScanEvent) {
        if self.config.verbose {
            self.logger.log(event);
        }
    }

    fn skip(&self, address: usize, reason: &'static str) {
        self.bump(|s| &s.candidates_skipped);
        log::trace!("skip {:#x}: {}", address, reason);
        if self.config.trace_skips {
            self.emit(ScanEvent::CandidateSkipped { address, reason });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use crate::testing::AlignedWords;

    #[test]
    fn test_stats_disabled_stay_zero() {
        let heap = AlignedWords::new(&[0, 0, WideTag::Fdefn.header(1), 0]);
        let region = heap.region();
        let config = ScanConfig {
            stats_enabled: false,
            ..Default::default()
        };
        let ctx = ScanContext::new(unsafe { HeapView::new(&region) }, config).unwrap();

        let mut cursor = heap.addr(0);
        assert!(ctx.find_next_of_type(WideTag::Fdefn, &mut cursor, &mut Budget::Unbounded));
        assert_eq!(ctx.stats(), ScanStatsSnapshot::default());
    }

    #[test]
    fn test_reset_stats() {
        let heap = AlignedWords::new(&[0, 0, WideTag::Fdefn.header(1), 0]);
        let region = heap.region();
        let ctx = ScanContext::new(unsafe { HeapView::new(&region) }, ScanConfig::default()).unwrap();

        let mut cursor = heap.addr(0);
        ctx.find_next_of_type(WideTag::Fdefn, &mut cursor, &mut Budget::Unbounded);
        assert_eq!(ctx.stats().cells_examined, 2);

        ctx.reset_stats();
        assert_eq!(ctx.stats().cells_examined, 0);
    }

    fn unnamed_symbol() -> AlignedWords {
        let mut words = vec![0; crate::object::layout::symbol::SIZE];
        words[0] = WideTag::Symbol.header(crate::object::layout::symbol::HEADER_DATA);
        AlignedWords::new(&words)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let heap = unnamed_symbol();
        let region = heap.region();
        let config = ScanConfig {
            trace_skips: true,
            ..Default::default()
        };
        let result = ScanContext::new(unsafe { HeapView::new(&region) }, config);
        assert!(matches!(result, Err(crate::error::ScanError::Configuration(_))));
    }

    #[test]
    fn test_trace_skips_reach_context_logger() {
        let heap = unnamed_symbol();
        let region = heap.region();
        let mut config = ScanConfig {
            verbose: true,
            trace_skips: true,
            ..Default::default()
        };
        config.logger.level = LogLevel::Trace;
        let ctx = ScanContext::new(unsafe { HeapView::new(&region) }, config).unwrap();

        assert!(ctx.find_symbol_in(b"X", &region).is_none());
        assert_eq!(ctx.stats().candidates_skipped, 1);

        let events = ctx.events();
        let skips = events
            .iter()
            .filter(|e| matches!(e, ScanEvent::CandidateSkipped { .. }))
            .count();
        assert_eq!(skips, 1);
        assert!(events.iter().any(|e| matches!(e, ScanEvent::ScanStart { .. })));
    }

    #[test]
    fn test_logger_level_filters_events() {
        let heap = unnamed_symbol();
        let region = heap.region();
        let config = ScanConfig {
            verbose: true,
            ..Default::default()
        };
        let ctx = ScanContext::new(unsafe { HeapView::new(&region) }, config).unwrap();

        ctx.find_symbol_in(b"X", &region);
        // Info level keeps the result, drops the start event
        let events = ctx.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ScanEvent::ScanEnd { found: None, .. }));
    }

    #[test]
    fn test_quiet_context_records_nothing() {
        let heap = unnamed_symbol();
        let region = heap.region();
        let ctx = ScanContext::new(unsafe { HeapView::new(&region) }, ScanConfig::default()).unwrap();

        ctx.find_symbol_in(b"X", &region);
        assert!(ctx.events().is_empty());
        assert_eq!(ctx.logger().event_count(), 0);
    }
}
