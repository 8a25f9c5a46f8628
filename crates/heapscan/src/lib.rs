//! # heapscan - Raw Search Primitives for a Tagged Object Heap
//!
//! heapscan finds things in a tagged, garbage-collected heap by reading it
//! directly: the next cell of a given type in a table of 2-word cells, or a
//! symbol with a given name anywhere in a run of objects. It is meant for
//! moments when no richer index exists yet, such as early startup, core
//! image fix-up, or a debugger poking at a paused process.
//!
//! ## Overview
//!
//! - **Tagged words**: lowtags and widetags decode into closed enums in one
//!   place ([`object::tag`])
//! - **Checked reads**: every word is read through [`memory::HeapView`],
//!   which consults a [`heap::RegionOracle`] first
//! - **Two scanners**: [`scan::find_next_of_type`] and
//!   [`scan::find_symbol_by_name`], both stateless and read-only
//! - **Two name encodings**: narrow (8-bit) and wide (32-bit) names are
//!   compared through one [`object::CharSeq`] comparator
//!
//! ## Quick Start
//!
//! ```rust
//! use heapscan::heap::RegionSet;
//! use heapscan::memory::HeapView;
//! use heapscan::scan::ScanContext;
//! use heapscan::ScanConfig;
//!
//! fn lookup(regions: &RegionSet, start: usize, end: usize) -> Option<usize> {
//!     // SAFETY: the regions are paused and readable
//!     let view = unsafe { HeapView::new(regions) };
//!     let ctx = ScanContext::new(view, ScanConfig::default()).ok()?;
//!     ctx.find_symbol_by_name(b"NIL", start, end).map(|s| s.address())
//! }
//! # let _ = lookup;
//! ```
//!
//! ## Safety
//!
//! heapscan never allocates, moves, or writes heap objects. The one
//! `unsafe` read lives in [`memory::HeapView::load`]; constructing a view
//! is where the caller promises that:
//!
//! 1. **Managed means readable**: every address the oracle accepts can be
//!    read as a word
//! 2. **Nothing moves**: the collector does not relocate or mutate the
//!    scanned memory while a scan runs
//!
//! ## Modules
//!
//! - [`config`]: Scan configuration and validation
//! - [`error`]: Error types
//! - [`heap`]: Region membership
//! - [`logging`]: Scan event logging
//! - [`memory`]: Region-checked memory view
//! - [`object`]: Tag decoding, layouts, sizing, name views
//! - [`scan`]: The type scanner and symbol search
//! - [`varint`]: Variable-length integer reader

pub mod config;
pub mod error;

pub mod heap;
pub mod memory;
pub mod object;

pub mod scan;

pub mod logging;
pub mod varint;

pub use config::ScanConfig;
pub use error::{Result, ScanError};
pub use heap::{HeapRegion, RegionOracle, RegionSet};
pub use memory::HeapView;
pub use object::{LowTag, PointerTag, WideTag, Word};
pub use scan::{find_next_of_type, find_symbol_by_name, Budget, ScanContext, SymbolRef};
pub use varint::{read_var_integer, VarIntReader};

/// heapscan version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
