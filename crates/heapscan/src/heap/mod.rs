//! Heap Module - Managed Address Ranges
//!
//! The scanners never own heap memory; they only ask which addresses are
//! safe to read.

pub mod region;

pub use region::{HeapRegion, RegionOracle, RegionSet, SharedRegionSet};
