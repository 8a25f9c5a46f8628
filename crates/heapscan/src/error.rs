//! Error Module - heapscan Error Types
//!
//! The scanners never fail: a word that is not the object being looked for
//! is skipped, and "not found" is an ordinary result. Errors only come from
//! the surfaces around them.
//!
//! # Error Categories
//!
//! ## Region Errors
//! - `MisalignedRegion` - Region bound not on a word boundary
//! - `EmptyRegion` - Region with `start >= end`
//! - `OverlappingRegion` - Region intersects one already registered
//!
//! ## Decoding Errors
//! - `Truncated` - Variable-length integer runs past the buffer
//! - `VarIntOverflow` - Variable-length integer does not fit 64 bits
//!
//! ## Configuration Errors
//! - `Configuration` - Invalid configuration

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for heapscan operations
///
/// # Examples
///
/// ```rust
/// use heapscan::error::ScanError;
///
/// fn describe(err: ScanError) -> String {
///     match err {
///         ScanError::Truncated { offset } => format!("short buffer at {}", offset),
///         other => other.to_string(),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum ScanError {
    /// Region bound is not word aligned
    ///
    /// **When returned:** `HeapRegion::new` with a start or end that is not a
    /// multiple of the word size
    #[error("Misaligned region bound: address {address:#x} is not aligned to {alignment} bytes")]
    MisalignedRegion { address: usize, alignment: usize },

    /// Region is empty or inverted
    #[error("Empty region: start {start:#x} must be below end {end:#x}")]
    EmptyRegion { start: usize, end: usize },

    /// Region overlaps an already registered one
    ///
    /// **Recovery strategy:** Remove the stale region first
    #[error("Region [{start:#x}, {end:#x}) overlaps registered region [{existing_start:#x}, {existing_end:#x})")]
    OverlappingRegion {
        start: usize,
        end: usize,
        existing_start: usize,
        existing_end: usize,
    },

    /// No region registered at the given start address
    #[error("No region starts at {start:#x}")]
    UnknownRegion { start: usize },

    /// Buffer ended in the middle of a variable-length integer
    ///
    /// **When returned:** The last byte read still had its continuation bit set
    #[error("Truncated variable-length integer starting at offset {offset}")]
    Truncated { offset: usize },

    /// Variable-length integer wider than 64 bits
    #[error("Variable-length integer at offset {offset} overflows 64 bits")]
    VarIntOverflow { offset: usize },

    /// Configuration error
    ///
    /// **Recovery strategy:** Use default configuration or fail fast
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Internal error - indicates a bug in heapscan
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScanError {
    /// Check if this error is recoverable
    ///
    /// A truncated buffer may be retried once more input arrives.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ScanError::Truncated { .. })
    }

    /// Check if this error indicates a bug in the code
    pub fn is_bug(&self) -> bool {
        matches!(self, ScanError::Internal(_))
    }
}

/// Result type alias for heapscan operations
pub type Result<T> = std::result::Result<T, ScanError>;
