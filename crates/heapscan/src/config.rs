//! Configuration Module - Scan Parameters
//!
//! Manages the knobs that change how the scanners behave and report.

use crate::logging::{LogLevel, ScanLoggerConfig};

/// Main configuration for the heap scanners
///
/// # Examples
///
/// ```rust
/// use heapscan::ScanConfig;
///
/// // Use default configuration
/// let config = ScanConfig::default();
///
/// // Narrow-only name matching with event logging
/// let config = ScanConfig {
///     unicode: false,
///     verbose: true,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Match symbol names stored as 32-bit character strings
    ///
    /// When false only 8-bit base strings are compared.
    /// Default: on when the `unicode` feature is enabled
    pub unicode: bool,

    /// Emit scan events to the scan context's logger
    ///
    /// Default: false
    pub verbose: bool,

    /// Collect scan counters
    ///
    /// Default: true
    pub stats_enabled: bool,

    /// Emit one event per skipped candidate (needs `verbose`)
    ///
    /// Very noisy on large regions.
    /// Default: false
    pub trace_skips: bool,

    /// Settings for each scan context's logger and for `install_logger`
    pub logger: ScanLoggerConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            unicode: cfg!(feature = "unicode"),
            verbose: false,
            stats_enabled: true,
            trace_skips: false,
            logger: ScanLoggerConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Validate configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use heapscan::ScanConfig;
    ///
    /// let mut config = ScanConfig::default();
    /// config.logger.file = Some(String::new()); // Invalid!
    ///
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.logger.file {
            if path.trim().is_empty() {
                return Err(ConfigError::InvalidLogFile(
                    "log file path must not be empty".to_string(),
                ));
            }
        }

        if self.trace_skips && !self.verbose {
            return Err(ConfigError::InvalidTracing(
                "trace_skips requires verbose".to_string(),
            ));
        }

        if self.trace_skips && self.logger.level < LogLevel::Trace {
            return Err(ConfigError::InvalidTracing(
                "trace_skips requires logger level Trace".to_string(),
            ));
        }

        Ok(())
    }

    /// Build configuration from environment variables
    ///
    /// Overrides defaults with environment variables:
    /// - HEAPSCAN_UNICODE
    /// - HEAPSCAN_VERBOSE
    /// - HEAPSCAN_STATS
    /// - HEAPSCAN_TRACE_SKIPS (also turns on verbose at logger level Trace)
    /// - HEAPSCAN_LOG_JSON
    ///
    /// ```bash
    /// export HEAPSCAN_VERBOSE=1
    /// export HEAPSCAN_LOG_JSON=true
    /// ```
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(flag) = env_flag("HEAPSCAN_UNICODE") {
            config.unicode = flag;
        }

        if let Some(flag) = env_flag("HEAPSCAN_VERBOSE") {
            config.verbose = flag;
        }

        if let Some(flag) = env_flag("HEAPSCAN_STATS") {
            config.stats_enabled = flag;
        }

        if let Some(flag) = env_flag("HEAPSCAN_TRACE_SKIPS") {
            config.trace_skips = flag;
            if flag {
                config.verbose = true;
                config.logger.level = LogLevel::Trace;
            }
        }

        if let Some(flag) = env_flag("HEAPSCAN_LOG_JSON") {
            config.logger.json = flag;
        }

        config
    }

    /// Replace the global scan logger with one built from `self.logger`
    pub fn install_logger(&self) {
        crate::logging::configure_logger(self.logger.clone());
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|val| val == "1" || val.eq_ignore_ascii_case("true"))
}

/// Error types for configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid log file: {0}")]
    InvalidLogFile(String),

    #[error("Invalid tracing setup: {0}")]
    InvalidTracing(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::ScanEvent;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.stats_enabled);
        assert!(!config.verbose);
        assert_eq!(config.unicode, cfg!(feature = "unicode"));
    }

    #[test]
    fn test_trace_skips_needs_verbose() {
        let config = ScanConfig {
            trace_skips: true,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_trace_skips_needs_trace_level() {
        let mut config = ScanConfig {
            verbose: true,
            trace_skips: true,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.logger.level = LogLevel::Trace;
        assert!(config.validate().is_ok());
    }

    // Single test so no other test races on the HEAPSCAN_* variables
    #[test]
    fn test_from_env_overrides() {
        const VARS: [&str; 5] = [
            "HEAPSCAN_UNICODE",
            "HEAPSCAN_VERBOSE",
            "HEAPSCAN_STATS",
            "HEAPSCAN_TRACE_SKIPS",
            "HEAPSCAN_LOG_JSON",
        ];
        for var in VARS {
            std::env::remove_var(var);
        }

        let config = ScanConfig::from_env();
        assert_eq!(config.unicode, cfg!(feature = "unicode"));
        assert!(!config.verbose);
        assert!(config.stats_enabled);

        std::env::set_var("HEAPSCAN_UNICODE", "TRUE");
        std::env::set_var("HEAPSCAN_VERBOSE", "1");
        std::env::set_var("HEAPSCAN_STATS", "0");
        std::env::set_var("HEAPSCAN_LOG_JSON", "true");
        let config = ScanConfig::from_env();
        assert!(config.unicode);
        assert!(config.verbose);
        assert!(!config.stats_enabled);
        assert!(config.logger.json);
        assert!(!config.trace_skips);

        std::env::set_var("HEAPSCAN_VERBOSE", "no");
        std::env::set_var("HEAPSCAN_TRACE_SKIPS", "1");
        let config = ScanConfig::from_env();
        assert!(config.trace_skips);
        assert!(config.verbose);
        assert_eq!(config.logger.level, LogLevel::Trace);
        assert!(config.validate().is_ok());

        for var in VARS {
            std::env::remove_var(var);
        }
    }

    // Only test in this binary that touches the global logger
    #[test]
    fn test_install_logger_replaces_global() {
        let mut config = ScanConfig::default();
        config.logger.level = LogLevel::Trace;
        config.logger.timestamps = false;
        config.install_logger();
        assert_eq!(crate::logging::get_event_count(), 0);

        crate::logging::log_event(ScanEvent::CandidateSkipped {
            address: 0x20,
            reason: "unnamed",
        });
        assert_eq!(crate::logging::get_event_count(), 1);
        assert!(matches!(
            crate::logging::global_events()[..],
            [ScanEvent::CandidateSkipped { address: 0x20, .. }]
        ));

        // default level filters trace events out
        ScanConfig::default().install_logger();
        crate::logging::log_event(ScanEvent::CandidateSkipped {
            address: 0x20,
            reason: "unnamed",
        });
        assert_eq!(crate::logging::get_event_count(), 0);
    }

    #[test]
    fn test_blank_log_file_rejected() {
        let mut config = ScanConfig::default();
        config.logger.file = Some("   ".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLogFile(_))
        ));
    }
}
