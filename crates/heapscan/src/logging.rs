//! Scan Logging and Tracing
//!
//! Event logging for heap scans, useful for:
//! - Finding out why a symbol lookup came back empty
//! - Auditing which candidates a walk rejected
//! - Measuring walk cost on large regions
//!
//! Log Levels:
//! - WARN: Suspicious heap contents (zero-sized objects)
//! - INFO: Scan results
//! - DEBUG: Scan starts, budget exhaustion
//! - TRACE: Per-candidate skips

use parking_lot::Mutex;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Log level for scan events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

/// Scan event types
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    /// Scan started at `start`; `end` is None for budget-driven scans
    ScanStart {
        scanner: &'static str,
        start: usize,
        end: Option<usize>,
    },

    /// Scan finished
    ScanEnd {
        scanner: &'static str,
        visited: u64,
        found: Option<usize>,
        duration_us: u64,
    },

    /// A candidate object was rejected
    CandidateSkipped { address: usize, reason: &'static str },

    /// Word budget ran out before a match
    BudgetExhausted { cursor: usize, examined: u64 },

    /// Size oracle reported zero words for an object
    ZeroSizedObject { address: usize, header: u64 },
}

/// Scan logger configuration
#[derive(Debug, Clone)]
pub struct ScanLoggerConfig {
    /// Minimum log level
    pub level: LogLevel,

    /// Enable console output
    pub console: bool,

    /// Append events to this file
    pub file: Option<String>,

    /// Enable JSON format
    pub json: bool,

    /// Enable timestamps
    pub timestamps: bool,
}

impl Default for ScanLoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            console: false,
            file: None,
            json: false,
            timestamps: true,
        }
    }
}

/// Scan logger - centralized event log for scans
pub struct ScanLogger {
    config: ScanLoggerConfig,
    events: Mutex<Vec<(Instant, ScanEvent)>>,
    enabled: AtomicBool,
}

impl ScanLogger {
    /// Create new scan logger
    pub fn new(config: ScanLoggerConfig) -> Self {
        Self {
            config,
            events: Mutex::new(Vec::new()),
            enabled: AtomicBool::new(true),
        }
    }

    /// Enable logging
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Disable logging
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Log a scan event
    pub fn log(&self, event: ScanEvent) {
        if !self.is_enabled() {
            return;
        }

        if Self::event_level(&event) > self.config.level {
            return;
        }

        let line = self.render(&event);

        if self.config.console {
            println!("{}", line);
        }

        if let Some(ref path) = self.config.file {
            let written = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| writeln!(file, "{}", line));
            if let Err(e) = written {
                log::error!("ScanLogger could not append to {}: {}", path, e);
            }
        }

        self.events.lock().push((Instant::now(), event));
    }

    /// Get log level for event
    fn event_level(event: &ScanEvent) -> LogLevel {
        match event {
            ScanEvent::ZeroSizedObject { .. } => LogLevel::Warn,
            ScanEvent::ScanEnd { .. } => LogLevel::Info,
            ScanEvent::ScanStart { .. } | ScanEvent::BudgetExhausted { .. } => LogLevel::Debug,
            ScanEvent::CandidateSkipped { .. } => LogLevel::Trace,
        }
    }

    fn render(&self, event: &ScanEvent) -> String {
        let body = if self.config.json {
            Self::json(event)
        } else {
            Self::human(event)
        };

        if self.config.timestamps {
            let now = chrono::Local::now();
            format!("[{}] {}", now.format("%Y-%m-%d %H:%M:%S%.3f"), body)
        } else {
            body
        }
    }

    /// JSON rendering, falling back to the human form if serialization fails
    fn json(event: &ScanEvent) -> String {
        match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                log::error!("ScanLogger could not serialize {:?}: {}", event, e);
                Self::human(event)
            }
        }
    }

    /// Human-readable rendering
    fn human(event: &ScanEvent) -> String {
        match event {
            ScanEvent::ScanStart {
                scanner,
                start,
                end: Some(end),
            } => format!("[SCAN] {} over [{:#x}, {:#x})", scanner, start, end),
            ScanEvent::ScanStart {
                scanner,
                start,
                end: None,
            } => format!("[SCAN] {} from {:#x}", scanner, start),
            ScanEvent::ScanEnd {
                scanner,
                visited,
                found,
                duration_us,
            } => match found {
                Some(addr) => format!(
                    "[SCAN] {} found {:#x} after {} objects ({} us)",
                    scanner, addr, visited, duration_us
                ),
                None => format!(
                    "[SCAN] {} found nothing after {} objects ({} us)",
                    scanner, visited, duration_us
                ),
            },
            ScanEvent::CandidateSkipped { address, reason } => {
                format!("[SCAN] skip {:#x}: {}", address, reason)
            },
            ScanEvent::BudgetExhausted { cursor, examined } => format!(
                "[SCAN] budget exhausted at {:#x} after {} cells",
                cursor, examined
            ),
            ScanEvent::ZeroSizedObject { address, header } => format!(
                "[SCAN] zero-sized object at {:#x} (header {:#x})",
                address, header
            ),
        }
    }

    /// Get all events
    pub fn get_events(&self) -> Vec<(Instant, ScanEvent)> {
        self.events.lock().clone()
    }

    /// Clear all events
    pub fn clear_events(&self) {
        self.events.lock().clear();
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }
}

impl Default for ScanLogger {
    fn default() -> Self {
        Self::new(ScanLoggerConfig::default())
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL_LOGGER: Mutex<ScanLogger> = Mutex::new(ScanLogger::default());
}

/// Log a scan event to global logger
pub fn log_event(event: ScanEvent) {
    GLOBAL_LOGGER.lock().log(event);
}

/// Configure global logger
pub fn configure_logger(config: ScanLoggerConfig) {
    *GLOBAL_LOGGER.lock() = ScanLogger::new(config);
}

/// Get global logger event count
pub fn get_event_count() -> usize {
    GLOBAL_LOGGER.lock().event_count()
}

/// Snapshot of the global logger's events
pub fn global_events() -> Vec<ScanEvent> {
    GLOBAL_LOGGER
        .lock()
        .get_events()
        .into_iter()
        .map(|(_, event)| event)
        .collect()
}
