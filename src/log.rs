//! Internal logging system for the octree crate
//!
//! This module provides a flexible logging system with:
//! - Customizable logger via the [`Logger`] trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - Thread-safe logging with RwLock
//! - File and line information for detailed ERROR logs
//!
//! The octree never panics or returns an error to the caller for the
//! failure modes it can recover from (clamped construction parameters,
//! degenerate insertions, exhausted grow budget) — it reports them
//! through this facade instead. See the crate-level docs for the
//! invariant this protects.

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// Implement this trait to route octree diagnostics into an existing
/// logging pipeline (file logging, a host application's own logger, etc.)
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level (Trace, Debug, Info, Warn, Error)
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source module (e.g., "octree::PointOctree")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Very verbose debug information (typically disabled in release)
    Trace,
    /// Development/debugging information
    Debug,
    /// Important informational messages
    Info,
    /// Warning messages (potential issues, e.g. a clamped parameter)
    Warn,
    /// Error messages (critical issues with file:line details)
    Error,
}

/// Default logger implementation using colored console output
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)`
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity_str = match entry.severity {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        };

        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            println!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity_str, source, entry.message, file, line
            );
        } else {
            println!("[{}] [{}] [{}] {}", timestamp, severity_str, source, entry.message);
        }
    }
}

// ===== GLOBAL LOG FACADE =====

use std::sync::{OnceLock, RwLock};

static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Process-wide logging facade used by the `octree_*!` macros.
///
/// Mirrors this codebase's engine-wide logging singleton: a single
/// pluggable logger slot guarded by a `RwLock`, defaulting to
/// [`DefaultLogger`] until a caller installs their own.
pub struct Log;

impl Log {
    /// Install a custom logger, replacing the current one.
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let slot = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut guard) = slot.write() {
            *guard = Box::new(logger);
        }
    }

    /// Reset the logger to [`DefaultLogger`].
    pub fn reset_logger() {
        let slot = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut guard) = slot.write() {
            *guard = Box::new(DefaultLogger);
        }
    }

    /// Internal logging method (for simple logs without file:line)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        let slot = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(guard) = slot.read() {
            guard.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        let slot = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(guard) = slot.read() {
            guard.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

/// Log a TRACE message (very verbose, typically disabled)
#[macro_export]
macro_rules! octree_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::Log::log($crate::log::LogSeverity::Trace, $source, format!($($arg)*))
    };
}

/// Log a DEBUG message
#[macro_export]
macro_rules! octree_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::Log::log($crate::log::LogSeverity::Debug, $source, format!($($arg)*))
    };
}

/// Log an INFO message
#[macro_export]
macro_rules! octree_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::Log::log($crate::log::LogSeverity::Info, $source, format!($($arg)*))
    };
}

/// Log a WARN message (e.g. a clamped construction parameter)
#[macro_export]
macro_rules! octree_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::Log::log($crate::log::LogSeverity::Warn, $source, format!($($arg)*))
    };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! octree_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::Log::log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use serial_test::serial;

    struct CapturingLogger {
        entries: Arc<Mutex<Vec<LogEntry>>>,
    }

    impl Logger for CapturingLogger {
        fn log(&self, entry: &LogEntry) {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }

    #[test]
    #[serial]
    fn custom_logger_receives_entries() {
        let entries = Arc::new(Mutex::new(Vec::new()));
        Log::set_logger(CapturingLogger { entries: entries.clone() });

        octree_warn!("octree::test", "clamped min_size from {} to {}", 5.0, 2.0);
        octree_error!("octree::test", "degenerate locator after {} grows", 20);

        let captured = entries.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(captured[0].severity, LogSeverity::Warn);
        assert_eq!(captured[1].severity, LogSeverity::Error);
        assert!(captured[1].file.is_some());

        Log::reset_logger();
    }
}
