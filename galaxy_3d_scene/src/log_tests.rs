//! Unit tests for log.rs
//!
//! Tests LogSeverity ordering, DefaultLogger/NullLogger, the emit helpers
//! and the logger-injected engine_* macros.

use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, NullLogger, emit, emit_detailed};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Logger that keeps every entry for inspection
#[derive(Default)]
struct CaptureLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl CaptureLogger {
    fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn entry(severity: LogSeverity, file: Option<&'static str>, line: Option<u32>) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "galaxy3d::ScenePass".to_string(),
        message: "pass executed".to_string(),
        file,
        line,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_debug() {
    assert_eq!(format!("{:?}", LogSeverity::Trace), "Trace");
    assert_eq!(format!("{:?}", LogSeverity::Warn), "Warn");
    assert_eq!(format!("{:?}", LogSeverity::Error), "Error");
}

// ============================================================================
// LOGGER IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_default_logger_all_severities() {
    let logger = DefaultLogger;
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        // Just verify it doesn't panic
        logger.log(&entry(severity, None, None));
        logger.log(&entry(severity, Some("scene_pass.rs"), Some(12)));
    }
}

#[test]
fn test_null_logger_accepts_entries() {
    NullLogger.log(&entry(LogSeverity::Error, Some("x.rs"), Some(1)));
}

#[test]
fn test_logger_trait_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
    assert_send_sync::<NullLogger>();
    assert_send_sync::<Arc<dyn Logger>>();
}

#[test]
fn test_arc_logger_forwards() {
    let capture = Arc::new(CaptureLogger::default());
    let shared: Arc<dyn Logger> = capture.clone();
    shared.log(&entry(LogSeverity::Info, None, None));
    assert_eq!(capture.entries().len(), 1);
}

// ============================================================================
// EMIT HELPERS
// ============================================================================

#[test]
fn test_emit_without_file_line() {
    let capture = CaptureLogger::default();
    emit(&capture, LogSeverity::Warn, "galaxy3d::SceneRenderScriptParser", "unknown element".to_string());

    let entries = capture.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, LogSeverity::Warn);
    assert_eq!(entries[0].source, "galaxy3d::SceneRenderScriptParser");
    assert_eq!(entries[0].message, "unknown element");
    assert!(entries[0].file.is_none());
    assert!(entries[0].line.is_none());
}

#[test]
fn test_emit_detailed_records_location() {
    let capture = CaptureLogger::default();
    emit_detailed(&capture, LogSeverity::Error, "galaxy3d::SceneProcedure", "boom".to_string(), "scene_procedure.rs", 42);

    let entries = capture.entries();
    assert_eq!(entries[0].file, Some("scene_procedure.rs"));
    assert_eq!(entries[0].line, Some(42));
}

// ============================================================================
// MACROS
// ============================================================================

#[test]
fn test_macros_route_to_injected_logger() {
    let capture = Arc::new(CaptureLogger::default());
    let logger: Arc<dyn Logger> = capture.clone();

    crate::engine_trace!(logger, "galaxy3d::Test", "trace {}", 1);
    crate::engine_debug!(logger, "galaxy3d::Test", "debug {}", 2);
    crate::engine_info!(logger, "galaxy3d::Test", "info {}", 3);
    crate::engine_warn!(logger, "galaxy3d::Test", "warn {}", 4);
    crate::engine_error!(logger, "galaxy3d::Test", "error {}", 5);

    let entries = capture.entries();
    let severities: Vec<LogSeverity> = entries.iter().map(|e| e.severity).collect();
    assert_eq!(severities, vec![
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ]);
    assert_eq!(entries[3].message, "warn 4");
    assert!(entries[3].file.is_none());
    // Only ERROR carries file:line
    assert!(entries[4].file.unwrap().ends_with("log_tests.rs"));
    assert!(entries[4].line.is_some());
}
