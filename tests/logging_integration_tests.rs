//! Integration tests for the octree crate's logging facade.
//!
//! No octree construction here — these exercise `Log` directly through
//! the public `octree` crate surface, the same way the teacher's own
//! `logging_integration_tests.rs` exercises `Engine`.
//!
//! Run with: cargo test --test logging_integration_tests

use octree::log::{Log, LogEntry, LogSeverity, Logger};
use serial_test::serial;
use std::sync::{Arc, Mutex};

struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

#[test]
#[serial]
fn custom_logger_receives_messages_of_every_severity() {
    let (test_logger, entries) = TestLogger::new();
    Log::set_logger(test_logger);

    Log::log(LogSeverity::Trace, "test", "trace".to_string());
    Log::log(LogSeverity::Debug, "test", "debug".to_string());
    Log::log(LogSeverity::Info, "test", "info".to_string());
    Log::log(LogSeverity::Warn, "test", "warn".to_string());
    Log::log(LogSeverity::Error, "test", "error".to_string());

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 5);
    assert_eq!(captured[0].severity, LogSeverity::Trace);
    assert_eq!(captured[4].severity, LogSeverity::Error);

    Log::reset_logger();
}

#[test]
#[serial]
fn constructing_a_tree_with_an_oversized_min_node_logs_a_warning() {
    let (test_logger, entries) = TestLogger::new();
    Log::set_logger(test_logger);

    let _tree = octree::PointOctree::<u32>::new(2.0, glam::Vec3::ZERO, 10.0);

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Warn);
    assert!(captured[0].message.contains("min_node_size"));

    Log::reset_logger();
}

#[test]
#[serial]
fn constructing_a_bounds_tree_with_out_of_range_looseness_logs_a_warning() {
    let (test_logger, entries) = TestLogger::new();
    Log::set_logger(test_logger);

    let _tree = octree::BoundsOctree::<u32>::new(2.0, glam::Vec3::ZERO, 0.5, 3.0);

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Warn);
    assert!(captured[0].message.contains("looseness"));

    Log::reset_logger();
}

#[test]
#[serial]
fn a_degenerate_insertion_logs_an_error_with_file_and_line() {
    let (test_logger, entries) = TestLogger::new();
    Log::set_logger(test_logger);

    let mut tree = octree::PointOctree::<u32>::new(2.0, glam::Vec3::ZERO, 0.5);
    tree.add(1, glam::Vec3::new(f32::NAN, 0.0, 0.0));

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert!(captured[0].file.is_some());

    Log::reset_logger();
}

#[test]
#[serial]
fn logger_reset_stops_routing_to_the_old_logger() {
    let (test_logger, entries) = TestLogger::new();
    Log::set_logger(test_logger);
    Log::log(LogSeverity::Info, "test", "before reset".to_string());
    Log::reset_logger();
    Log::log(LogSeverity::Info, "test", "after reset".to_string());

    let captured = entries.lock().unwrap();
    assert_eq!(captured.len(), 1);
}
