//! Prometheus metrics for the organization engine.
//!
//! This module provides metrics for:
//! - Runs and per-file outcomes
//! - Resolution tiers (which tier supplied a field)
//! - External lookups and copies

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts};

// =============================================================================
// Run Metrics
// =============================================================================

/// Organization runs started.
pub static RUNS_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("audioshelf_runs_started_total", "Total organization runs started").unwrap()
});

/// Files processed by outcome.
pub static FILES_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("audioshelf_files_processed_total", "Total files processed"),
        &["outcome"], // "accepted", "unidentifiable", "duplicate", "copy_failed"
    )
    .unwrap()
});

// =============================================================================
// Resolution Metrics
// =============================================================================

/// Fields filled, by the tier that supplied them.
pub static FIELDS_RESOLVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "audioshelf_fields_resolved_total",
            "Metadata fields resolved per tier",
        ),
        &["tier"],
    )
    .unwrap()
});

/// Tag reads that failed and were skipped.
pub static TAG_READ_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "audioshelf_tag_read_failures_total",
        "Embedded tag reads that failed",
    )
    .unwrap()
});

/// External lookup requests by result.
pub static LOOKUP_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("audioshelf_lookup_requests_total", "Total external lookups"),
        &["result"], // "match", "no_match", "error", "timeout"
    )
    .unwrap()
});

// =============================================================================
// Placement Metrics
// =============================================================================

/// Bytes copied into the library.
pub static BYTES_COPIED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("audioshelf_bytes_copied_total", "Total bytes copied").unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(RUNS_STARTED.clone()),
        Box::new(FILES_PROCESSED.clone()),
        Box::new(FIELDS_RESOLVED.clone()),
        Box::new(TAG_READ_FAILURES.clone()),
        Box::new(LOOKUP_REQUESTS.clone()),
        Box::new(BYTES_COPIED.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        FILES_PROCESSED.with_label_values(&["accepted"]).inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "audioshelf_files_processed_total"));
    }
}
