//! I/O boundary traits for testability
//!
//! These traits abstract the side effects of a conversion, allowing the
//! conversion service to be tested with stub implementations.

use std::path::Path;

use crate::infrastructure::archive::{ArchiveError, ExtractedArchive};

/// Materializes an archive into a directory owned by the returned guard.
pub trait ArchiveExtractor: Send + Sync {
    fn extract(&self, archive: &Path) -> Result<ExtractedArchive, ArchiveError>;
}

/// Operator-facing progress and problem reports.
pub trait Reporter: Send + Sync {
    fn info(&self, message: &str);

    fn warn(&self, message: &str);
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Forwards reports to `tracing`.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!(target: "mm2csv::report", "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "mm2csv::report", "{}", message);
    }
}
