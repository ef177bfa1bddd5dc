//! Infrastructure layer: archive extraction, output sinks and DI container
//!
//! This layer implements the I/O boundary traits and wires up services.

pub mod archive;
pub mod di;
pub mod sink;
pub mod traits;

pub use archive::{ArchiveError, ExtractedArchive, ExtractionReport, ZipExtractor};
pub use sink::{OutputTarget, RowWriter};
