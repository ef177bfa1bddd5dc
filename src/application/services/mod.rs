//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (ArchiveExtractor, Reporter, etc.)
//! but are themselves concrete structs, not traits.

mod conversion;

pub use conversion::{ConversionService, ConversionSummary};
