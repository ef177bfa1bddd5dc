//! Service container for dependency injection
//!
//! Wires up the conversion service with its dependencies.

use std::sync::Arc;

use crate::application::services::ConversionService;
use crate::config::Settings;
use crate::domain::{IdGenerator, UuidGenerator};
use crate::infrastructure::archive::ZipExtractor;
use crate::infrastructure::traits::{ArchiveExtractor, Reporter, TracingReporter};

/// Container holding all application dependencies.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Archive extraction
    pub extractor: Arc<dyn ArchiveExtractor>,

    /// Node identifier source
    pub ids: Arc<dyn IdGenerator>,

    /// Operator-facing reports
    pub reporter: Arc<dyn Reporter>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(ZipExtractor::new()),
            Arc::new(UuidGenerator),
            Arc::new(TracingReporter),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        extractor: Arc<dyn ArchiveExtractor>,
        ids: Arc<dyn IdGenerator>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            extractor,
            ids,
            reporter,
        }
    }

    /// Conversion service configured from the container's settings.
    pub fn conversion_service(&self) -> ConversionService {
        ConversionService::new(
            self.settings.convert_options(),
            Arc::clone(&self.extractor),
            Arc::clone(&self.ids),
            Arc::clone(&self.reporter),
        )
    }
}
