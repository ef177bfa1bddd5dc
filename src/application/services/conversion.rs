//! Mind map conversion service
//!
//! Drives one conversion: extract the archive, load `map.json`, walk the
//! hierarchy and write the rows to the chosen target.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{
    ConvertOptions, HierarchyWalker, IdGenerator, MindMapDocument, MAP_FILE_NAME,
};
use crate::infrastructure::archive::SkippedEntry;
use crate::infrastructure::sink::OutputTarget;
use crate::infrastructure::traits::{ArchiveExtractor, Reporter};

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Rows written (titled nodes)
    pub rows: usize,
    /// Nodes visited, titled or not
    pub nodes: usize,
    pub max_depth: usize,
    /// Archive entries that were not extracted
    pub skipped: Vec<SkippedEntry>,
    pub output: OutputTarget,
}

/// Service converting MindMeister exports into flat rows.
pub struct ConversionService {
    options: ConvertOptions,
    extractor: Arc<dyn ArchiveExtractor>,
    ids: Arc<dyn IdGenerator>,
    reporter: Arc<dyn Reporter>,
}

impl ConversionService {
    /// Create a new conversion service.
    pub fn new(
        options: ConvertOptions,
        extractor: Arc<dyn ArchiveExtractor>,
        ids: Arc<dyn IdGenerator>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            options,
            extractor,
            ids,
            reporter,
        }
    }

    /// Convert the archive at `input` and write its rows to `output`.
    ///
    /// The extraction directory is removed whatever the outcome. A file
    /// target only appears once every row has been written.
    #[instrument(level = "debug", skip_all, fields(input = %input.display(), output = %output))]
    pub fn convert(
        &self,
        input: &Path,
        output: &OutputTarget,
    ) -> ApplicationResult<ConversionSummary> {
        self.reporter
            .info(&format!("Extracting MindMeister archive {}", input.display()));
        let extracted = self.extractor.extract(input)?;
        let skipped = extracted.report().skipped.clone();
        for entry in &skipped {
            self.reporter.warn(&format!(
                "Skipped archive entry '{}': {}",
                entry.name, entry.reason
            ));
        }

        let document = self.load_document(input, &extracted.path().join(MAP_FILE_NAME))?;

        let walker = HierarchyWalker::new(&self.options, Arc::clone(&self.ids));
        debug!("columns: {:?}", walker.layout().columns());
        let mut writer = output
            .open()
            .with_target_context("open output", output)?;
        let walked = walker
            .walk(&document.root, self.ids.mint(), |row| {
                writer.write_row(row.fields())
            })
            .with_target_context("write output", output)?;
        writer
            .finish()
            .with_target_context("finish output", output)?;

        let extraction_dir = extracted.path().to_path_buf();
        if let Err(e) = extracted.close() {
            self.reporter.warn(&format!(
                "Could not remove extraction directory {}: {}",
                extraction_dir.display(),
                e
            ));
        }

        self.reporter.info(&format!(
            "Wrote {} rows ({} nodes, depth {}) to {}",
            walked.rows_emitted, walked.nodes_visited, walked.max_depth, output
        ));
        Ok(ConversionSummary {
            rows: walked.rows_emitted,
            nodes: walked.nodes_visited,
            max_depth: walked.max_depth,
            skipped,
            output: output.clone(),
        })
    }

    fn load_document(&self, input: &Path, map_file: &Path) -> ApplicationResult<MindMapDocument> {
        if !map_file.is_file() {
            return Err(ApplicationError::MissingMapFile(PathBuf::from(input)));
        }
        debug!("loading {}", map_file.display());
        let content = fs::read(map_file).with_path_context("read map file", map_file)?;
        Ok(MindMapDocument::from_slice(&content)?)
    }
}
