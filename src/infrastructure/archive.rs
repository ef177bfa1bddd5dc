//! Zip extraction into a per-conversion temporary directory
//!
//! Entry names are untrusted. The directory portion of every name is rebuilt
//! from its plain components only (no empty, `.`, `..` or drive components),
//! so traversal entries such as `../../etc/passwd` or `/etc/passwd` land
//! harmlessly inside the extraction directory.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::infrastructure::traits::ArchiveExtractor;

/// Prefix of the per-conversion extraction directory.
pub const EXTRACTION_DIR_PREFIX: &str = "mindmeister-";

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("cannot open archive {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("not a valid zip archive: {path}")]
    Corrupted {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("cannot read archive entry #{index}")]
    Entry {
        index: usize,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("cannot create extraction directory")]
    TempDir {
        #[source]
        source: io::Error,
    },

    #[error("failed to extract '{entry}' to {path}")]
    Write {
        entry: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ArchiveError {
    /// True when the archive file itself does not exist.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, ArchiveError::Open { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Where an archive entry lands, relative to the extraction directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryTarget {
    Directory(PathBuf),
    File(PathBuf),
    Skipped { reason: &'static str },
}

/// Map a raw entry name onto a path below the extraction directory.
///
/// Directory components are sanitized: drive prefixes, backslash-separated
/// prefixes, `.` and `..` are dropped. The final component is written as-is
/// with one exception: an entry whose final component is `.` or `..`,
/// contains a `\`, or starts with an `X:` drive prefix is skipped rather
/// than extracted. Such names are ordinary file names on Unix but paths on
/// Windows, so they are not extracted on any platform. Skips surface as [`EntryTarget::Skipped`] and end up in the
/// extraction report.
pub fn entry_target(name: &str) -> EntryTarget {
    let mut parts: Vec<&str> = name.split('/').collect();
    let file_name = parts.pop().unwrap_or_default();

    let mut relative = PathBuf::new();
    for part in parts {
        if let Some(component) = sanitize_component(part) {
            relative.push(component);
        }
    }

    if file_name.is_empty() {
        return EntryTarget::Directory(relative);
    }
    if matches!(file_name, "." | "..") || file_name.contains('\\') || has_drive(file_name) {
        return EntryTarget::Skipped {
            reason: "entry name does not end in a plain file name",
        };
    }
    relative.push(file_name);

    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return EntryTarget::Skipped {
            reason: "entry name does not resolve below the extraction directory",
        };
    }
    EntryTarget::File(relative)
}

fn sanitize_component(part: &str) -> Option<&str> {
    let part = strip_drive(part);
    let part = part.rsplit('\\').next().unwrap_or(part);
    match part {
        "" | "." | ".." => None,
        _ => Some(part),
    }
}

fn has_drive(part: &str) -> bool {
    let bytes = part.as_bytes();
    bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic()
}

fn strip_drive(part: &str) -> &str {
    if has_drive(part) {
        &part[2..]
    } else {
        part
    }
}

/// An entry that was not written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub name: String,
    pub reason: &'static str,
}

/// What an extraction wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Files written, relative to the extraction directory
    pub files: Vec<PathBuf>,
    /// Number of directory entries materialized
    pub directories: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// Extracted archive contents. The directory is removed on drop.
#[derive(Debug)]
pub struct ExtractedArchive {
    dir: TempDir,
    report: ExtractionReport,
}

impl ExtractedArchive {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn report(&self) -> &ExtractionReport {
        &self.report
    }

    /// Remove the extraction directory, surfacing any removal error.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}

/// Extracts zip archives into uniquely named temporary directories.
#[derive(Debug, Clone, Default)]
pub struct ZipExtractor {
    temp_root: Option<PathBuf>,
}

impl ZipExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create extraction directories under `root` instead of the system temp dir.
    pub fn with_temp_root(root: impl Into<PathBuf>) -> Self {
        Self {
            temp_root: Some(root.into()),
        }
    }

    fn create_dir(&self) -> Result<TempDir, ArchiveError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(EXTRACTION_DIR_PREFIX);
        let dir = match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(|source| ArchiveError::TempDir { source })
    }
}

impl ArchiveExtractor for ZipExtractor {
    #[instrument(level = "debug", skip(self))]
    fn extract(&self, archive: &Path) -> Result<ExtractedArchive, ArchiveError> {
        let file = File::open(archive).map_err(|source| ArchiveError::Open {
            path: archive.to_path_buf(),
            source,
        })?;
        let mut zip =
            zip::ZipArchive::new(BufReader::new(file)).map_err(|source| {
                ArchiveError::Corrupted {
                    path: archive.to_path_buf(),
                    source,
                }
            })?;

        let dir = self.create_dir()?;
        debug!("extracting {} entries into {}", zip.len(), dir.path().display());
        // on error `dir` is dropped here, which removes everything written so far
        let report = extract_entries(&mut zip, dir.path())?;

        Ok(ExtractedArchive { dir, report })
    }
}

fn extract_entries<R: Read + Seek>(
    zip: &mut zip::ZipArchive<R>,
    destination: &Path,
) -> Result<ExtractionReport, ArchiveError> {
    let mut report = ExtractionReport::default();

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|source| ArchiveError::Entry { index, source })?;
        let name = entry.name().to_string();

        match entry_target(&name) {
            EntryTarget::Directory(relative) => {
                let path = destination.join(&relative);
                fs::create_dir_all(&path).map_err(|source| ArchiveError::Write {
                    entry: name.clone(),
                    path: path.clone(),
                    source,
                })?;
                report.directories += 1;
            }
            EntryTarget::File(relative) => {
                let path = destination.join(&relative);
                write_file(&mut entry, &path).map_err(|source| ArchiveError::Write {
                    entry: name.clone(),
                    path: path.clone(),
                    source,
                })?;
                debug!("extracted {} -> {}", name, relative.display());
                report.files.push(relative);
            }
            EntryTarget::Skipped { reason } => {
                warn!("skipping archive entry '{}': {}", name, reason);
                report.skipped.push(SkippedEntry { name, reason });
            }
        }
    }

    Ok(report)
}

fn write_file(reader: &mut impl Read, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = File::create(path)?;
    io::copy(reader, &mut out)?;
    Ok(())
}
