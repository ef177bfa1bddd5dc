//! Row sinks: CSV files and plain text on stdout
//!
//! File output is staged in a temporary file next to the destination and only
//! renamed into place by [`RowWriter::finish`]. A conversion that fails half
//! way therefore never leaves a partial CSV behind. The staged file takes the
//! mode of the file it replaces, or the umask-derived default for a new file.

use std::fmt;
use std::fs;
use std::io::{self, BufWriter, Write};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tempfile::NamedTempFile;
use tracing::debug;

/// Destination of the converted rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// `None` or an empty path means stdout.
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) if !path.as_os_str().is_empty() => OutputTarget::File(path),
            _ => OutputTarget::Stdout,
        }
    }

    /// Open a writer for this target.
    pub fn open(&self) -> io::Result<Box<dyn RowWriter>> {
        match self {
            OutputTarget::Stdout => Ok(Box::new(PlainRowWriter::new(BufWriter::new(
                io::stdout(),
            )))),
            OutputTarget::File(path) => Ok(Box::new(StagedCsvFile::create(path)?)),
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Stdout => f.write_str("<stdout>"),
            OutputTarget::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Consumer of output rows.
pub trait RowWriter {
    fn write_row(&mut self, fields: &[String]) -> io::Result<()>;

    /// Flush and publish the output at its destination.
    fn finish(self: Box<Self>) -> io::Result<()>;
}

/// CSV with minimal quoting and `\r\n` line terminators.
pub struct CsvRowWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvRowWriter<W> {
    pub fn new(inner: W) -> Self {
        let writer = WriterBuilder::new()
            .delimiter(b',')
            .quote(b'"')
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::CRLF)
            .from_writer(inner);
        Self { writer }
    }

    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> RowWriter for CsvRowWriter<W> {
    fn write_row(&mut self, fields: &[String]) -> io::Result<()> {
        self.writer.write_record(fields)?;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Comma-joined fields, one row per line, no quoting.
pub struct PlainRowWriter<W: Write> {
    out: W,
}

impl<W: Write> PlainRowWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RowWriter for PlainRowWriter<W> {
    fn write_row(&mut self, fields: &[String]) -> io::Result<()> {
        writeln!(self.out, "{}", fields.join(","))
    }

    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.out.flush()
    }
}

/// CSV written to a temporary sibling of `destination`, renamed on finish.
struct StagedCsvFile {
    csv: CsvRowWriter<BufWriter<NamedTempFile>>,
    destination: PathBuf,
}

impl StagedCsvFile {
    fn create(destination: &Path) -> io::Result<Self> {
        let destination = resolve_symlink(destination);
        let parent = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut builder = tempfile::Builder::new();
        builder.prefix(".mm2csv-").suffix(".tmp");
        // same mode a plain create would give: 0o666 minus the umask
        #[cfg(unix)]
        builder.permissions(fs::Permissions::from_mode(0o666));
        let staged = builder.tempfile_in(&parent)?;
        if let Ok(existing) = fs::metadata(&destination) {
            staged.as_file().set_permissions(existing.permissions())?;
        }
        debug!("staging output in {}", staged.path().display());
        Ok(Self {
            csv: CsvRowWriter::new(BufWriter::new(staged)),
            destination,
        })
    }
}

/// Write through a symlinked destination instead of replacing the link.
fn resolve_symlink(destination: &Path) -> PathBuf {
    let is_link = fs::symlink_metadata(destination)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if is_link {
        if let Ok(target) = fs::canonicalize(destination) {
            return target;
        }
    }
    destination.to_path_buf()
}

impl RowWriter for StagedCsvFile {
    fn write_row(&mut self, fields: &[String]) -> io::Result<()> {
        self.csv.write_row(fields)
    }

    fn finish(self: Box<Self>) -> io::Result<()> {
        let StagedCsvFile { csv, destination } = *self;
        let staged = csv.into_inner()?.into_inner().map_err(|e| e.into_error())?;
        staged.as_file().sync_all()?;
        staged.persist(&destination)?;
        debug!("output written to {}", destination.display());
        Ok(())
    }
}
