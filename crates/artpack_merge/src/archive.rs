//! Archive reader/writer abstraction.
//!
//! The merge pipeline only needs two capabilities from an archive:
//!
//! - **Read**: enumerate entries (name, directory marker, size) and read one
//!   entry's bytes by name: [`ArchiveReader`].
//! - **Write**: append an entry at a virtual path: [`ArchiveWriter`].
//!
//! Zip archives implement both. A plain directory also implements
//! [`ArchiveReader`], so a pack can be either a zip of nested zips or a folder
//! of them.

use crate::config::CompressionKind;
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// One entry as listed by an [`ArchiveReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path-like entry name, using `/` separators.
    pub name: String,
    /// Whether the entry is only a directory marker.
    pub is_dir: bool,
    /// Uncompressed size in bytes.
    pub size: u64,
}

/// Random-access, read-only view of an archive.
///
/// Methods take `&mut self` so zip-backed readers can seek.
pub trait ArchiveReader {
    /// List every entry, directory markers included, in archive order.
    fn entries(&mut self) -> Result<Vec<ArchiveEntry>>;

    /// Read the full contents of the entry with this exact name.
    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>>;

    /// Human-readable location used in log lines and errors.
    fn location(&self) -> &str;
}

/// Append-only writer for an output archive.
pub trait ArchiveWriter {
    /// Store `bytes` at `path`.
    ///
    /// Writing the same path twice is a caller bug and fails with
    /// [`Error::DuplicateDestination`].
    fn write_entry(&mut self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Whether `path` has already been written.
    fn contains(&self, path: &str) -> bool;
}

/// Open a pack or nested archive: directories are read in place, anything
/// else is opened as a zip.
pub fn open_archive(path: &Utf8Path) -> Result<Box<dyn ArchiveReader>> {
    if path.as_std_path().is_dir() {
        Ok(Box::new(DirArchiveReader::new(path.to_path_buf())))
    } else {
        Ok(Box::new(ZipArchiveReader::open(path)?))
    }
}

/// Upper bound on the buffer reserved from a zip header's declared size.
const MAX_PREALLOC: u64 = 64 << 20;

/// Zip-backed [`ArchiveReader`].
///
/// Entry names are listed with `/` separators even when the archive stores
/// `\`; reads map the listed name back to the stored entry by index.
pub struct ZipArchiveReader<R: Read + Seek> {
    archive: ZipArchive<R>,
    location: String,
    by_name: HashMap<String, usize>,
}

impl ZipArchiveReader<File> {
    pub fn open(path: &Utf8Path) -> Result<Self> {
        let file = File::open(path.as_std_path())?;
        Self::new(file, path.as_str())
    }
}

impl<R: Read + Seek> ZipArchiveReader<R> {
    pub fn new(reader: R, location: impl Into<String>) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut by_name = HashMap::with_capacity(archive.len());
        for i in 0..archive.len() {
            let file = archive.by_index_raw(i)?;
            by_name.entry(file.name().replace('\\', "/")).or_insert(i);
        }
        Ok(Self {
            archive,
            location: location.into(),
            by_name,
        })
    }
}

impl<R: Read + Seek> ArchiveReader for ZipArchiveReader<R> {
    fn entries(&mut self) -> Result<Vec<ArchiveEntry>> {
        let mut entries = Vec::with_capacity(self.archive.len());
        for i in 0..self.archive.len() {
            let file = self.archive.by_index(i)?;
            entries.push(ArchiveEntry {
                name: file.name().replace('\\', "/"),
                is_dir: file.is_dir(),
                size: file.size(),
            });
        }
        Ok(entries)
    }

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let Some(&index) = self.by_name.get(&name.replace('\\', "/")) else {
            return Err(Error::EntryNotFound {
                archive: self.location.clone(),
                entry: name.to_string(),
            });
        };
        let mut file = self.archive.by_index(index)?;
        let mut bytes = Vec::with_capacity(prealloc_capacity(file.size()));
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn location(&self) -> &str {
        &self.location
    }
}

/// Buffer to reserve for an entry declaring `size` bytes. Declared sizes are
/// untrusted, so `read_to_end` grows the buffer past the cap when needed.
fn prealloc_capacity(size: u64) -> usize {
    usize::try_from(size.min(MAX_PREALLOC)).unwrap_or(0)
}

/// Directory-backed [`ArchiveReader`]; entry names are paths relative to the root.
pub struct DirArchiveReader {
    root: Utf8PathBuf,
}

impl DirArchiveReader {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }
}

impl ArchiveReader for DirArchiveReader {
    fn entries(&mut self) -> Result<Vec<ArchiveEntry>> {
        let mut entries = Vec::new();
        for entry in walkdir::WalkDir::new(self.root.as_std_path())
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| Error::Other(format!("Failed to walk directory: {}", e)))?;
            let Ok(relative) = entry.path().strip_prefix(self.root.as_std_path()) else {
                continue;
            };
            let Some(relative) = relative.to_str() else {
                tracing::warn!("Skipping non-UTF-8 path: {}", entry.path().display());
                continue;
            };
            let is_dir = entry.file_type().is_dir();
            let size = if is_dir {
                0
            } else {
                entry.metadata().map(|m| m.len()).unwrap_or(0)
            };
            entries.push(ArchiveEntry {
                name: relative.replace('\\', "/"),
                is_dir,
                size,
            });
        }
        Ok(entries)
    }

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);
        if !path.as_std_path().is_file() {
            return Err(Error::EntryNotFound {
                archive: self.root.to_string(),
                entry: name.to_string(),
            });
        }
        Ok(std::fs::read(path.as_std_path())?)
    }

    fn location(&self) -> &str {
        self.root.as_str()
    }
}

/// Zip-backed [`ArchiveWriter`] that remembers what it has written.
pub struct ZipArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    options: SimpleFileOptions,
    written: BTreeSet<String>,
}

impl ZipArchiveWriter<BufWriter<File>> {
    /// Create (truncating) a zip file at `path`.
    pub fn create(path: &Utf8Path, compression: CompressionKind) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() {
                std::fs::create_dir_all(parent.as_std_path())?;
            }
        }
        let file = File::create(path.as_std_path())?;
        Ok(Self::new(BufWriter::new(file), compression))
    }
}

impl<W: Write + Seek> ZipArchiveWriter<W> {
    pub fn new(writer: W, compression: CompressionKind) -> Self {
        let method = match compression {
            CompressionKind::Stored => CompressionMethod::Stored,
            CompressionKind::Deflated => CompressionMethod::Deflated,
        };
        Self {
            zip: ZipWriter::new(writer),
            options: SimpleFileOptions::default()
                .compression_method(method)
                .unix_permissions(0o644),
            written: BTreeSet::new(),
        }
    }

    /// Paths written so far, sorted.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.written.iter().map(String::as_str)
    }

    /// Write the central directory and return the underlying writer.
    pub fn finish(self) -> Result<W> {
        Ok(self.zip.finish()?)
    }
}

impl<W: Write + Seek> ArchiveWriter for ZipArchiveWriter<W> {
    fn write_entry(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        if !self.written.insert(path.to_string()) {
            return Err(Error::DuplicateDestination(path.to_string()));
        }
        self.zip.start_file(path, self.options)?;
        self.zip.write_all(bytes)?;
        Ok(())
    }

    fn contains(&self, path: &str) -> bool {
        self.written.contains(path)
    }
}
