//! Error types for merge operations.
//!
//! All fallible functions in this crate return [`Result<T>`], which uses [`Error`]
//! as the error type. External error types (`std::io::Error`, zip and layout
//! errors) are automatically converted via `From` impls.
//!
//! The configuration variants are fatal and are raised before any catalog entry
//! is touched. Everything else is scoped to a single entry by the orchestrator.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during pack indexing, merging or verification.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed (reading packs, writing output, scratch space).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from the `zip` crate while reading or writing an archive.
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A layout document could not be parsed.
    #[error("Layout error: {0}")]
    Layout(#[from] artpack_layout::LayoutError),

    /// Pack locations and pack labels were configured with different lengths.
    #[error("Configured {packs} pack(s) but {labels} label(s)")]
    PackLabelMismatch { packs: usize, labels: usize },

    /// A configured pack location does not exist.
    #[error("Pack not found: {0}")]
    PackNotFound(Utf8PathBuf),

    /// A pack label is empty or only whitespace.
    #[error("Pack #{0} has an empty label")]
    EmptyLabel(usize),

    /// Two labels would produce the same output folder or identifier prefix.
    #[error("Pack labels '{first}' and '{second}' collide")]
    DuplicateLabel { first: String, second: String },

    /// Any other invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An output archive was asked to store the same path twice.
    #[error("Duplicate destination in output archive: {0}")]
    DuplicateDestination(String),

    /// A named entry is not present in an archive.
    #[error("Entry '{entry}' not found in {archive}")]
    EntryNotFound { archive: String, entry: String },

    /// Catch-all for errors without a dedicated variant.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error is a configuration problem that must abort the run.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::PackLabelMismatch { .. }
                | Error::PackNotFound(_)
                | Error::EmptyLabel(_)
                | Error::DuplicateLabel { .. }
                | Error::InvalidConfig(_)
        )
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
