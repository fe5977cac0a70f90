//! Run configuration.
//!
//! A [`MergeConfig`] is an explicit input to the orchestrator; nothing in this
//! crate reads environment variables or well-known paths on its own. The CLI
//! deserializes it from TOML and layers command-line overrides on top.

use crate::error::{Error, Result};
use crate::index::Pack;
use crate::namer::identifier_prefix;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Default name of the one root-level layout entry in every nested archive.
pub const DEFAULT_LAYOUT_FILE: &str = "default.lay";

/// Digest used to decide whether two assets carry identical bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestKind {
    /// 160-bit SHA-1. Fast, and sufficient for content identity.
    #[default]
    Sha1,
    /// 256-bit SHA-256.
    Sha256,
}

/// Compression applied to every entry written into an output archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionKind {
    Stored,
    #[default]
    Deflated,
}

/// Everything a merge run needs, validated once at startup.
///
/// # TOML format
///
/// ```toml
/// pack_paths = ["packs/MrDo.zip", "packs/Orny.zip"]
/// pack_labels = ["MrDo", "Orny"]
/// output_dir = "merged"
/// max_entries = 0
/// dedup = true
/// digest = "sha1"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Ordered pack locations (zip archives or directories of nested archives).
    pub pack_paths: Vec<Utf8PathBuf>,
    /// One label per pack, used as the output folder and identifier prefix.
    pub pack_labels: Vec<String>,
    /// Directory receiving one output archive per catalog entry.
    pub output_dir: Utf8PathBuf,
    /// Parent directory for per-entry extraction scratch space.
    /// Falls back to the system temp directory when unset.
    pub scratch_dir: Option<Utf8PathBuf>,
    /// Stop after this many catalog entries (`0` = unlimited).
    pub max_entries: usize,
    /// Replace output archives that already exist instead of skipping them.
    pub overwrite: bool,
    /// Remove each entry's scratch directory when the entry finishes.
    pub cleanup_scratch: bool,
    /// Name of the root-level layout entry, matched case-insensitively.
    pub layout_file: String,
    /// Extension (without the dot) identifying nested per-entry archives.
    pub nested_extension: String,
    /// Store byte-identical assets only once.
    pub dedup: bool,
    pub digest: DigestKind,
    pub compression: CompressionKind,
    /// Extensions (without the dot) whose values count as asset references.
    pub asset_extensions: Vec<String>,
    /// Informational run log, appended to.
    pub run_log: Option<Utf8PathBuf>,
    /// Errors-only log, appended to.
    pub error_log: Option<Utf8PathBuf>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            pack_paths: Vec::new(),
            pack_labels: Vec::new(),
            output_dir: Utf8PathBuf::from("merged"),
            scratch_dir: None,
            max_entries: 0,
            overwrite: false,
            cleanup_scratch: true,
            layout_file: DEFAULT_LAYOUT_FILE.to_string(),
            nested_extension: "zip".to_string(),
            dedup: true,
            digest: DigestKind::default(),
            compression: CompressionKind::default(),
            asset_extensions: default_asset_extensions(),
            run_log: None,
            error_log: None,
        }
    }
}

/// Image, audio and font families recognised as asset references.
pub fn default_asset_extensions() -> Vec<String> {
    [
        "png", "jpg", "jpeg", "bmp", "gif", "svg", "wav", "mp3", "ogg", "flac", "ttf", "otf",
    ]
    .iter()
    .map(|ext| ext.to_string())
    .collect()
}

impl MergeConfig {
    /// Check every fatal configuration condition.
    ///
    /// Must pass before any pack is opened; a failure here aborts the run.
    pub fn validate(&self) -> Result<()> {
        if self.pack_paths.len() != self.pack_labels.len() {
            return Err(Error::PackLabelMismatch {
                packs: self.pack_paths.len(),
                labels: self.pack_labels.len(),
            });
        }
        if self.pack_paths.is_empty() {
            return Err(Error::InvalidConfig("no packs configured".to_string()));
        }

        for (idx, label) in self.pack_labels.iter().enumerate() {
            if label.trim().is_empty() {
                return Err(Error::EmptyLabel(idx));
            }
            if label.contains(['/', '\\']) {
                return Err(Error::InvalidConfig(format!(
                    "pack label '{}' must not contain path separators",
                    label
                )));
            }
        }

        for (idx, label) in self.pack_labels.iter().enumerate() {
            for other in &self.pack_labels[idx + 1..] {
                if label.eq_ignore_ascii_case(other)
                    || identifier_prefix(label) == identifier_prefix(other)
                {
                    return Err(Error::DuplicateLabel {
                        first: label.clone(),
                        second: other.clone(),
                    });
                }
            }
        }

        for path in &self.pack_paths {
            if !path.as_std_path().exists() {
                return Err(Error::PackNotFound(path.clone()));
            }
        }

        if self.layout_file.trim().is_empty() || self.layout_file.contains(['/', '\\']) {
            return Err(Error::InvalidConfig(format!(
                "layout file name '{}' must be a bare file name",
                self.layout_file
            )));
        }
        if self.nested_extension.trim_start_matches('.').is_empty() {
            return Err(Error::InvalidConfig(
                "nested archive extension is empty".to_string(),
            ));
        }

        Ok(())
    }

    /// The configured packs, in configuration order.
    pub fn packs(&self) -> Vec<Pack> {
        self.pack_paths
            .iter()
            .zip(&self.pack_labels)
            .enumerate()
            .map(|(index, (location, label))| Pack {
                index,
                label: label.clone(),
                location: location.clone(),
            })
            .collect()
    }

    /// Nested archive extension as a lowercase suffix including the dot.
    pub fn nested_suffix(&self) -> String {
        format!(
            ".{}",
            self.nested_extension.trim_start_matches('.').to_ascii_lowercase()
        )
    }

    pub fn scratch_root(&self) -> Utf8PathBuf {
        match &self.scratch_dir {
            Some(dir) => dir.clone(),
            None => Utf8PathBuf::from_path_buf(std::env::temp_dir())
                .unwrap_or_else(|_| Utf8PathBuf::from(".")),
        }
    }
}
