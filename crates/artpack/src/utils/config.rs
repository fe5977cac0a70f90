//! Merge configuration loading.

use crate::errors::CliError;
use artpack_merge::MergeConfig;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Configuration file picked up from the working directory when no
/// `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "artpack.toml";

/// Commented starting point written by `artpack init`.
pub const CONFIG_TEMPLATE: &str = r#"# artpack merge configuration

# Ordered pack locations (zip archives or directories of nested archives)
# and one unique label per pack. Labels become output folders and layout
# identifier prefixes. Both lists must have the same length.
pack_paths = []
pack_labels = []
# pack_paths = ["packs/MrDo.zip", "packs/Orny.zip"]
# pack_labels = ["MrDo", "Orny"]

# One merged archive per catalog entry is written here.
output_dir = "merged"

# Extraction scratch space (defaults to the system temp directory).
# scratch_dir = "scratch"

# Stop after this many catalog entries (0 = unlimited).
max_entries = 0

# Replace existing output archives instead of skipping them.
overwrite = false

# Remove each entry's scratch directory when it finishes.
cleanup_scratch = true

# Root-level layout entry inside every nested archive.
layout_file = "default.lay"

# Extension of the nested per-entry archives inside a pack.
nested_extension = "zip"

# Store byte-identical assets once. digest = "sha1" | "sha256"
dedup = true
digest = "sha1"

# compression = "deflated" | "stored"
compression = "deflated"

# Attribute and text values ending in one of these are asset references.
asset_extensions = ["png", "jpg", "jpeg", "bmp", "gif", "svg", "wav", "mp3", "ogg", "flac", "ttf", "otf"]

# Append-only log files: everything from INFO up, and errors only.
run_log = "artpack.log"
error_log = "artpack-errors.log"
"#;

/// Load the merge configuration.
///
/// An explicit `path` must exist. Without one, `artpack.toml` in the working
/// directory is used if present, and built-in defaults otherwise.
pub fn load_config(path: Option<&Utf8Path>) -> Result<MergeConfig, CliError> {
    let path = match path {
        Some(path) => {
            if !path.as_std_path().is_file() {
                return Err(CliError::config_not_found(path.to_path_buf()));
            }
            path.to_path_buf()
        }
        None => {
            let default = Utf8PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.as_std_path().is_file() {
                tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                return Ok(MergeConfig::default());
            }
            default
        }
    };

    let source = fs::read_to_string(path.as_std_path())?;
    parse_config(&source, &path)
}

/// Parse TOML text into a [`MergeConfig`], reporting errors against `path`.
pub fn parse_config(source: &str, path: &Utf8Path) -> Result<MergeConfig, CliError> {
    toml::from_str(source)
        .map_err(|e| CliError::config_parse_error(path.to_path_buf(), source.to_string(), &e))
}

/// Write [`CONFIG_TEMPLATE`] to `path`, refusing to replace a file unless `force`.
pub fn write_template(path: &Utf8Path, force: bool) -> Result<(), CliError> {
    if path.as_std_path().exists() && !force {
        return Err(CliError::ConfigExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent() {
        if !parent.as_str().is_empty() {
            fs::create_dir_all(parent.as_std_path())?;
        }
    }
    fs::write(path.as_std_path(), CONFIG_TEMPLATE)?;
    Ok(())
}
