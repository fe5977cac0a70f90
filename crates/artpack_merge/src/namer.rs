//! Collision-avoiding names for files and layout identifiers.
//!
//! Every asset lands at `<pack-label>/<relative-path>` in the output archive.
//! Labels are unique per configuration, so two packs can never write the same
//! destination. Layout identifiers get the same treatment: element and group
//! names are prefixed with a sanitized form of the label, and view names with a
//! readable one.

/// Separator between the sanitized pack label and an element/group name.
pub const IDENTIFIER_SEPARATOR: &str = "__";

/// Sanitized identifier prefix for a pack label, e.g. `"Mr Do"` -> `"Mr_Do__"`.
///
/// Only ASCII alphanumerics and `_` survive; everything else becomes `_`.
pub fn identifier_prefix(label: &str) -> String {
    let sanitized: String = label
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("{}{}", sanitized, IDENTIFIER_SEPARATOR)
}

/// Readable view-name prefix for a pack label, e.g. `"Mr Do"` -> `"Mr Do: "`.
pub fn view_prefix(label: &str) -> String {
    format!("{}: ", label.trim())
}

/// Normalize an entry name from a nested archive into a clean relative path.
///
/// Backslashes become `/`, and empty, `.` and `..` components are dropped so
/// the result can never climb out of the pack's folder.
pub fn normalize_entry_path(name: &str) -> String {
    name.replace('\\', "/")
        .split('/')
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .collect::<Vec<_>>()
        .join("/")
}

/// Per-pack naming policy.
#[derive(Debug, Clone)]
pub struct PackNamer {
    label: String,
    identifier_prefix: String,
    view_prefix: String,
}

impl PackNamer {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.trim().to_string(),
            identifier_prefix: identifier_prefix(label),
            view_prefix: view_prefix(label),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// New name for an element or group definition.
    pub fn identifier(&self, name: &str) -> String {
        format!("{}{}", self.identifier_prefix, name)
    }

    /// New name for a view definition.
    pub fn view(&self, name: &str) -> String {
        format!("{}{}", self.view_prefix, name)
    }

    /// Destination path of an asset inside the output archive.
    pub fn destination(&self, entry_name: &str) -> String {
        format!("{}/{}", self.label, normalize_entry_path(entry_name))
    }
}
