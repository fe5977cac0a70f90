use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors that can occur while loading a layout document.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// The markup itself is malformed (bad attribute, mismatched tag, ...).
    #[error("malformed layout at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    /// The bytes could not be decoded as UTF-8 or BOM-marked UTF-16.
    #[error("layout is not valid UTF-8 or UTF-16 text")]
    Encoding,

    #[error("layout has no root element")]
    MissingRoot,

    #[error("layout has more than one root element (found <{0}>)")]
    MultipleRoots(String),

    #[error("element <{0}> is never closed")]
    Unclosed(String),

    #[error("text content outside the root element")]
    StrayText,
}
