//! Attributed tree model for artwork layout documents.
//!
//! A layout document (conventionally `default.lay`) is a small XML dialect that
//! describes where artwork images sit around an emulated screen. This crate does
//! not know anything about that dialect's semantics; it only provides the tree:
//!
//! - **Parsing** from raw bytes, tolerating UTF-8 and UTF-16 byte-order marks
//! - **Lookup** of nodes by tag name anywhere in the tree
//! - **Attribute access** by name, for reading and rewriting
//! - **Import** of a node (with its full subtree) from one document into another
//! - **Deterministic serialization** back to text
//!
//! # Example
//!
//! ```
//! use artpack_layout::LayoutDocument;
//!
//! # fn main() -> Result<(), artpack_layout::LayoutError> {
//! let doc = LayoutDocument::parse(
//!     r#"<mamelayout version="2">
//!          <element name="bezel"><image file="bezel.png"/></element>
//!        </mamelayout>"#,
//! )?;
//!
//! let images = doc.find_all("image");
//! assert_eq!(images[0].attr("file"), Some("bezel.png"));
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod node;

pub use document::{collapse_whitespace, LayoutDocument};
pub use error::{LayoutError, Result};
pub use node::{Child, Node};
