//! Multi-pack artwork merge engine.
//!
//! Given several packs, each holding one nested archive per catalog entry, this
//! crate produces one consolidated archive per entry:
//!
//! - **Indexing**: every pack is listed once and nested archives are grouped by
//!   base name into catalog entries ([`PackIndex`]).
//! - **Deduplication**: identical assets are stored once, at the path of the
//!   pack that introduced them first ([`ContentStore`]).
//! - **Layout merging**: each pack's layout is prefixed, has its asset
//!   references rewritten, and is imported into one merged layout
//!   ([`ReferenceRewriter`]).
//! - **Verification**: every asset reference in the written layout is checked
//!   against the output archive ([`ReferenceVerifier`]).
//!
//! # Example
//!
//! ```no_run
//! use artpack_merge::{ContentStore, MergeConfig, MergeOrchestrator};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MergeConfig {
//!     pack_paths: vec!["packs/MrDo.zip".into(), "packs/Orny.zip".into()],
//!     pack_labels: vec!["MrDo".to_string(), "Orny".to_string()],
//!     ..MergeConfig::default()
//! };
//!
//! let store = ContentStore::from_config(&config);
//! let summary = MergeOrchestrator::new(&config, &store)?
//!     .with_progress(|progress| {
//!         println!("{:?} {}/{}", progress.stage, progress.current, progress.total);
//!     })
//!     .run()?;
//!
//! println!(
//!     "processed={} skipped={} failed={}",
//!     summary.processed, summary.skipped, summary.failed
//! );
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod index;
pub mod merge;
pub mod namer;
pub mod refs;
pub mod rewrite;
pub mod store;
pub mod verify;

// Re-export main types
pub use archive::{open_archive, ArchiveEntry, ArchiveReader, ArchiveWriter};
pub use config::{CompressionKind, DigestKind, MergeConfig};
pub use error::{Error, Result};
pub use index::{CatalogEntry, Pack, PackContribution, PackIndex};
pub use merge::{
    EntryOutcome, EntryState, EntryStatus, MergeOrchestrator, MergeProgress, MergeStage,
    RunSummary, SkipReason,
};
pub use namer::PackNamer;
pub use refs::{FileReferenceMap, VariantKeys};
pub use rewrite::{AssetPredicate, ReferenceRewriter};
pub use store::{ContentHash, ContentStore};
pub use verify::{ReferenceVerifier, Repair, VerificationReport};
