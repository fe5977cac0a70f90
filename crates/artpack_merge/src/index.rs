//! Pack indexing.
//!
//! The [`PackIndex`] is built once per run by listing every configured pack. Each
//! entry whose name ends in the nested-archive suffix (`.zip` by default) is a
//! contribution to the catalog entry named by its base file name:
//!
//! ```text
//! MrDo.zip                    Orny.zip
//!   mario.zip   ─┐              mario.zip  ─┐
//!   dkong.zip    │              pacman.zip  │
//!                ▼                          ▼
//!   mario  -> [MrDo:mario.zip, Orny:mario.zip]
//!   dkong  -> [MrDo:dkong.zip]
//!   pacman -> [Orny:pacman.zip]
//! ```
//!
//! Identifiers are case-insensitive. The final entry order is a stable,
//! case-insensitive lexical sort so runs are reproducible.

use crate::archive::{open_archive, ArchiveReader};
use crate::error::Result;
use camino::Utf8PathBuf;
use serde::Serialize;
use std::collections::HashMap;

/// A configured pack: an archive (or directory) of nested per-entry archives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pack {
    /// Position in the configuration; also the processing order.
    pub index: usize,
    /// Unique label, used as the output folder and identifier prefix.
    pub label: String,
    pub location: Utf8PathBuf,
}

/// One pack's nested archive for a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackContribution {
    /// Index of the contributing [`Pack`].
    pub pack: usize,
    /// Full entry name of the nested archive inside the pack.
    pub entry_name: String,
}

/// A catalog entry and every pack that contributes to it, in pack order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Identifier as first spelled by the earliest contributing pack.
    pub id: String,
    pub contributions: Vec<PackContribution>,
}

/// Catalog entry -> contributions index over all packs.
#[derive(Debug, Default, Clone, Serialize)]
pub struct PackIndex {
    entries: Vec<CatalogEntry>,
    warnings: Vec<String>,
}

impl PackIndex {
    /// List every pack from disk and build the index.
    pub fn build(packs: &[Pack], nested_suffix: &str) -> Result<Self> {
        Self::build_with(packs, nested_suffix, |pack| open_archive(&pack.location))
    }

    /// Build the index using a custom opener for each pack.
    pub fn build_with<F>(packs: &[Pack], nested_suffix: &str, mut open: F) -> Result<Self>
    where
        F: FnMut(&Pack) -> Result<Box<dyn ArchiveReader>>,
    {
        let suffix = nested_suffix.to_ascii_lowercase();
        let mut by_key: HashMap<String, CatalogEntry> = HashMap::new();
        let mut warnings = Vec::new();

        for pack in packs {
            let mut reader = open(pack)?;
            let mut found = 0usize;

            for entry in reader.entries()? {
                if entry.is_dir {
                    continue;
                }
                let Some(id) = catalog_id(&entry.name, &suffix) else {
                    continue;
                };

                let catalog = by_key
                    .entry(id.to_lowercase())
                    .or_insert_with(|| CatalogEntry {
                        id: id.to_string(),
                        contributions: Vec::new(),
                    });

                if let Some(existing) = catalog.contributions.iter().find(|c| c.pack == pack.index) {
                    let warning = format!(
                        "Pack '{}' contains '{}' more than once; keeping '{}', ignoring '{}'",
                        pack.label, id, existing.entry_name, entry.name
                    );
                    tracing::warn!("{}", warning);
                    warnings.push(warning);
                    continue;
                }

                catalog.contributions.push(PackContribution {
                    pack: pack.index,
                    entry_name: entry.name,
                });
                found += 1;
            }

            tracing::info!(
                "Indexed pack label={} location={} nested_archives={}",
                pack.label,
                reader.location(),
                found
            );
        }

        let mut entries: Vec<CatalogEntry> = by_key.into_values().collect();
        entries.sort_by(|a, b| {
            a.id.to_lowercase()
                .cmp(&b.id.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });

        tracing::info!("Pack index built: {} catalog entries", entries.len());
        Ok(Self { entries, warnings })
    }

    /// Catalog entries in processing order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Look up an entry by identifier (case-insensitive).
    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id.eq_ignore_ascii_case(id))
    }

    /// Non-fatal findings such as duplicate nested archives within one pack.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Base name of a nested archive entry, or `None` if it isn't one.
fn catalog_id<'a>(entry_name: &'a str, lowercase_suffix: &str) -> Option<&'a str> {
    let file_name = entry_name.rsplit(['/', '\\']).next()?;
    if file_name.len() <= lowercase_suffix.len()
        || !file_name.to_ascii_lowercase().ends_with(lowercase_suffix)
    {
        return None;
    }
    Some(&file_name[..file_name.len() - lowercase_suffix.len()])
}
