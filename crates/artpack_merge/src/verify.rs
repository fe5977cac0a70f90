//! Post-merge reference verification.
//!
//! The verifier re-reads a finished output archive, parses its merged layout and
//! checks that every asset-looking value resolves to an entry in the archive.
//! Misses get a leaf-name repair attempt. Repairs are reported, never written
//! back: the archive is already final when verification runs.

use crate::archive::{open_archive, ArchiveReader};
use crate::config::MergeConfig;
use crate::error::{Error, Result};
use crate::refs::file_name;
use crate::rewrite::AssetPredicate;
use artpack_layout::{LayoutDocument, Node};
use camino::Utf8Path;
use serde::Serialize;
use std::collections::HashSet;

/// An unresolved reference for which a same-named entry exists elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repair {
    /// Reference as written in the layout.
    pub reference: String,
    /// Archive entry whose file name matches the reference's file name.
    pub candidate: String,
}

/// Findings from verifying one output archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub archive: String,
    /// Asset references found in the layout.
    pub checked: usize,
    /// References that matched an archive entry directly.
    pub resolved: usize,
    pub repaired: Vec<Repair>,
    /// References with no matching entry at all.
    pub missing: Vec<String>,
}

impl VerificationReport {
    /// Repaired plus missing references.
    pub fn findings(&self) -> usize {
        self.repaired.len() + self.missing.len()
    }

    pub fn is_clean(&self) -> bool {
        self.findings() == 0
    }
}

/// Checks merged layouts against the entries of their output archive.
#[derive(Debug, Clone)]
pub struct ReferenceVerifier {
    predicate: AssetPredicate,
    layout_file: String,
}

impl ReferenceVerifier {
    pub fn new(predicate: AssetPredicate, layout_file: impl Into<String>) -> Self {
        Self {
            predicate,
            layout_file: layout_file.into(),
        }
    }

    pub fn from_config(config: &MergeConfig) -> Result<Self> {
        Ok(Self::new(
            AssetPredicate::from_extensions(&config.asset_extensions)?,
            config.layout_file.clone(),
        ))
    }

    /// Open the archive at `path` and verify it.
    pub fn verify_path(&self, path: &Utf8Path) -> Result<VerificationReport> {
        let mut reader = open_archive(path)?;
        self.verify(reader.as_mut())
    }

    /// Verify an already opened archive.
    pub fn verify(&self, reader: &mut dyn ArchiveReader) -> Result<VerificationReport> {
        let listing = reader.entries()?;
        let layout_name = listing
            .iter()
            .find(|e| !e.is_dir && e.name.eq_ignore_ascii_case(&self.layout_file))
            .map(|e| e.name.clone())
            .ok_or_else(|| Error::EntryNotFound {
                archive: reader.location().to_string(),
                entry: self.layout_file.clone(),
            })?;

        let doc = LayoutDocument::from_bytes(&reader.read_entry(&layout_name)?)?;
        let names: Vec<String> = listing
            .into_iter()
            .filter(|e| !e.is_dir && e.name != layout_name)
            .map(|e| e.name)
            .collect();

        let mut report = self.verify_document(&doc, &names);
        report.archive = reader.location().to_string();
        Ok(report)
    }

    /// Check every asset reference in `doc` against `entry_names`.
    pub fn verify_document(&self, doc: &LayoutDocument, entry_names: &[String]) -> VerificationReport {
        let present: HashSet<&str> = entry_names.iter().map(String::as_str).collect();
        let mut sorted: Vec<&str> = present.iter().copied().collect();
        sorted.sort_unstable();

        let mut report = VerificationReport::default();
        for reference in self.collect_references(doc.root()) {
            report.checked += 1;
            if present.contains(normalize_reference(&reference).as_str()) {
                report.resolved += 1;
                continue;
            }

            match repair_candidate(&reference, &sorted) {
                Some(candidate) => {
                    tracing::error!(
                        "Unresolved reference '{}' repairable by file name -> '{}'",
                        reference,
                        candidate
                    );
                    report.repaired.push(Repair {
                        reference,
                        candidate: candidate.to_string(),
                    });
                }
                None => {
                    tracing::error!("Missing reference '{}'", reference);
                    report.missing.push(reference);
                }
            }
        }

        tracing::debug!(
            "Verified {} reference(s): {} resolved, {} repairable, {} missing",
            report.checked,
            report.resolved,
            report.repaired.len(),
            report.missing.len()
        );
        report
    }

    /// Attribute and text values that look like assets, in document order.
    fn collect_references(&self, root: &Node) -> Vec<String> {
        let mut found = Vec::new();
        root.visit(&mut |node: &Node| {
            for (_, value) in node.attributes() {
                if self.predicate.matches(value) {
                    found.push(value.trim().to_string());
                }
            }
            for text in node.texts() {
                if self.predicate.matches(text) {
                    found.push(text.trim().to_string());
                }
            }
        });
        found
    }
}

/// Archive-style spelling of a reference: forward slashes, no `./` prefix.
fn normalize_reference(reference: &str) -> String {
    let mut normalized = reference.trim().replace('\\', "/");
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    normalized
}

/// First entry (in sorted order) with the same file name, ignoring case.
fn repair_candidate<'a>(reference: &str, sorted_names: &[&'a str]) -> Option<&'a str> {
    let leaf = file_name(reference)?;
    sorted_names
        .iter()
        .copied()
        .find(|name| file_name(name).is_some_and(|n| n.eq_ignore_ascii_case(leaf)))
}
