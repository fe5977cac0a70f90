//! Merge orchestration.
//!
//! The [`MergeOrchestrator`] drives a full run:
//!
//! 1. Validate the [`MergeConfig`]; configuration errors abort before any pack
//!    is opened for merging.
//! 2. Build a [`PackIndex`] over all packs.
//! 3. For each catalog entry in index order (up to `max_entries`):
//!    - Skip it if its output exists and `overwrite` is off.
//!    - For each contribution, in pack order: extract the nested archive to a
//!      per-entry scratch directory, parse its layout, copy every other file
//!      through the [`ContentStore`], rewrite the layout and import its
//!      elements, groups and views into the merged document.
//!    - Write the merged layout, move the finished archive into place and run
//!      the [`ReferenceVerifier`] over it.
//! 4. Return a [`RunSummary`].
//!
//! Any failure inside one entry is logged with the entry identifier and the
//! state it happened in; the run continues with the next entry. Archives are
//! assembled under a temporary name, so a failed entry never leaves a
//! half-written output behind.

use crate::archive::{
    open_archive, ArchiveEntry, ArchiveReader, ArchiveWriter, ZipArchiveReader, ZipArchiveWriter,
};
use crate::config::MergeConfig;
use crate::error::{Error, Result};
use crate::index::{CatalogEntry, Pack, PackContribution, PackIndex};
use crate::namer::{normalize_entry_path, PackNamer};
use crate::refs::FileReferenceMap;
use crate::rewrite::{AssetPredicate, ReferenceRewriter, DEFINITION_TAGS, VIEW_TAG};
use crate::store::{ContentHash, ContentStore};
use crate::verify::{ReferenceVerifier, VerificationReport};
use artpack_layout::{collapse_whitespace, LayoutDocument, Node};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};
use xxhash_rust::xxh3::xxh3_64;

/// Extension of every output archive.
pub const OUTPUT_EXTENSION: &str = "zip";

const PARTIAL_SUFFIX: &str = ".partial";
const DEFAULT_ROOT_TAG: &str = "mamelayout";
const DEFAULT_ROOT_VERSION: &str = "2";

/// Where processing of one catalog entry currently is.
///
/// `Init -> ExtractContribution(i) -> ParseLayout -> CopyAssets -> RewriteLayout
/// -> MergeIntoOutput -> (next contribution) -> WriteMergedLayout -> Verify -> Done`.
/// A failure records the state it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Init,
    /// Extracting the contribution of the pack with this index.
    ExtractContribution(usize),
    ParseLayout,
    CopyAssets,
    RewriteLayout,
    MergeIntoOutput,
    WriteMergedLayout,
    Verify,
    Done,
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryState::Init => f.write_str("init"),
            EntryState::ExtractContribution(pack) => write!(f, "extract-contribution({})", pack),
            EntryState::ParseLayout => f.write_str("parse-layout"),
            EntryState::CopyAssets => f.write_str("copy-assets"),
            EntryState::RewriteLayout => f.write_str("rewrite-layout"),
            EntryState::MergeIntoOutput => f.write_str("merge-into-output"),
            EntryState::WriteMergedLayout => f.write_str("write-merged-layout"),
            EntryState::Verify => f.write_str("verify"),
            EntryState::Done => f.write_str("done"),
        }
    }
}

/// Why an entry was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The output archive exists and overwriting is disabled.
    OutputExists,
    /// The processing cap was reached first.
    Capped,
}

/// Final status of one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    Merged,
    Skipped(SkipReason),
    Failed { state: EntryState, error: String },
}

/// What happened to one catalog entry.
#[derive(Debug, Clone)]
pub struct EntryOutcome {
    pub id: String,
    pub status: EntryStatus,
    pub output: Utf8PathBuf,
    /// Number of packs contributing to this entry.
    pub contributions: usize,
    /// Asset files physically written to the output archive.
    pub assets_written: usize,
    /// Asset files redirected to an identical copy instead of being written.
    pub assets_deduplicated: usize,
    /// Views dropped as duplicates of an already imported view.
    pub views_skipped: usize,
    pub verification: Option<VerificationReport>,
}

impl EntryOutcome {
    fn new(entry: &CatalogEntry, output: Utf8PathBuf) -> Self {
        Self {
            id: entry.id.clone(),
            status: EntryStatus::Merged,
            output,
            contributions: entry.contributions.len(),
            assets_written: 0,
            assets_deduplicated: 0,
            views_skipped: 0,
            verification: None,
        }
    }
}

/// Aggregate result of a run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Entries merged successfully.
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outcomes: Vec<EntryOutcome>,
    pub elapsed: Duration,
}

impl RunSummary {
    fn record(&mut self, outcome: EntryOutcome) {
        match outcome.status {
            EntryStatus::Merged => self.processed += 1,
            EntryStatus::Skipped(_) => self.skipped += 1,
            EntryStatus::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Verification findings over all merged entries.
    pub fn findings(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.verification.as_ref())
            .map(VerificationReport::findings)
            .sum()
    }
}

/// Progress information emitted during a run.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeProgress {
    pub stage: MergeStage,
    /// Catalog entry being merged (set during `Merging`).
    pub current_entry: Option<String>,
    /// 1-based position of the current entry.
    pub current: u32,
    pub total: u32,
}

/// Stages of a run, emitted in order: `Indexing` -> `Merging` (repeated) -> `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MergeStage {
    Indexing,
    Merging,
    Complete,
}

type ProgressCallback = Arc<dyn Fn(MergeProgress) + Send + Sync>;

/// Runs the per-entry merge pipeline over every catalog entry.
///
/// The [`ContentStore`] is injected so one store can outlive a single
/// orchestrator, and so tests can start from a fresh one.
pub struct MergeOrchestrator<'a> {
    config: &'a MergeConfig,
    store: &'a ContentStore,
    rewriter: ReferenceRewriter,
    verifier: ReferenceVerifier,
    progress_callback: Option<ProgressCallback>,
}

impl<'a> MergeOrchestrator<'a> {
    /// Create an orchestrator using the asset extensions from `config`.
    pub fn new(config: &'a MergeConfig, store: &'a ContentStore) -> Result<Self> {
        let predicate = AssetPredicate::from_extensions(&config.asset_extensions)?;
        Ok(Self::with_predicate(config, store, predicate))
    }

    /// Create an orchestrator with a custom asset predicate.
    pub fn with_predicate(
        config: &'a MergeConfig,
        store: &'a ContentStore,
        predicate: AssetPredicate,
    ) -> Self {
        Self {
            config,
            store,
            rewriter: ReferenceRewriter::new(predicate.clone()),
            verifier: ReferenceVerifier::new(predicate, config.layout_file.clone()),
            progress_callback: None,
        }
    }

    /// Register a progress callback.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(MergeProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Validate the configuration, index all packs and merge every entry.
    pub fn run(&self) -> Result<RunSummary> {
        self.config.validate()?;
        let packs = self.config.packs();

        self.emit_progress(MergeStage::Indexing, None, 0, 0);
        let index = PackIndex::build(&packs, &self.config.nested_suffix())?;
        self.run_index(&packs, &index)
    }

    /// Merge every entry of an existing index.
    pub fn run_index(&self, packs: &[Pack], index: &PackIndex) -> Result<RunSummary> {
        let start = Instant::now();
        tracing::info!("Merging {} catalog entries from {} pack(s)", index.len(), packs.len());
        tracing::info!("Output dir: {}", self.config.output_dir);

        let mut readers = packs
            .iter()
            .map(|pack| open_archive(&pack.location))
            .collect::<Result<Vec<_>>>()?;
        std::fs::create_dir_all(self.config.output_dir.as_std_path())?;

        let total = index.len() as u32;
        let mut summary = RunSummary::default();
        for (position, entry) in index.entries().iter().enumerate() {
            if self.config.max_entries > 0 && position >= self.config.max_entries {
                if position == self.config.max_entries {
                    tracing::info!(
                        "Processing cap of {} reached; skipping remaining entries",
                        self.config.max_entries
                    );
                }
                let mut outcome = EntryOutcome::new(entry, self.output_path(&entry.id));
                outcome.status = EntryStatus::Skipped(SkipReason::Capped);
                summary.record(outcome);
                continue;
            }

            self.emit_progress(
                MergeStage::Merging,
                Some(entry.id.clone()),
                position as u32 + 1,
                total,
            );
            summary.record(self.merge_entry(entry, packs, &mut readers));
        }

        summary.elapsed = start.elapsed();
        self.emit_progress(MergeStage::Complete, None, total, total);
        tracing::info!(
            "Run complete: processed={} skipped={} failed={} in {:.2?}",
            summary.processed,
            summary.skipped,
            summary.failed,
            summary.elapsed
        );
        Ok(summary)
    }

    /// Merge one catalog entry. Never fails: errors end up in the outcome.
    ///
    /// `readers` holds one open reader per pack, indexed like `packs`.
    pub fn merge_entry(
        &self,
        entry: &CatalogEntry,
        packs: &[Pack],
        readers: &mut [Box<dyn ArchiveReader>],
    ) -> EntryOutcome {
        let span = tracing::info_span!("entry", id = %entry.id);
        let _guard = span.enter();

        let output = self.output_path(&entry.id);
        let mut outcome = EntryOutcome::new(entry, output.clone());

        if output.as_std_path().exists() && !self.config.overwrite {
            tracing::info!("Output {} exists, skipping", output);
            outcome.status = EntryStatus::Skipped(SkipReason::OutputExists);
            return outcome;
        }

        let mut state = EntryState::Init;
        match self.try_merge_entry(entry, packs, readers, &output, &mut state, &mut outcome) {
            Ok(()) => {
                tracing::info!(
                    "Merged contributions={} written={} deduplicated={} findings={}",
                    outcome.contributions,
                    outcome.assets_written,
                    outcome.assets_deduplicated,
                    outcome.verification.as_ref().map_or(0, |r| r.findings())
                );
            }
            Err(e) => {
                tracing::error!(entry = %entry.id, state = %state, "Entry failed: {}", e);
                outcome.status = EntryStatus::Failed {
                    state,
                    error: e.to_string(),
                };
            }
        }
        outcome
    }

    fn try_merge_entry(
        &self,
        entry: &CatalogEntry,
        packs: &[Pack],
        readers: &mut [Box<dyn ArchiveReader>],
        output: &Utf8Path,
        state: &mut EntryState,
        outcome: &mut EntryOutcome,
    ) -> Result<()> {
        let scratch = ScratchDir::create(
            &self.config.scratch_root(),
            &entry.id,
            self.config.cleanup_scratch,
        )?;
        let partial = Utf8PathBuf::from(format!("{}{}", output, PARTIAL_SUFFIX));

        let assembled = self.assemble(entry, packs, readers, &scratch, &partial, state, outcome);
        if let Err(e) = assembled {
            if partial.as_std_path().exists() {
                if let Err(remove) = std::fs::remove_file(partial.as_std_path()) {
                    tracing::warn!("Failed to remove partial output {}: {}", partial, remove);
                }
            }
            return Err(e);
        }

        if output.as_std_path().exists() {
            std::fs::remove_file(output.as_std_path())?;
        }
        std::fs::rename(partial.as_std_path(), output.as_std_path())?;

        *state = EntryState::Verify;
        outcome.verification = Some(self.verifier.verify_path(output)?);

        *state = EntryState::Done;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        entry: &CatalogEntry,
        packs: &[Pack],
        readers: &mut [Box<dyn ArchiveReader>],
        scratch: &ScratchDir,
        partial: &Utf8Path,
        state: &mut EntryState,
        outcome: &mut EntryOutcome,
    ) -> Result<()> {
        let writer = ZipArchiveWriter::create(partial, self.config.compression)?;
        let mut merge = EntryMerge::new(writer, self.store.is_enabled());

        for contribution in &entry.contributions {
            let pack = packs.get(contribution.pack).ok_or_else(|| {
                Error::Other(format!("Unknown pack index {}", contribution.pack))
            })?;
            let reader = readers.get_mut(contribution.pack).ok_or_else(|| {
                Error::Other(format!("No reader for pack '{}'", pack.label))
            })?;

            *state = EntryState::ExtractContribution(pack.index);
            let (mut nested, listing) =
                match self.extract_contribution(reader.as_mut(), pack, contribution, scratch) {
                    Ok(extracted) => extracted,
                    Err(e) => {
                        tracing::warn!(
                            pack = %pack.label,
                            "Skipping unreadable nested archive '{}': {}",
                            contribution.entry_name,
                            e
                        );
                        continue;
                    }
                };

            *state = EntryState::ParseLayout;
            let layout = self.read_layout(&mut nested, &listing, pack);

            *state = EntryState::CopyAssets;
            let namer = PackNamer::new(&pack.label);
            self.copy_assets(&mut merge, &mut nested, &listing, &namer)?;

            let Some(mut doc) = layout else {
                continue;
            };

            *state = EntryState::RewriteLayout;
            let stats = self.rewriter.rewrite(&mut doc, &namer, &merge.refs);
            tracing::debug!(
                pack = %pack.label,
                "Rewrote identifiers={} identifier_refs={} views={} files={}",
                stats.identifiers_renamed,
                stats.identifier_references,
                stats.views_renamed,
                stats.files_rewritten
            );
            for unmatched in &stats.files_unmatched {
                tracing::debug!(pack = %pack.label, "No asset for reference '{}'", unmatched);
            }

            *state = EntryState::MergeIntoOutput;
            merge.import_layout(&doc, &pack.label);
        }

        *state = EntryState::WriteMergedLayout;
        let merged = match merge.merged.take() {
            Some(doc) => doc,
            None => {
                tracing::warn!("No contribution has a readable layout; writing an empty one");
                LayoutDocument::new(
                    Node::new(DEFAULT_ROOT_TAG).with_attr("version", DEFAULT_ROOT_VERSION),
                )
            }
        };
        merge
            .writer
            .write_entry(&self.config.layout_file, merged.to_xml_string().as_bytes())?;

        outcome.assets_written = merge.assets_written;
        outcome.assets_deduplicated = merge.assets_deduplicated;
        outcome.views_skipped = merge.views_skipped;

        let mut file = merge.writer.finish()?;
        file.flush()?;
        Ok(())
    }

    /// Copy one contribution's nested archive into scratch space and open it.
    fn extract_contribution(
        &self,
        reader: &mut dyn ArchiveReader,
        pack: &Pack,
        contribution: &PackContribution,
        scratch: &ScratchDir,
    ) -> Result<(ZipArchiveReader<File>, Vec<ArchiveEntry>)> {
        let bytes = reader.read_entry(&contribution.entry_name)?;
        let path = scratch
            .path()
            .join(format!("pack{}{}", pack.index, self.config.nested_suffix()));
        std::fs::write(path.as_std_path(), &bytes)?;

        let mut nested = ZipArchiveReader::open(&path)?;
        let listing = nested.entries()?;
        tracing::debug!(
            pack = %pack.label,
            "Extracted '{}' ({} entries) to {}",
            contribution.entry_name,
            listing.len(),
            path
        );
        Ok((nested, listing))
    }

    /// Parse the contribution's layout; `None` if absent or unreadable.
    fn read_layout(
        &self,
        nested: &mut ZipArchiveReader<File>,
        listing: &[ArchiveEntry],
        pack: &Pack,
    ) -> Option<LayoutDocument> {
        let Some(entry) = listing
            .iter()
            .find(|e| !e.is_dir && self.is_layout_entry(&e.name))
        else {
            tracing::debug!(pack = %pack.label, "No {} in contribution", self.config.layout_file);
            return None;
        };

        let parsed = nested
            .read_entry(&entry.name)
            .and_then(|bytes| LayoutDocument::from_bytes(&bytes).map_err(Error::from));
        match parsed {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(
                    pack = %pack.label,
                    "Omitting layout '{}': {}",
                    entry.name,
                    e
                );
                None
            }
        }
    }

    /// Copy every non-layout file, registering its name variants.
    fn copy_assets(
        &self,
        merge: &mut EntryMerge,
        nested: &mut ZipArchiveReader<File>,
        listing: &[ArchiveEntry],
        namer: &PackNamer,
    ) -> Result<()> {
        let mut seen: HashSet<String> = HashSet::new();

        for entry in listing {
            if entry.is_dir || self.is_layout_entry(&entry.name) {
                continue;
            }
            let relative = normalize_entry_path(&entry.name);
            if relative.is_empty() {
                continue;
            }
            if !seen.insert(relative.clone()) {
                tracing::warn!(
                    pack = %namer.label(),
                    "Duplicate path '{}' in nested archive; keeping the first copy",
                    relative
                );
                continue;
            }

            let bytes = match nested.read_entry(&entry.name) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(pack = %namer.label(), "Skipping unreadable '{}': {}", entry.name, e);
                    continue;
                }
            };

            let proposed = namer.destination(&relative);
            let keys = merge.refs.insert_variants(&relative, &proposed);
            let hash = self.store.hash(&bytes);
            let canonical = self.store.resolve(&hash, &proposed);

            let stored_at = merge.place(&hash, &canonical, &proposed, &bytes)?;
            if stored_at != proposed {
                merge.refs.repoint(&keys, &stored_at);
            }
        }
        Ok(())
    }

    fn is_layout_entry(&self, name: &str) -> bool {
        normalize_entry_path(name).eq_ignore_ascii_case(&self.config.layout_file)
    }

    /// Output archive path for a catalog entry.
    pub fn output_path(&self, id: &str) -> Utf8PathBuf {
        self.config
            .output_dir
            .join(format!("{}.{}", id, OUTPUT_EXTENSION))
    }

    fn emit_progress(&self, stage: MergeStage, current_entry: Option<String>, current: u32, total: u32) {
        if let Some(callback) = &self.progress_callback {
            callback(MergeProgress {
                stage,
                current_entry,
                current,
                total,
            });
        }
    }
}

/// State accumulated while assembling one output archive.
struct EntryMerge {
    writer: ZipArchiveWriter<BufWriter<File>>,
    dedup: bool,
    /// Paths written to this archive and the content each holds.
    by_path: HashMap<String, ContentHash>,
    /// Where each distinct content lives in this archive.
    by_hash: HashMap<ContentHash, String>,
    refs: FileReferenceMap,
    merged: Option<LayoutDocument>,
    view_signatures: HashSet<u64>,
    assets_written: usize,
    assets_deduplicated: usize,
    views_skipped: usize,
}

impl EntryMerge {
    fn new(writer: ZipArchiveWriter<BufWriter<File>>, dedup: bool) -> Self {
        Self {
            writer,
            dedup,
            by_path: HashMap::new(),
            by_hash: HashMap::new(),
            refs: FileReferenceMap::new(),
            merged: None,
            view_signatures: HashSet::new(),
            assets_written: 0,
            assets_deduplicated: 0,
            views_skipped: 0,
        }
    }

    /// Store `bytes` once in this archive and return the path holding them.
    ///
    /// With dedup on, content already in the archive is never written again.
    /// Otherwise the bytes go to `canonical` when it is free here, then to
    /// `proposed`, then to a numbered sibling of `proposed`.
    fn place(
        &mut self,
        hash: &ContentHash,
        canonical: &str,
        proposed: &str,
        bytes: &[u8],
    ) -> Result<String> {
        if self.dedup {
            if let Some(existing) = self.by_hash.get(hash) {
                tracing::debug!("Deduplicated '{}' -> '{}'", proposed, existing);
                self.assets_deduplicated += 1;
                return Ok(existing.clone());
            }
        }

        let target = if !self.by_path.contains_key(canonical) {
            canonical.to_string()
        } else if !self.by_path.contains_key(proposed) {
            tracing::debug!(
                "'{}' holds different content in this archive; storing at '{}'",
                canonical,
                proposed
            );
            proposed.to_string()
        } else {
            let renamed = self.unused_sibling(proposed);
            tracing::debug!("'{}' is taken; storing at '{}'", proposed, renamed);
            renamed
        };

        self.writer.write_entry(&target, bytes)?;
        self.by_path.insert(target.clone(), hash.clone());
        self.by_hash
            .entry(hash.clone())
            .or_insert_with(|| target.clone());
        self.assets_written += 1;
        Ok(target)
    }

    /// `dir/name~N.ext` for the smallest `N` not yet written.
    ///
    /// Always terminates: at most `by_path.len()` candidates can be taken.
    fn unused_sibling(&self, path: &str) -> String {
        let name_start = path.rfind('/').map_or(0, |slash| slash + 1);
        let (stem, ext) = match path.rfind('.') {
            Some(dot) if dot > name_start => path.split_at(dot),
            _ => (path, ""),
        };
        let mut n = 1usize;
        loop {
            let candidate = format!("{}~{}{}", stem, n, ext);
            if !self.by_path.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Import a rewritten layout: elements, then groups, then unseen views.
    fn import_layout(&mut self, doc: &LayoutDocument, label: &str) {
        let root = doc.root();
        let merged = self
            .merged
            .get_or_insert_with(|| LayoutDocument::new(root_shell(root)));

        for tag in DEFINITION_TAGS {
            for node in root.child_nodes().filter(|n| n.tag() == tag) {
                merged.import(node);
            }
        }

        for view in root.child_nodes().filter(|n| n.tag() == VIEW_TAG) {
            if self.view_signatures.insert(view_signature(view)) {
                merged.import(view);
            } else {
                tracing::debug!(
                    pack = %label,
                    "Skipping duplicate view '{}'",
                    view.attr("name").unwrap_or_default()
                );
                self.views_skipped += 1;
            }
        }

        for other in root
            .child_nodes()
            .filter(|n| n.tag() != VIEW_TAG && !DEFINITION_TAGS.contains(&n.tag()))
        {
            tracing::debug!(pack = %label, "Not carrying over root-level <{}>", other.tag());
        }
    }
}

/// A copy of `root` without its children.
fn root_shell(root: &Node) -> Node {
    root.attributes()
        .fold(Node::new(root.tag()), |node, (name, value)| {
            node.with_attr(name, value)
        })
}

/// Whitespace-insensitive structural signature of a view.
pub fn view_signature(view: &Node) -> u64 {
    xxh3_64(collapse_whitespace(&view.to_xml_string()).as_bytes())
}

/// Per-entry extraction directory, removed on drop when cleanup is enabled.
struct ScratchDir {
    path: Utf8PathBuf,
    cleanup: bool,
}

impl ScratchDir {
    fn create(root: &Utf8Path, id: &str, cleanup: bool) -> Result<Self> {
        let name: String = id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let path = root.join(format!("artpack-{}-{}", name, std::process::id()));
        if path.as_std_path().exists() {
            std::fs::remove_dir_all(path.as_std_path())?;
        }
        std::fs::create_dir_all(path.as_std_path())?;
        Ok(Self { path, cleanup })
    }

    fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.cleanup {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(self.path.as_std_path()) {
            tracing::warn!("Failed to remove scratch dir {}: {}", self.path, e);
        }
    }
}
