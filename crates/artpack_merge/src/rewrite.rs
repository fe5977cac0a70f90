//! Layout reference rewriting.
//!
//! Rewriting one pack's layout happens in two passes, in this order:
//!
//! 1. **Identifier prefixing**: every root-level `element`/`group` definition
//!    gets the pack's identifier prefix, and every `element=`/`ref=` attribute
//!    anywhere in the same document that named an old identifier is updated.
//!    Root-level views get the pack's readable prefix.
//! 2. **File references**: every attribute whose value looks like an asset
//!    (per an injectable [`AssetPredicate`]) is looked up in the entry's
//!    [`FileReferenceMap`] and replaced with the canonical output path. Misses
//!    are left untouched; the verifier reports them later.

use crate::config::default_asset_extensions;
use crate::error::{Error, Result};
use crate::namer::PackNamer;
use crate::refs::FileReferenceMap;
use artpack_layout::LayoutDocument;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Attributes whose values name an element or group definition.
pub const IDENTIFIER_REFERENCE_ATTRIBUTES: [&str; 2] = ["element", "ref"];

/// Root-level tags whose `name` attribute is a referenceable identifier.
pub const DEFINITION_TAGS: [&str; 2] = ["element", "group"];

pub const VIEW_TAG: &str = "view";

/// Decides whether an attribute or text value refers to an asset file.
#[derive(Clone)]
pub struct AssetPredicate {
    test: Arc<dyn Fn(&str) -> bool + Send + Sync>,
}

impl AssetPredicate {
    /// Wrap an arbitrary predicate.
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            test: Arc::new(test),
        }
    }

    /// Match values ending in one of `extensions` (case-insensitive).
    pub fn from_extensions<S: AsRef<str>>(extensions: &[S]) -> Result<Self> {
        let alternatives: Vec<String> = extensions
            .iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Ok(Self::new(|_| false));
        }

        let pattern = format!(r"(?i)\.({})$", alternatives.join("|"));
        let regex = Regex::new(&pattern)
            .map_err(|e| Error::InvalidConfig(format!("asset extension pattern: {}", e)))?;
        Ok(Self::new(move |value| regex.is_match(value.trim())))
    }

    pub fn matches(&self, value: &str) -> bool {
        (self.test)(value)
    }
}

impl Default for AssetPredicate {
    fn default() -> Self {
        Self::from_extensions(&default_asset_extensions()).unwrap_or_else(|e| {
            tracing::error!("Default asset predicate unavailable: {}", e);
            Self::new(|_| false)
        })
    }
}

impl fmt::Debug for AssetPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AssetPredicate")
    }
}

/// Counters from rewriting one layout document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Element/group definitions renamed.
    pub identifiers_renamed: usize,
    /// `element=`/`ref=` attributes updated to a renamed identifier.
    pub identifier_references: usize,
    pub views_renamed: usize,
    /// Asset references replaced with a canonical output path.
    pub files_rewritten: usize,
    /// Asset-looking values with no match in the reference map.
    pub files_unmatched: Vec<String>,
}

/// Rewrites identifiers and asset references in one pack's layout.
#[derive(Debug, Clone, Default)]
pub struct ReferenceRewriter {
    predicate: AssetPredicate,
}

impl ReferenceRewriter {
    pub fn new(predicate: AssetPredicate) -> Self {
        Self { predicate }
    }

    pub fn predicate(&self) -> &AssetPredicate {
        &self.predicate
    }

    /// Run both passes: identifier prefixing, then file references.
    pub fn rewrite(
        &self,
        doc: &mut LayoutDocument,
        namer: &PackNamer,
        refs: &FileReferenceMap,
    ) -> RewriteStats {
        let mut stats = RewriteStats::default();
        prefix_identifiers(doc, namer, &mut stats);
        self.rewrite_file_references(doc, refs, &mut stats);
        stats
    }

    /// Replace every asset-looking attribute value that resolves in `refs`.
    pub fn rewrite_file_references(
        &self,
        doc: &mut LayoutDocument,
        refs: &FileReferenceMap,
        stats: &mut RewriteStats,
    ) {
        let predicate = &self.predicate;
        doc.root_mut().visit_mut(&mut |node| {
            for (_, value) in node.attributes_mut() {
                if !predicate.matches(value) {
                    continue;
                }
                match refs.lookup(value.trim()) {
                    Some(canonical) => {
                        if value.as_str() != canonical {
                            *value = canonical.to_string();
                        }
                        stats.files_rewritten += 1;
                    }
                    None => stats.files_unmatched.push(value.clone()),
                }
            }
        });
    }
}

/// Prefix definitions and views, and follow renamed identifiers.
pub fn prefix_identifiers(doc: &mut LayoutDocument, namer: &PackNamer, stats: &mut RewriteStats) {
    let mut renames: HashMap<String, String> = HashMap::new();

    for node in doc.root_mut().child_nodes_mut() {
        let Some(name) = node.attr("name").map(str::to_string) else {
            continue;
        };
        if DEFINITION_TAGS.contains(&node.tag()) {
            let renamed = namer.identifier(&name);
            node.set_attr("name", renamed.clone());
            renames.insert(name, renamed);
            stats.identifiers_renamed += 1;
        } else if node.tag() == VIEW_TAG {
            node.set_attr("name", namer.view(&name));
            stats.views_renamed += 1;
        }
    }

    if renames.is_empty() {
        return;
    }

    doc.root_mut().visit_mut(&mut |node| {
        for (attr, value) in node.attributes_mut() {
            if !IDENTIFIER_REFERENCE_ATTRIBUTES.contains(&attr) {
                continue;
            }
            if let Some(renamed) = renames.get(value.as_str()) {
                *value = renamed.clone();
                stats.identifier_references += 1;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"<mamelayout version="2">
        <element name="bezel"><image file="bezel.png" /></element>
        <element name="overlay"><image file="art\overlay.PNG" alphafile="missing.png" /></element>
        <group name="frame"><element ref="bezel"><bounds x="0" y="0" width="1" height="1" /></element></group>
        <view name="Artwork">
            <group ref="frame" />
            <element ref="overlay" />
            <overlay element="bezel" />
        </view>
    </mamelayout>"#;

    fn refs() -> FileReferenceMap {
        let mut refs = FileReferenceMap::new();
        refs.insert_variants("bezel.png", "A/bezel.png");
        refs.insert_variants("art/overlay.png", "A/art/overlay.png");
        refs
    }

    #[test]
    fn test_predicate_from_extensions() {
        let predicate = AssetPredicate::from_extensions(&["png", ".JPG"]).unwrap();
        assert!(predicate.matches("bezel.png"));
        assert!(predicate.matches("Bezel.PNG"));
        assert!(predicate.matches("shot.jpg "));
        assert!(!predicate.matches("bezel"));
        assert!(!predicate.matches("notes.txt"));
    }

    #[test]
    fn test_default_predicate_uses_default_extensions() {
        let predicate = AssetPredicate::default();
        assert!(predicate.matches("art/Bezel.PNG"));
        assert!(predicate.matches("font.ttf"));
        assert!(!predicate.matches("default.lay"));
    }

    #[test]
    fn test_predicate_empty_never_matches() {
        let predicate = AssetPredicate::from_extensions::<&str>(&[]).unwrap();
        assert!(!predicate.matches("bezel.png"));
    }

    #[test]
    fn test_custom_predicate() {
        let predicate = AssetPredicate::new(|v| v.starts_with("asset:"));
        assert!(predicate.matches("asset:bezel"));
    }

    #[test]
    fn test_prefix_identifiers_and_references() {
        let mut doc = LayoutDocument::parse(LAYOUT).unwrap();
        let mut stats = RewriteStats::default();
        prefix_identifiers(&mut doc, &PackNamer::new("A"), &mut stats);

        let names: Vec<_> = doc
            .root()
            .child_nodes()
            .filter_map(|n| n.attr("name"))
            .collect();
        assert_eq!(names, vec!["A__bezel", "A__overlay", "A__frame", "A: Artwork"]);

        let refs: Vec<_> = doc
            .root()
            .find_all("element")
            .iter()
            .filter_map(|n| n.attr("ref"))
            .collect();
        assert_eq!(refs, vec!["A__bezel", "A__overlay"]);
        assert_eq!(doc.find_all("group")[1].attr("ref"), Some("A__frame"));
        assert_eq!(doc.find_all("overlay")[0].attr("element"), Some("A__bezel"));

        assert_eq!(stats.identifiers_renamed, 3);
        assert_eq!(stats.identifier_references, 4);
        assert_eq!(stats.views_renamed, 1);
    }

    #[test]
    fn test_rewrite_file_references() {
        let mut doc = LayoutDocument::parse(LAYOUT).unwrap();
        let stats = ReferenceRewriter::default().rewrite(&mut doc, &PackNamer::new("A"), &refs());

        let images = doc.find_all("image");
        assert_eq!(images[0].attr("file"), Some("A/bezel.png"));
        assert_eq!(images[1].attr("file"), Some("A/art/overlay.png"));
        // Unmatched references are left untouched
        assert_eq!(images[1].attr("alphafile"), Some("missing.png"));

        assert_eq!(stats.files_rewritten, 2);
        assert_eq!(stats.files_unmatched, vec!["missing.png".to_string()]);
    }

    #[test]
    fn test_no_cross_pack_leakage() {
        let mut a = LayoutDocument::parse(LAYOUT).unwrap();
        let mut b = LayoutDocument::parse(LAYOUT).unwrap();
        let rewriter = ReferenceRewriter::default();
        rewriter.rewrite(&mut a, &PackNamer::new("A"), &refs());
        rewriter.rewrite(&mut b, &PackNamer::new("B"), &refs());

        let a_refs: Vec<_> = a.find_all("element").iter().filter_map(|n| n.attr("ref")).collect();
        let b_refs: Vec<_> = b.find_all("element").iter().filter_map(|n| n.attr("ref")).collect();
        assert!(a_refs.iter().all(|r| r.starts_with("A__")));
        assert!(b_refs.iter().all(|r| r.starts_with("B__")));
    }
}
