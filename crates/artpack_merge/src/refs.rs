//! Name-variant mapping from layout references to output paths.
//!
//! Layout documents refer to the same asset in many spellings: `bezel.png`,
//! `./bezel.png`, `art\bezel.png`, `art/bezel.png`. The [`FileReferenceMap`]
//! registers every plausible spelling of each copied asset, and lookups walk a
//! fixed, ordered list of [`NORMALIZERS`] until one spelling hits.
//!
//! Keys are compared case-insensitively.

use std::collections::HashMap;

/// A named rewrite of a reference value into a lookup key candidate.
pub struct Normalizer {
    pub name: &'static str,
    pub apply: fn(&str) -> Option<String>,
}

/// Lookup order. First hit wins.
pub const NORMALIZERS: &[Normalizer] = &[
    Normalizer {
        name: "exact",
        apply: exact,
    },
    Normalizer {
        name: "slash-normalized",
        apply: slash_normalized,
    },
    Normalizer {
        name: "file-name",
        apply: bare_file_name,
    },
    Normalizer {
        name: "dot-slash-file-name",
        apply: dot_slash_file_name,
    },
    Normalizer {
        name: "dot-backslash-file-name",
        apply: dot_backslash_file_name,
    },
];

fn exact(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn slash_normalized(value: &str) -> Option<String> {
    value.contains('\\').then(|| value.replace('\\', "/"))
}

fn bare_file_name(value: &str) -> Option<String> {
    file_name(value).map(str::to_string)
}

fn dot_slash_file_name(value: &str) -> Option<String> {
    file_name(value).map(|name| format!("./{}", name))
}

fn dot_backslash_file_name(value: &str) -> Option<String> {
    file_name(value).map(|name| format!(".\\{}", name))
}

/// Final path component, accepting either slash style.
pub fn file_name(value: &str) -> Option<&str> {
    value
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
}

fn key(value: &str) -> String {
    value.to_lowercase()
}

/// Keys registered for one asset by [`FileReferenceMap::insert_variants`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VariantKeys {
    /// Path spellings; always owned by the asset that registered them last.
    pub paths: Vec<String>,
    /// Leaf-name spellings this asset claimed. Empty when an earlier asset
    /// with the same file name got there first.
    pub leaves: Vec<String>,
}

/// Per-entry map from reference spellings to canonical output paths.
///
/// Two tiers: full path spellings, and bare file-name spellings. A lookup
/// exhausts the path tier before falling back to file names, so a reference
/// naming a file exactly is never captured by another file sharing its leaf.
#[derive(Debug, Default, Clone)]
pub struct FileReferenceMap {
    paths: HashMap<String, String>,
    leaves: HashMap<String, String>,
}

impl FileReferenceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every spelling a layout might use for an asset.
    ///
    /// `relative_path` is the asset's normalized path inside its nested
    /// archive, `destination` the output path it was assigned. Returns the keys
    /// that were written so they can be [`repoint`](Self::repoint)ed later.
    pub fn insert_variants(&mut self, relative_path: &str, destination: &str) -> VariantKeys {
        let forward = relative_path.replace('\\', "/");
        let backward = forward.replace('/', "\\");
        let mut paths: Vec<String> = [
            forward.clone(),
            backward.clone(),
            format!("./{}", forward),
            format!(".\\{}", backward),
            destination.to_string(),
            destination.replace('/', "\\"),
        ]
        .iter()
        .map(|v| key(v))
        .collect();
        paths.sort();
        paths.dedup();
        for k in &paths {
            self.paths.insert(k.clone(), destination.to_string());
        }

        let mut leaves = Vec::new();
        if let Some(name) = file_name(&forward) {
            for variant in [name.to_string(), format!("./{}", name), format!(".\\{}", name)] {
                let k = key(&variant);
                if !self.leaves.contains_key(&k) {
                    self.leaves.insert(k.clone(), destination.to_string());
                    leaves.push(k);
                }
            }
        }

        VariantKeys { paths, leaves }
    }

    /// Point previously registered keys at a different canonical path.
    pub fn repoint(&mut self, keys: &VariantKeys, canonical: &str) {
        for k in &keys.paths {
            self.paths.insert(k.clone(), canonical.to_string());
        }
        for k in &keys.leaves {
            self.leaves.insert(k.clone(), canonical.to_string());
        }
    }

    /// Resolve a reference value, returning the canonical path.
    pub fn lookup(&self, value: &str) -> Option<&str> {
        self.lookup_with_rule(value).map(|(_, path)| path)
    }

    /// Resolve a reference value, also reporting which normalizer matched.
    pub fn lookup_with_rule(&self, value: &str) -> Option<(&'static str, &str)> {
        Self::lookup_in(&self.paths, value).or_else(|| Self::lookup_in(&self.leaves, value))
    }

    fn lookup_in<'a>(
        tier: &'a HashMap<String, String>,
        value: &str,
    ) -> Option<(&'static str, &'a str)> {
        NORMALIZERS.iter().find_map(|normalizer| {
            let candidate = (normalizer.apply)(value)?;
            tier.get(&key(&candidate))
                .map(|path| (normalizer.name, path.as_str()))
        })
    }

    /// Number of distinct spellings registered, across both tiers.
    pub fn len(&self) -> usize {
        self.paths.len() + self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.leaves.is_empty()
    }
}
