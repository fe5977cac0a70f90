//! Content-addressed deduplication store.
//!
//! The [`ContentStore`] maps a content digest to the one canonical output path
//! chosen for those bytes. It lives for the whole run and is the only state
//! shared between catalog entries. A hash, once mapped, is never remapped.

use crate::config::{DigestKind, MergeConfig};
use sha2::Digest;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Digest of an asset's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(Vec<u8>);

impl ContentHash {
    pub fn compute(kind: DigestKind, bytes: &[u8]) -> Self {
        let digest = match kind {
            DigestKind::Sha1 => sha1::Sha1::digest(bytes).to_vec(),
            DigestKind::Sha256 => sha2::Sha256::digest(bytes).to_vec(),
        };
        Self(digest)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// Process-wide `hash -> canonical path` registry.
///
/// [`resolve`](Self::resolve) takes `&self` and serializes on an internal lock,
/// so a store can be shared by reference (or `Arc`) if entries are ever
/// processed in parallel.
#[derive(Debug)]
pub struct ContentStore {
    enabled: bool,
    digest: DigestKind,
    entries: Mutex<HashMap<ContentHash, String>>,
}

impl ContentStore {
    /// A deduplicating store using the given digest.
    pub fn new(digest: DigestKind) -> Self {
        Self {
            enabled: true,
            digest,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A store whose [`resolve`](Self::resolve) is the identity function.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            digest: DigestKind::default(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &MergeConfig) -> Self {
        if config.dedup {
            Self::new(config.digest)
        } else {
            Self::disabled()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn digest(&self) -> DigestKind {
        self.digest
    }

    /// Hash bytes with this store's digest.
    pub fn hash(&self, bytes: &[u8]) -> ContentHash {
        ContentHash::compute(self.digest, bytes)
    }

    /// Return the canonical path for `hash`, registering `proposed` if the
    /// hash has not been seen before.
    ///
    /// When the returned path differs from `proposed`, the caller must not
    /// store the bytes again under `proposed`.
    pub fn resolve(&self, hash: &ContentHash, proposed: &str) -> String {
        if !self.enabled {
            return proposed.to_string();
        }

        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries
            .entry(hash.clone())
            .or_insert_with(|| proposed.to_string())
            .clone()
    }

    /// Canonical path already registered for `hash`, if any.
    pub fn get(&self, hash: &ContentHash) -> Option<String> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.get(hash).cloned()
    }

    /// Number of distinct hashes registered so far.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new(DigestKind::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_registration_wins() {
        let store = ContentStore::new(DigestKind::Sha1);
        let hash = store.hash(b"png bytes");

        assert_eq!(store.resolve(&hash, "A/bezel.png"), "A/bezel.png");
        assert_eq!(store.resolve(&hash, "B/bezel.png"), "A/bezel.png");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_distinct_content_distinct_paths() {
        let store = ContentStore::new(DigestKind::Sha256);
        let a = store.hash(b"one");
        let b = store.hash(b"two");

        assert_eq!(store.resolve(&a, "A/x.png"), "A/x.png");
        assert_eq!(store.resolve(&b, "B/x.png"), "B/x.png");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_disabled_store_is_identity() {
        let store = ContentStore::disabled();
        let hash = store.hash(b"same");

        assert_eq!(store.resolve(&hash, "A/x.png"), "A/x.png");
        assert_eq!(store.resolve(&hash, "B/x.png"), "B/x.png");
        assert!(store.is_empty());
    }

    #[test]
    fn test_digest_lengths() {
        assert_eq!(ContentHash::compute(DigestKind::Sha1, b"x").as_bytes().len(), 20);
        assert_eq!(ContentHash::compute(DigestKind::Sha256, b"x").as_bytes().len(), 32);
    }

    #[test]
    fn test_hex_display() {
        let hash = ContentHash::compute(DigestKind::Sha1, b"abc");
        assert_eq!(hash.to_string(), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn test_shared_across_threads() {
        let store = std::sync::Arc::new(ContentStore::default());
        let hash = store.hash(b"shared");

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let store = store.clone();
                let hash = hash.clone();
                std::thread::spawn(move || store.resolve(&hash, &format!("P{}/x.png", i)))
            })
            .collect();

        let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }
}
