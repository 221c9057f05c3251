//! Persisted records: per-file fingerprints and per-source cache entries.
//!
//! The JSON layout keeps the field names of the original `.rivet_cache`
//! documents (`hash`, `includes`, `compiler_flags`, `target`, `profile`,
//! `timestamp`) and adds `source` and `format_version`. A quick-mode hash is
//! written as the literal string `"quick_check"`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rivet_common::ContentHash;
use serde::{Deserialize, Serialize};

/// Current on-disk entry format version. Increment on breaking changes.
pub const ENTRY_FORMAT_VERSION: u32 = 1;

/// Placeholder stored in the `hash` field when no content hash was computed.
pub const QUICK_CHECK_SENTINEL: &str = "quick_check";

/// The observed state of one file at the time it was fingerprinted.
///
/// `content_hash` is `None` for quick-mode fingerprints. Metadata is always
/// recorded, even in full mode, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFingerprint {
    /// SHA-256 of the file bytes, if computed.
    #[serde(rename = "hash", with = "hash_or_sentinel", default)]
    pub content_hash: Option<ContentHash>,

    /// Modification time, seconds since the unix epoch.
    #[serde(rename = "mtime", default)]
    pub modified_at: i64,

    /// File size in bytes.
    #[serde(default)]
    pub size: u64,
}

impl FileFingerprint {
    /// Creates a metadata-only fingerprint.
    pub fn quick(modified_at: i64, size: u64) -> Self {
        Self {
            content_hash: None,
            modified_at,
            size,
        }
    }

    /// Creates a fingerprint carrying a content hash.
    pub fn full(content_hash: ContentHash, modified_at: i64, size: u64) -> Self {
        Self {
            content_hash: Some(content_hash),
            modified_at,
            size,
        }
    }

    /// Returns `true` if modification time and size both match `other`.
    pub fn same_metadata(&self, other: &FileFingerprint) -> bool {
        self.modified_at == other.modified_at && self.size == other.size
    }
}

/// The last successful build of one source file.
///
/// Created or replaced wholesale by [`StalenessCache::update`](crate::StalenessCache::update);
/// never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Format version of the document this entry was read from or will be written as.
    #[serde(default = "legacy_format_version")]
    pub format_version: u32,

    /// The source path exactly as the build driver passed it.
    #[serde(default)]
    pub source: PathBuf,

    /// Fingerprint of the source file.
    #[serde(flatten)]
    pub source_fingerprint: FileFingerprint,

    /// Fingerprints of every include the source depended on, keyed by path.
    #[serde(rename = "includes", default)]
    pub include_fingerprints: BTreeMap<PathBuf, FileFingerprint>,

    /// Compiler flags in the order they were passed.
    #[serde(default)]
    pub compiler_flags: Vec<String>,

    /// Target identifier (e.g. "x86_64-linux-gnu").
    pub target: String,

    /// Build profile identifier (e.g. "debug", "release").
    pub profile: String,

    /// When the entry was recorded, seconds since the unix epoch.
    #[serde(rename = "timestamp")]
    pub built_at: i64,
}

impl CacheEntry {
    /// Returns `true` if this entry was recorded with exactly this configuration.
    ///
    /// Flags are compared as an ordered sequence.
    pub fn same_configuration(&self, compiler_flags: &[String], target: &str, profile: &str) -> bool {
        self.target == target && self.profile == profile && self.compiler_flags == compiler_flags
    }

    /// Returns the stored fingerprint for an include path.
    pub fn include(&self, path: &Path) -> Option<&FileFingerprint> {
        self.include_fingerprints.get(path)
    }
}

fn legacy_format_version() -> u32 {
    1
}

mod hash_or_sentinel {
    use super::QUICK_CHECK_SENTINEL;
    use rivet_common::ContentHash;
    use serde::de::{self, Deserializer};
    use serde::{Deserialize, Serializer};

    pub fn serialize<S: Serializer>(hash: &Option<ContentHash>, s: S) -> Result<S::Ok, S::Error> {
        match hash {
            Some(h) => s.serialize_str(&h.to_string()),
            None => s.serialize_str(QUICK_CHECK_SENTINEL),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<ContentHash>, D::Error> {
        let s = String::deserialize(d)?;
        if s.is_empty() || s == QUICK_CHECK_SENTINEL {
            return Ok(None);
        }
        s.parse().map(Some).map_err(de::Error::custom)
    }
}
