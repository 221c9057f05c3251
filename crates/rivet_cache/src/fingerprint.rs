//! File fingerprinting and the per-mode comparison policies.
//!
//! Quick mode reads metadata only. Full mode additionally streams the file
//! through SHA-256. The comparison functions are kept separate from I/O so
//! both policies can be exercised without touching the filesystem.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rivet_common::{unix_seconds, ContentHash, VerifyMode};

use crate::entry::FileFingerprint;
use crate::error::CacheError;

/// How a source file is compared in quick mode.
///
/// Includes always compare modification time and size in quick mode. The
/// source file historically did not: once it could be stat'ed it was treated
/// as unchanged, leaving object/entry/configuration checks to catch rebuilds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourcePolicy {
    /// A readable source is never reported as changed in quick mode.
    #[default]
    ExistenceOnly,
    /// Apply the include rule (mtime or size differs) to the source too.
    Metadata,
}

/// Captures and compares file fingerprints under a [`VerifyMode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fingerprinter {
    mode: VerifyMode,
    source_policy: SourcePolicy,
}

impl Fingerprinter {
    /// Creates a fingerprinter for the given mode with the default source policy.
    pub fn new(mode: VerifyMode) -> Self {
        Self {
            mode,
            source_policy: SourcePolicy::default(),
        }
    }

    /// Sets the quick-mode source comparison policy.
    pub fn with_source_policy(mut self, policy: SourcePolicy) -> Self {
        self.source_policy = policy;
        self
    }

    /// Returns the active verification mode.
    pub fn mode(&self) -> VerifyMode {
        self.mode
    }

    /// Switches the verification mode for all subsequent calls.
    pub fn set_mode(&mut self, mode: VerifyMode) {
        self.mode = mode;
    }

    /// Returns the quick-mode source comparison policy.
    pub fn source_policy(&self) -> SourcePolicy {
        self.source_policy
    }

    /// Fingerprints a file under the active mode.
    ///
    /// A missing file yields [`CacheError::NotFound`]; any other failure to
    /// stat or read yields [`CacheError::Io`].
    pub fn fingerprint(&self, path: &Path) -> Result<FileFingerprint, CacheError> {
        let meta = std::fs::metadata(path).map_err(|e| CacheError::from_io(path, e))?;
        let modified_at = meta
            .modified()
            .map(unix_seconds)
            .map_err(|e| CacheError::from_io(path, e))?;
        let size = meta.len();

        if !self.mode.hashes_content() {
            return Ok(FileFingerprint::quick(modified_at, size));
        }

        let file = File::open(path).map_err(|e| CacheError::from_io(path, e))?;
        let hash = ContentHash::from_reader(BufReader::new(file))
            .map_err(|e| CacheError::from_io(path, e))?;
        Ok(FileFingerprint::full(hash, modified_at, size))
    }

    /// Returns `true` if a source file should be considered changed.
    pub fn source_changed(&self, stored: &FileFingerprint, current: &FileFingerprint) -> bool {
        match (self.mode, self.source_policy) {
            (VerifyMode::Quick, SourcePolicy::ExistenceOnly) => false,
            (VerifyMode::Quick, SourcePolicy::Metadata) => !stored.same_metadata(current),
            (VerifyMode::Full, _) => content_differs(stored, current),
        }
    }

    /// Returns `true` if an include file should be considered changed.
    pub fn include_changed(&self, stored: &FileFingerprint, current: &FileFingerprint) -> bool {
        match self.mode {
            VerifyMode::Quick => !stored.same_metadata(current),
            VerifyMode::Full => content_differs(stored, current),
        }
    }
}

// A stored entry without a hash (written in quick mode) never matches.
fn content_differs(stored: &FileFingerprint, current: &FileFingerprint) -> bool {
    match (&stored.content_hash, &current.content_hash) {
        (Some(a), Some(b)) => a != b,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_fp(content: &[u8], mtime: i64) -> FileFingerprint {
        FileFingerprint::full(ContentHash::from_bytes(content), mtime, content.len() as u64)
    }

    #[test]
    fn quick_fingerprint_skips_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.c");
        std::fs::write(&path, "int main(void) { return 0; }").unwrap();

        let fp = Fingerprinter::new(VerifyMode::Quick).fingerprint(&path).unwrap();
        assert!(fp.content_hash.is_none());
        assert_eq!(fp.size, 28);
        assert!(fp.modified_at > 0);
    }

    #[test]
    fn full_fingerprint_hashes_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.h");
        std::fs::write(&path, "#pragma once\n").unwrap();

        let fp = Fingerprinter::new(VerifyMode::Full).fingerprint(&path).unwrap();
        assert_eq!(fp.content_hash, Some(ContentHash::from_bytes(b"#pragma once\n")));
        assert_eq!(fp.size, 13);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.h");
        for mode in [VerifyMode::Quick, VerifyMode::Full] {
            let err = Fingerprinter::new(mode).fingerprint(&path).unwrap_err();
            assert!(err.is_not_found(), "{mode}: {err}");
        }
    }

    #[test]
    fn mtime_comes_from_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.h");
        std::fs::write(&path, "x").unwrap();
        let t = filetime::FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&path, t).unwrap();

        let fp = Fingerprinter::default().fingerprint(&path).unwrap();
        assert_eq!(fp.modified_at, 1_600_000_000);
    }

    #[test]
    fn quick_source_is_never_changed_by_default() {
        let fp = Fingerprinter::new(VerifyMode::Quick);
        let stored = FileFingerprint::quick(100, 10);
        let current = FileFingerprint::quick(200, 99);
        assert!(!fp.source_changed(&stored, &current));
    }

    #[test]
    fn quick_source_metadata_policy_compares_mtime_and_size() {
        let fp = Fingerprinter::new(VerifyMode::Quick).with_source_policy(SourcePolicy::Metadata);
        let stored = FileFingerprint::quick(100, 10);
        assert!(!fp.source_changed(&stored, &FileFingerprint::quick(100, 10)));
        assert!(fp.source_changed(&stored, &FileFingerprint::quick(101, 10)));
        assert!(fp.source_changed(&stored, &FileFingerprint::quick(100, 11)));
    }

    #[test]
    fn quick_include_compares_mtime_or_size() {
        let fp = Fingerprinter::new(VerifyMode::Quick);
        let stored = FileFingerprint::quick(100, 10);
        assert!(!fp.include_changed(&stored, &FileFingerprint::quick(100, 10)));
        assert!(fp.include_changed(&stored, &FileFingerprint::quick(101, 10)));
        assert!(fp.include_changed(&stored, &FileFingerprint::quick(100, 9)));
    }

    #[test]
    fn full_mode_ignores_metadata() {
        let fp = Fingerprinter::new(VerifyMode::Full);
        let stored = full_fp(b"int x = 1;", 100);
        let touched = full_fp(b"int x = 1;", 999);
        let edited = full_fp(b"int x = 2;", 100);

        assert!(!fp.source_changed(&stored, &touched));
        assert!(!fp.include_changed(&stored, &touched));
        assert!(fp.source_changed(&stored, &edited));
        assert!(fp.include_changed(&stored, &edited));
    }

    #[test]
    fn full_mode_against_quick_entry_is_changed() {
        let fp = Fingerprinter::new(VerifyMode::Full);
        let stored = FileFingerprint::quick(100, 10);
        let current = full_fp(b"0123456789", 100);
        assert!(fp.source_changed(&stored, &current));
        assert!(fp.include_changed(&stored, &current));
    }

    #[test]
    fn set_mode_switches_policy() {
        let mut fp = Fingerprinter::default();
        assert_eq!(fp.mode(), VerifyMode::Quick);
        fp.set_mode(VerifyMode::Full);
        assert_eq!(fp.mode(), VerifyMode::Full);
        assert_eq!(fp.source_policy(), SourcePolicy::ExistenceOnly);
    }
}
