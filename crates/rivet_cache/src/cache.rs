//! Session-owned staleness cache.
//!
//! [`StalenessCache`] holds the in-memory entry map for one build session and
//! ties together the fingerprinter and the on-disk [`EntryStore`]. The build
//! driver calls [`needs_rebuild`](StalenessCache::needs_rebuild) before each
//! compile, [`update`](StalenessCache::update) after each successful compile,
//! [`load`](StalenessCache::load) at session start and
//! [`save`](StalenessCache::save) at session end.
//!
//! There is no internal locking. Drivers that compile in parallel must
//! serialize `update` calls themselves, e.g. behind a `Mutex`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use rivet_common::{unix_now, NamingScheme, VerifyMode, DEFAULT_CACHE_DIR};
use tracing::{debug, info, warn};

use crate::entry::{CacheEntry, FileFingerprint, ENTRY_FORMAT_VERSION};
use crate::error::CacheError;
use crate::fingerprint::{Fingerprinter, SourcePolicy};
use crate::freshness::{Freshness, RebuildReason};
use crate::store::EntryStore;

/// Construction-time options for a [`StalenessCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheOptions {
    /// Initial verification mode.
    pub verify: VerifyMode,
    /// How entry files are named on disk.
    pub naming: NamingScheme,
    /// How the source file is compared in quick mode.
    pub source_policy: SourcePolicy,
}

/// Staleness cache for one build session.
#[derive(Debug)]
pub struct StalenessCache {
    /// On-disk mirror.
    store: EntryStore,

    /// Entries keyed by source path as passed by the driver.
    entries: HashMap<PathBuf, CacheEntry>,

    /// Captures and compares fingerprints under the active mode.
    fingerprinter: Fingerprinter,
}

impl StalenessCache {
    /// Opens the cache at `<workspace_root>/.rivet_cache` with default options.
    ///
    /// Creates the directory if absent. Does not load existing entries.
    pub fn new(workspace_root: &Path) -> Result<Self, CacheError> {
        Self::open(&workspace_root.join(DEFAULT_CACHE_DIR), CacheOptions::default())
    }

    /// Opens the cache at an explicit directory.
    ///
    /// Creates the directory if absent. Does not load existing entries.
    pub fn open(cache_dir: &Path, options: CacheOptions) -> Result<Self, CacheError> {
        let store = EntryStore::new(cache_dir, options.naming);
        store.ensure_dir()?;
        Ok(Self {
            store,
            entries: HashMap::new(),
            fingerprinter: Fingerprinter::new(options.verify)
                .with_source_policy(options.source_policy),
        })
    }

    /// Returns the cache directory.
    pub fn cache_dir(&self) -> &Path {
        self.store.dir()
    }

    /// Returns the active verification mode.
    pub fn verify_mode(&self) -> VerifyMode {
        self.fingerprinter.mode()
    }

    /// Switches the verification mode for all subsequent checks and updates.
    ///
    /// The mode is not stored per entry: entries written under the other
    /// mode are compared with the new mode's policy from now on.
    pub fn set_verify_mode(&mut self, mode: VerifyMode) {
        debug!(%mode, "verification mode changed");
        self.fingerprinter.set_mode(mode);
    }

    /// Enables quick (metadata) checks, or full (content hash) checks when `false`.
    pub fn set_quick_check(&mut self, enable: bool) {
        self.set_verify_mode(if enable {
            VerifyMode::Quick
        } else {
            VerifyMode::Full
        });
    }

    /// Returns `true` if `object` must be rebuilt from `source`.
    ///
    /// Never fails: any I/O problem while checking counts as a change.
    pub fn needs_rebuild(
        &self,
        source: &Path,
        object: &Path,
        includes: &[PathBuf],
        compiler_flags: &[String],
        target: &str,
        profile: &str,
    ) -> bool {
        self.check(source, object, includes, compiler_flags, target, profile)
            .is_stale()
    }

    /// Like [`needs_rebuild`](Self::needs_rebuild), but reports the first
    /// reason found.
    ///
    /// Checks run in a fixed order: object, entry, configuration, source,
    /// each include in the order given, then include count.
    pub fn check(
        &self,
        source: &Path,
        object: &Path,
        includes: &[PathBuf],
        compiler_flags: &[String],
        target: &str,
        profile: &str,
    ) -> Freshness {
        let verdict = self.evaluate(source, object, includes, compiler_flags, target, profile);
        match &verdict {
            Freshness::Fresh => debug!(source = %source.display(), "up to date"),
            Freshness::Stale(reason) => {
                debug!(source = %source.display(), %reason, "needs rebuild")
            }
        }
        verdict
    }

    fn evaluate(
        &self,
        source: &Path,
        object: &Path,
        includes: &[PathBuf],
        compiler_flags: &[String],
        target: &str,
        profile: &str,
    ) -> Freshness {
        use RebuildReason::*;

        if !object.exists() {
            return Freshness::Stale(ObjectMissing);
        }

        let Some(entry) = self.entries.get(source) else {
            return Freshness::Stale(NotCached);
        };

        if entry.target != target {
            return Freshness::Stale(TargetChanged);
        }
        if entry.profile != profile {
            return Freshness::Stale(ProfileChanged);
        }
        if entry.compiler_flags != compiler_flags {
            return Freshness::Stale(FlagsChanged);
        }

        match self.fingerprinter.fingerprint(source) {
            Err(e) => {
                warn!(error = %e, "treating unreadable source as changed");
                return Freshness::Stale(SourceUnreadable);
            }
            Ok(current) => {
                if self
                    .fingerprinter
                    .source_changed(&entry.source_fingerprint, &current)
                {
                    return Freshness::Stale(SourceChanged);
                }
            }
        }

        for include in includes {
            let Some(stored) = entry.include(include) else {
                return Freshness::Stale(IncludeAdded(include.clone()));
            };
            match self.fingerprinter.fingerprint(include) {
                Err(e) => {
                    warn!(error = %e, "treating unreadable include as changed");
                    return Freshness::Stale(IncludeUnreadable(include.clone()));
                }
                Ok(current) => {
                    if self.fingerprinter.include_changed(stored, &current) {
                        return Freshness::Stale(IncludeChanged(include.clone()));
                    }
                }
            }
        }

        if entry.include_fingerprints.len() != includes.len() {
            return Freshness::Stale(IncludeRemoved {
                recorded: entry.include_fingerprints.len(),
                current: includes.len(),
            });
        }

        Freshness::Fresh
    }

    /// Records a successful build of `source`.
    ///
    /// Fingerprints every include and the source under the active mode, then
    /// replaces any previous entry. If any file cannot be fingerprinted the
    /// error names it and the existing entry is left untouched.
    pub fn update(
        &mut self,
        source: &Path,
        includes: &[PathBuf],
        compiler_flags: &[String],
        target: &str,
        profile: &str,
    ) -> Result<(), CacheError> {
        let mut include_fingerprints = BTreeMap::new();
        for include in includes {
            let fp = self.fingerprint_for_update(include)?;
            include_fingerprints.insert(include.clone(), fp);
        }
        let source_fingerprint = self.fingerprint_for_update(source)?;

        let entry = CacheEntry {
            format_version: ENTRY_FORMAT_VERSION,
            source: source.to_path_buf(),
            source_fingerprint,
            include_fingerprints,
            compiler_flags: compiler_flags.to_vec(),
            target: target.to_string(),
            profile: profile.to_string(),
            built_at: unix_now(),
        };
        debug!(
            source = %source.display(),
            includes = entry.include_fingerprints.len(),
            "cache entry updated"
        );
        self.entries.insert(source.to_path_buf(), entry);
        Ok(())
    }

    fn fingerprint_for_update(&self, path: &Path) -> Result<FileFingerprint, CacheError> {
        self.fingerprinter
            .fingerprint(path)
            .map_err(|e| CacheError::Fingerprint {
                path: path.to_path_buf(),
                source: Box::new(e),
            })
    }

    /// Writes every in-memory entry to the cache directory.
    ///
    /// Entries are written in source-path order. The first failed write
    /// aborts; files already written stay on disk. Returns the number of
    /// entries written.
    pub fn save(&self) -> Result<usize, CacheError> {
        let mut sources: Vec<&PathBuf> = self.entries.keys().collect();
        sources.sort();

        let mut seen = HashMap::new();
        for source in &sources {
            let name = self.store.file_name(source);
            if let Some(previous) = seen.insert(name.clone(), *source) {
                warn!(
                    file = %name,
                    first = %previous.display(),
                    second = %source.display(),
                    "cache file name collision, later entry overwrites earlier"
                );
            }
            self.store.write(&self.entries[*source])?;
        }

        info!(entries = sources.len(), dir = %self.cache_dir().display(), "cache saved");
        Ok(sources.len())
    }

    /// Reads every entry file from the cache directory into memory.
    ///
    /// Loaded entries replace in-memory entries with the same source key;
    /// others are kept. If any file is unreadable, malformed, or of an
    /// unsupported format version, nothing is inserted and the error names
    /// the file. Returns the number of entries loaded.
    pub fn load(&mut self) -> Result<usize, CacheError> {
        let loaded = self.store.read_all()?;
        let count = loaded.len();
        for entry in loaded {
            self.entries.insert(entry.source.clone(), entry);
        }
        info!(entries = count, dir = %self.cache_dir().display(), "cache loaded");
        Ok(count)
    }

    /// Deletes the cache directory and recreates it empty.
    ///
    /// In-memory entries are not affected; call [`clear`](Self::clear) as well
    /// to forget them.
    pub fn clean(&self) -> Result<(), CacheError> {
        self.store.clean()?;
        info!(dir = %self.cache_dir().display(), "cache cleaned");
        Ok(())
    }

    /// Discards all in-memory entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Deletes entry files that no in-memory entry maps to.
    ///
    /// Returns the number of files removed.
    pub fn gc(&self) -> Result<usize, CacheError> {
        let live: HashSet<String> = self
            .entries
            .keys()
            .map(|source| self.store.file_name(source))
            .collect();
        let removed = self.store.gc(&live)?;
        info!(removed, "cache garbage collected");
        Ok(removed)
    }

    /// Returns the entry recorded for `source`.
    pub fn get(&self, source: &Path) -> Option<&CacheEntry> {
        self.entries.get(source)
    }

    /// Removes and returns the entry for `source`. Does not touch disk.
    pub fn remove(&mut self, source: &Path) -> Option<CacheEntry> {
        self.entries.remove(source)
    }

    /// Iterates over all in-memory entries in arbitrary order.
    pub fn entries(&self) -> impl Iterator<Item = (&PathBuf, &CacheEntry)> {
        self.entries.iter()
    }

    /// Returns the number of in-memory entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no in-memory entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the path the entry for `source` is (or would be) saved at.
    pub fn entry_path(&self, source: &Path) -> PathBuf {
        self.store.entry_path(source)
    }
}
