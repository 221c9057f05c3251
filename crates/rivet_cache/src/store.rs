//! On-disk mirror of cache entries: one JSON document per source file.
//!
//! Files live directly in the cache directory and carry the [`ENTRY_EXT`]
//! extension. The file name is derived from the source path according to a
//! [`NamingScheme`]; the authoritative source key is stored inside the
//! document, so loading never depends on reversing the file name.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rivet_common::{NamingScheme, PathDigest};

use crate::entry::{CacheEntry, ENTRY_FORMAT_VERSION};
use crate::error::CacheError;

/// File extension for persisted cache entries.
pub const ENTRY_EXT: &str = "cache";

/// Reads and writes entry documents in a single cache directory.
#[derive(Debug, Clone)]
pub struct EntryStore {
    /// The cache directory.
    dir: PathBuf,

    /// How file names are derived from source paths.
    naming: NamingScheme,
}

impl EntryStore {
    /// Creates a store rooted at the given directory. Does not touch the filesystem.
    pub fn new(dir: &Path, naming: NamingScheme) -> Self {
        Self {
            dir: dir.to_path_buf(),
            naming,
        }
    }

    /// Returns the cache directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the cache directory if it does not exist.
    pub fn ensure_dir(&self) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| CacheError::Io {
            path: self.dir.clone(),
            source: e,
        })
    }

    /// Returns the file name an entry for `source` is stored under.
    pub fn file_name(&self, source: &Path) -> String {
        let base = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "entry".to_string());
        match self.naming {
            NamingScheme::PathDigest => {
                format!("{base}-{}.{ENTRY_EXT}", PathDigest::of(source))
            }
            NamingScheme::BaseName => format!("{base}.{ENTRY_EXT}"),
        }
    }

    /// Returns the full path an entry for `source` is stored at.
    pub fn entry_path(&self, source: &Path) -> PathBuf {
        self.dir.join(self.file_name(source))
    }

    /// Writes one entry, overwriting any existing file of the same name.
    pub fn write(&self, entry: &CacheEntry) -> Result<PathBuf, CacheError> {
        let path = self.entry_path(&entry.source);
        let json =
            serde_json::to_string_pretty(entry).map_err(|e| CacheError::Serialization {
                path: entry.source.clone(),
                reason: e.to_string(),
            })?;
        std::fs::write(&path, json).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }

    /// Reads and validates one entry document.
    ///
    /// Documents written before the `source` field existed get a key derived
    /// from their file stem.
    pub fn read(&self, path: &Path) -> Result<CacheEntry, CacheError> {
        let content = std::fs::read_to_string(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut entry: CacheEntry =
            serde_json::from_str(&content).map_err(|e| CacheError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if entry.format_version != ENTRY_FORMAT_VERSION {
            return Err(CacheError::VersionMismatch {
                path: path.to_path_buf(),
                expected: ENTRY_FORMAT_VERSION,
                actual: entry.format_version,
            });
        }

        if entry.source.as_os_str().is_empty() {
            if let Some(stem) = path.file_stem() {
                entry.source = PathBuf::from(stem);
            }
        }
        Ok(entry)
    }

    /// Lists every entry file in the cache directory, sorted by path.
    ///
    /// Only directories are skipped. Symlinks and other non-regular entries
    /// carrying the entry extension are listed so that reading them reports
    /// their failure.
    pub fn entry_files(&self) -> Result<Vec<PathBuf>, CacheError> {
        let read_dir = std::fs::read_dir(&self.dir).map_err(|e| CacheError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut files = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry.map_err(|e| CacheError::Io {
                path: self.dir.clone(),
                source: e,
            })?;
            let path = dir_entry.path();
            let file_type = dir_entry.file_type().map_err(|e| CacheError::Io {
                path: path.clone(),
                source: e,
            })?;
            if !file_type.is_dir() && path.extension().is_some_and(|ext| ext == ENTRY_EXT) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Reads every entry file. Fails on the first unreadable or invalid file.
    pub fn read_all(&self) -> Result<Vec<CacheEntry>, CacheError> {
        self.entry_files()?
            .iter()
            .map(|path| self.read(path))
            .collect()
    }

    /// Deletes the cache directory and recreates it empty.
    ///
    /// Succeeds if the directory did not exist.
    pub fn clean(&self) -> Result<(), CacheError> {
        match std::fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(CacheError::Io {
                    path: self.dir.clone(),
                    source: e,
                })
            }
        }
        self.ensure_dir()
    }

    /// Removes entry files whose names are not in `live`.
    ///
    /// Returns the number of files removed.
    pub fn gc(&self, live: &HashSet<String>) -> Result<usize, CacheError> {
        let mut removed = 0;
        for path in self.entry_files()? {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !live.contains(&name) {
                std::fs::remove_file(&path).map_err(|e| CacheError::Io {
                    path: path.clone(),
                    source: e,
                })?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
