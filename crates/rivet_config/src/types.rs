//! Configuration types deserialized from `rivet.toml`.

use std::path::{Path, PathBuf};

use rivet_common::{NamingScheme, VerifyMode, DEFAULT_CACHE_DIR};
use serde::Deserialize;

/// The parts of `rivet.toml` this crate understands. Unknown tables are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RivetConfig {
    /// Staleness cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// The `[cache]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Cache directory, relative to the workspace root.
    #[serde(default = "default_dir")]
    pub dir: String,

    /// Verification mode: `"quick"` or `"full"`.
    #[serde(default)]
    pub verify: VerifyMode,

    /// Entry file naming: `"path-digest"` or `"base-name"`.
    #[serde(default)]
    pub naming: NamingScheme,

    /// In quick mode, also compare the source file's mtime and size.
    #[serde(default)]
    pub check_source_metadata: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            verify: VerifyMode::default(),
            naming: NamingScheme::default(),
            check_source_metadata: false,
        }
    }
}

impl CacheConfig {
    /// Resolves the cache directory against a workspace root.
    pub fn cache_dir(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(&self.dir)
    }
}

fn default_dir() -> String {
    DEFAULT_CACHE_DIR.to_string()
}
