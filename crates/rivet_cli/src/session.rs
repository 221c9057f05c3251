//! Shared helpers: locate the workspace, read `rivet.toml`, open the cache.

use std::path::{Path, PathBuf};

use rivet_cache::{CacheOptions, SourcePolicy, StalenessCache, VerifyMode};
use rivet_config::{CacheConfig, RivetConfig};
use tracing::debug;

use crate::GlobalArgs;

/// Resolves the workspace root.
///
/// `--config` may name either `rivet.toml` itself (its parent is the root)
/// or the workspace directory. Without it, the current directory is used.
pub fn resolve_workspace_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match global.config {
        Some(ref config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_file() {
                Ok(p.parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(".")))
            } else {
                Ok(p)
            }
        }
        None => Ok(std::env::current_dir()?),
    }
}

/// Loads configuration from `--config` or the workspace root.
pub fn load_config(global: &GlobalArgs, root: &Path) -> Result<RivetConfig, Box<dyn std::error::Error>> {
    let config = match global.config {
        Some(ref config_path) if Path::new(config_path).is_file() => {
            rivet_config::load_config_file(Path::new(config_path))?
        }
        _ => rivet_config::load_config(root)?,
    };
    Ok(config)
}

/// Maps the `[cache]` table onto cache construction options.
pub fn options_from_config(config: &CacheConfig) -> CacheOptions {
    CacheOptions {
        verify: config.verify,
        naming: config.naming,
        source_policy: if config.check_source_metadata {
            SourcePolicy::Metadata
        } else {
            SourcePolicy::ExistenceOnly
        },
    }
}

/// Opens the workspace cache and loads its entries.
///
/// `full` forces content-hash verification regardless of configuration.
pub fn open_cache(global: &GlobalArgs, full: bool) -> Result<StalenessCache, Box<dyn std::error::Error>> {
    let root = resolve_workspace_root(global)?;
    let config = load_config(global, &root)?;
    let cache_dir = config.cache.cache_dir(&root);
    debug!(
        root = %root.display(),
        dir = %cache_dir.display(),
        verify = %config.cache.verify,
        naming = %config.cache.naming,
        "opening cache"
    );
    let mut cache = StalenessCache::open(&cache_dir, options_from_config(&config.cache))?;
    if full {
        cache.set_verify_mode(VerifyMode::Full);
    }
    cache.load()?;
    Ok(cache)
}
