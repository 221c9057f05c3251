//! `rivet-cache clean` and `rivet-cache gc`.

use rivet_cache::StalenessCache;

use crate::session::{load_config, options_from_config, open_cache, resolve_workspace_root};
use crate::GlobalArgs;

/// Runs `rivet-cache clean`.
///
/// Does not load entries first, so a cache holding malformed files can
/// still be wiped.
pub fn clean(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let root = resolve_workspace_root(global)?;
    let config = load_config(global, &root)?;
    let cache = StalenessCache::open(
        &config.cache.cache_dir(&root),
        options_from_config(&config.cache),
    )?;
    cache.clean()?;

    if !global.quiet {
        eprintln!("     Cleaned {}", cache.cache_dir().display());
    }
    Ok(0)
}

/// Runs `rivet-cache gc`.
pub fn gc(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let cache = open_cache(global, false)?;
    let removed = cache.gc()?;

    if !global.quiet {
        eprintln!("     Removed {removed} stale cache file(s)");
    }
    Ok(0)
}
