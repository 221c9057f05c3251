//! `rivet-cache status` — list recorded entries.

use rivet_cache::{CacheEntry, StalenessCache};

use crate::session::open_cache;
use crate::{GlobalArgs, ReportFormat};

/// Runs `rivet-cache status`.
pub fn run(format: ReportFormat, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let cache = open_cache(global, false)?;
    let entries = sorted_entries(&cache);

    match format {
        ReportFormat::Text => {
            if !global.quiet {
                println!(
                    "{} entries in {}",
                    entries.len(),
                    cache.cache_dir().display()
                );
                for entry in &entries {
                    println!("{}", render_text(entry));
                }
            }
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(0)
}

fn sorted_entries(cache: &StalenessCache) -> Vec<&CacheEntry> {
    let mut entries: Vec<&CacheEntry> = cache.entries().map(|(_, e)| e).collect();
    entries.sort_by(|a, b| a.source.cmp(&b.source));
    entries
}

fn render_text(entry: &CacheEntry) -> String {
    let verified = if entry.source_fingerprint.content_hash.is_some() {
        "full"
    } else {
        "quick"
    };
    format!(
        "  {}  target={} profile={} includes={} flags=[{}] verify={} built_at={}",
        entry.source.display(),
        entry.target,
        entry.profile,
        entry.include_fingerprints.len(),
        entry.compiler_flags.join(" "),
        verified,
        entry.built_at,
    )
}
