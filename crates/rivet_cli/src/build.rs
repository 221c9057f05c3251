//! `rivet-cache check` and `rivet-cache update`.

use std::path::Path;

use rivet_cache::Freshness;

use crate::session::open_cache;
use crate::{BuildArgs, CheckArgs, GlobalArgs};

/// Runs `rivet-cache check`. Returns 0 when the object is fresh, 1 when stale.
pub fn check(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let build = &args.build;
    let cache = open_cache(global, build.full)?;

    let verdict = cache.check(
        &build.source,
        &args.object,
        &build.includes,
        &build.flags,
        &build.target,
        &build.profile,
    );

    if !global.quiet {
        println!("{}", render_verdict(&build.source, &verdict));
    }
    Ok(if verdict.is_stale() { 1 } else { 0 })
}

/// Formats a verdict line, flagging flag/target/profile mismatches.
fn render_verdict(source: &Path, verdict: &Freshness) -> String {
    match verdict.reason() {
        Some(reason) if reason.is_configuration_drift() => {
            format!("{}: {verdict} (configuration drift)", source.display())
        }
        _ => format!("{}: {verdict}", source.display()),
    }
}

/// Runs `rivet-cache update`: records the build, then saves the cache.
pub fn update(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut cache = open_cache(global, args.full)?;
    cache.update(
        &args.source,
        &args.includes,
        &args.flags,
        &args.target,
        &args.profile,
    )?;
    cache.save()?;

    if !global.quiet {
        eprintln!(
            "     Recorded {} -> {}",
            args.source.display(),
            cache.entry_path(&args.source).display()
        );
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn global(root: &TempDir) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(root.path().to_str().unwrap().to_string()),
        }
    }

    fn build_args(root: &TempDir, flags: &[&str]) -> BuildArgs {
        BuildArgs {
            source: root.path().join("a.c"),
            includes: vec![root.path().join("a.h")],
            flags: flags.iter().map(|s| s.to_string()).collect(),
            target: "x86_64".to_string(),
            profile: "release".to_string(),
            full: false,
        }
    }

    #[test]
    fn update_then_check_across_invocations() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join("a.c"), "int a;\n").unwrap();
        std::fs::write(root.path().join("a.h"), "#pragma once\n").unwrap();
        let object: PathBuf = root.path().join("a.o");
        std::fs::write(&object, "obj").unwrap();

        let g = global(&root);
        let check_args = |flags: &[&str]| CheckArgs {
            object: object.clone(),
            build: build_args(&root, flags),
        };

        assert_eq!(check(&check_args(&["-O2"]), &g).unwrap(), 1);
        assert_eq!(update(&build_args(&root, &["-O2"]), &g).unwrap(), 0);
        assert_eq!(check(&check_args(&["-O2"]), &g).unwrap(), 0);
        assert_eq!(check(&check_args(&["-O3"]), &g).unwrap(), 1);
    }

    #[test]
    fn verdict_line_marks_configuration_drift() {
        use rivet_cache::RebuildReason;

        let source = Path::new("src/a.c");
        assert_eq!(render_verdict(source, &Freshness::Fresh), "src/a.c: up to date");
        assert_eq!(
            render_verdict(source, &Freshness::Stale(RebuildReason::FlagsChanged)),
            "src/a.c: stale: compiler flags changed (configuration drift)"
        );
        assert_eq!(
            render_verdict(source, &Freshness::Stale(RebuildReason::SourceChanged)),
            "src/a.c: stale: source file changed"
        );
    }

    #[test]
    fn update_missing_include_fails() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join("a.c"), "int a;\n").unwrap();
        let err = update(&build_args(&root, &[]), &global(&root)).unwrap_err();
        assert!(err.to_string().contains("a.h"));
    }
}
