//! `rivet-cache` — inspect and maintain a rivet staleness cache by hand.
//!
//! The build driver links `rivet_cache` directly; this binary exposes the
//! same operations for debugging: `status` lists recorded entries, `check`
//! explains whether an object is stale, `update` records a build, and
//! `clean`/`gc` maintain the cache directory.

#![warn(missing_docs)]

mod build;
mod maintenance;
mod session;
mod status;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Rivet build cache inspector.
#[derive(Parser, Debug)]
#[command(name = "rivet-cache", version, about = "Inspect and maintain the rivet build cache")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to `rivet.toml`, or to the workspace directory containing it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List recorded cache entries.
    Status {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Report whether an object must be rebuilt (exit 0 = fresh, 1 = stale).
    Check(CheckArgs),
    /// Record a successful build of a source file and save the cache.
    Update(BuildArgs),
    /// Delete every cache entry on disk.
    Clean,
    /// Delete cache files not named for their entry under the current naming scheme.
    Gc,
}

/// Arguments for the `rivet-cache check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Compiled object file for the source.
    #[arg(long)]
    pub object: PathBuf,

    /// Source, includes, flags, target, and profile.
    #[command(flatten)]
    pub build: BuildArgs,
}

/// The inputs that identify one compiled unit.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Source file, as the build driver names it.
    pub source: PathBuf,

    /// Include dependency (repeatable, order-significant).
    #[arg(short = 'I', long = "include")]
    pub includes: Vec<PathBuf>,

    /// Compiler flag (repeatable, order-significant), e.g. `--flag=-O2`.
    #[arg(long = "flag", allow_hyphen_values = true)]
    pub flags: Vec<String>,

    /// Build target identifier.
    #[arg(long)]
    pub target: String,

    /// Build profile identifier.
    #[arg(long)]
    pub profile: String,

    /// Verify by content hash instead of the configured mode.
    #[arg(long)]
    pub full: bool,
}

/// Status output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a config file or workspace directory.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Status { format } => status::run(format, &global),
        Command::Check(ref args) => build::check(args, &global),
        Command::Update(ref args) => build::update(args, &global),
        Command::Clean => maintenance::clean(&global),
        Command::Gc => maintenance::gc(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(2);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the flag-derived level.
fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(global)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_log_level(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_status_default() {
        let cli = Cli::parse_from(["rivet-cache", "status"]);
        match cli.command {
            Command::Status { format } => assert_eq!(format, ReportFormat::Text),
            _ => panic!("expected Status command"),
        }
    }

    #[test]
    fn parse_status_json() {
        let cli = Cli::parse_from(["rivet-cache", "status", "--format", "json"]);
        match cli.command {
            Command::Status { format } => assert_eq!(format, ReportFormat::Json),
            _ => panic!("expected Status command"),
        }
    }

    #[test]
    fn parse_check_with_hyphenated_flags() {
        let cli = Cli::parse_from([
            "rivet-cache",
            "check",
            "src/a.c",
            "--object",
            "build/a.o",
            "-I",
            "include/a.h",
            "--include",
            "include/b.h",
            "--flag",
            "-O2",
            "--flag=-Wall",
            "--target",
            "x86_64",
            "--profile",
            "release",
        ]);
        match cli.command {
            Command::Check(ref args) => {
                assert_eq!(args.object, PathBuf::from("build/a.o"));
                assert_eq!(args.build.source, PathBuf::from("src/a.c"));
                assert_eq!(
                    args.build.includes,
                    vec![PathBuf::from("include/a.h"), PathBuf::from("include/b.h")]
                );
                assert_eq!(args.build.flags, vec!["-O2", "-Wall"]);
                assert_eq!(args.build.target, "x86_64");
                assert_eq!(args.build.profile, "release");
                assert!(!args.build.full);
            }
            _ => panic!("expected Check command"),
        }
    }

    #[test]
    fn parse_update_full() {
        let cli = Cli::parse_from([
            "rivet-cache",
            "update",
            "a.c",
            "--target",
            "aarch64",
            "--profile",
            "debug",
            "--full",
        ]);
        match cli.command {
            Command::Update(ref args) => {
                assert!(args.full);
                assert!(args.includes.is_empty());
                assert!(args.flags.is_empty());
            }
            _ => panic!("expected Update command"),
        }
    }

    #[test]
    fn update_requires_target_and_profile() {
        assert!(Cli::try_parse_from(["rivet-cache", "update", "a.c"]).is_err());
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["rivet-cache", "--quiet", "--config", "/ws/rivet.toml", "clean"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("/ws/rivet.toml"));
        assert!(matches!(cli.command, Command::Clean));
    }

    #[test]
    fn log_level_follows_flags() {
        let mut global = GlobalArgs {
            quiet: false,
            verbose: false,
            config: None,
        };
        assert_eq!(default_log_level(&global), "warn");
        global.verbose = true;
        assert_eq!(default_log_level(&global), "debug");
        global.quiet = true;
        assert_eq!(default_log_level(&global), "error");
    }
}
