//! Shared foundational types used across the rivet build-cache crates.
//!
//! This crate provides content hashing, path digests for cache file naming,
//! the verification-mode and naming-scheme switches, and unix-time helpers.

#![warn(missing_docs)]

pub mod hash;
pub mod mode;
pub mod time;

/// Default cache directory name, relative to the workspace root.
pub const DEFAULT_CACHE_DIR: &str = ".rivet_cache";

pub use hash::{ContentHash, ParseHashError, PathDigest};
pub use mode::{NamingScheme, ParseModeError, VerifyMode};
pub use time::{unix_now, unix_seconds};
