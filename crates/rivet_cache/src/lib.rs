//! Staleness detection and persistence for incremental native builds.
//!
//! Given a source file, its include dependencies, compiler flags, target and
//! profile, [`StalenessCache`] decides whether the compiled object is still
//! current, and records enough metadata after each successful compile to make
//! that decision cheaply in the next session. Entries are mirrored on disk as
//! one JSON document per source file.

#![warn(missing_docs)]

pub mod cache;
pub mod entry;
pub mod error;
pub mod fingerprint;
pub mod freshness;
pub mod store;

pub use cache::{CacheOptions, StalenessCache};
pub use entry::{CacheEntry, FileFingerprint, ENTRY_FORMAT_VERSION};
pub use error::CacheError;
pub use fingerprint::{Fingerprinter, SourcePolicy};
pub use freshness::{Freshness, RebuildReason};
pub use store::{EntryStore, ENTRY_EXT};
pub use rivet_common::{NamingScheme, VerifyMode, DEFAULT_CACHE_DIR};
