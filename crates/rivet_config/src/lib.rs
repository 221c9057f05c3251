//! Parsing and validation of the `[cache]` section of `rivet.toml`.
//!
//! The build driver owns the rest of `rivet.toml`; this crate only reads the
//! settings that control where the staleness cache lives and how it verifies
//! files. A missing file or section yields defaults.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE};
pub use types::{CacheConfig, RivetConfig};
