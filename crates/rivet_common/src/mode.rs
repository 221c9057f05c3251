//! Session-wide switches: how files are verified and how cache files are named.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How file state is captured and compared when checking for staleness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    /// Metadata only (modification time and size). File bytes are never read.
    #[default]
    Quick,
    /// SHA-256 of the full file content. Metadata is recorded but not compared.
    Full,
}

impl VerifyMode {
    /// Returns `true` if this mode reads and hashes file content.
    pub fn hashes_content(self) -> bool {
        matches!(self, VerifyMode::Full)
    }
}

impl fmt::Display for VerifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyMode::Quick => f.write_str("quick"),
            VerifyMode::Full => f.write_str("full"),
        }
    }
}

/// How the on-disk file name of a cache entry is derived from its source path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamingScheme {
    /// `<base>-<path digest>.cache`. Distinct source paths never share a file.
    #[default]
    PathDigest,
    /// `<base>.cache`. Sources sharing a base name overwrite each other.
    BaseName,
}

impl fmt::Display for NamingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingScheme::PathDigest => f.write_str("path-digest"),
            NamingScheme::BaseName => f.write_str("base-name"),
        }
    }
}

/// Error returned when parsing a [`VerifyMode`] or [`NamingScheme`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: '{input}'")]
pub struct ParseModeError {
    /// What was being parsed.
    pub kind: &'static str,
    /// The input string that failed to parse.
    pub input: String,
}

impl FromStr for VerifyMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(VerifyMode::Quick),
            "full" => Ok(VerifyMode::Full),
            _ => Err(ParseModeError {
                kind: "verify mode",
                input: s.to_string(),
            }),
        }
    }
}

impl FromStr for NamingScheme {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "path-digest" => Ok(NamingScheme::PathDigest),
            "base-name" => Ok(NamingScheme::BaseName),
            _ => Err(ParseModeError {
                kind: "naming scheme",
                input: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(VerifyMode::default(), VerifyMode::Quick);
        assert_eq!(NamingScheme::default(), NamingScheme::PathDigest);
    }

    #[test]
    fn parse_verify_mode() {
        assert_eq!("quick".parse::<VerifyMode>().unwrap(), VerifyMode::Quick);
        assert_eq!(" Full ".parse::<VerifyMode>().unwrap(), VerifyMode::Full);
        let err = "paranoid".parse::<VerifyMode>().unwrap_err();
        assert_eq!(err.to_string(), "invalid verify mode: 'paranoid'");
    }

    #[test]
    fn parse_naming_scheme() {
        assert_eq!(
            "base-name".parse::<NamingScheme>().unwrap(),
            NamingScheme::BaseName
        );
        assert!("basename".parse::<NamingScheme>().is_err());
    }

    #[test]
    fn display_matches_parse() {
        for mode in [VerifyMode::Quick, VerifyMode::Full] {
            assert_eq!(mode.to_string().parse::<VerifyMode>().unwrap(), mode);
        }
        for scheme in [NamingScheme::PathDigest, NamingScheme::BaseName] {
            assert_eq!(scheme.to_string().parse::<NamingScheme>().unwrap(), scheme);
        }
    }

    #[test]
    fn serde_names() {
        assert_eq!(serde_json::to_string(&VerifyMode::Full).unwrap(), "\"full\"");
        assert_eq!(
            serde_json::to_string(&NamingScheme::PathDigest).unwrap(),
            "\"path-digest\""
        );
    }

    #[test]
    fn only_full_hashes_content() {
        assert!(VerifyMode::Full.hashes_content());
        assert!(!VerifyMode::Quick.hashes_content());
    }
}
