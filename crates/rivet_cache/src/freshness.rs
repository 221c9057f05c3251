//! The outcome of a staleness check.

use std::fmt;
use std::path::PathBuf;

/// Why an object must be rebuilt. Variants are listed in check order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildReason {
    /// The object file does not exist.
    ObjectMissing,
    /// No cache entry has been recorded for the source.
    NotCached,
    /// The requested target differs from the recorded one.
    TargetChanged,
    /// The requested profile differs from the recorded one.
    ProfileChanged,
    /// The compiler flags differ from the recorded sequence.
    FlagsChanged,
    /// The source could not be fingerprinted.
    SourceUnreadable,
    /// The source fingerprint differs from the recorded one.
    SourceChanged,
    /// An include is not part of the recorded entry.
    IncludeAdded(PathBuf),
    /// An include could not be fingerprinted.
    IncludeUnreadable(PathBuf),
    /// An include fingerprint differs from the recorded one.
    IncludeChanged(PathBuf),
    /// The recorded entry lists includes that were not supplied.
    IncludeRemoved {
        /// Number of includes in the recorded entry.
        recorded: usize,
        /// Number of includes supplied to the check.
        current: usize,
    },
}

impl RebuildReason {
    /// Returns `true` for flag, target, or profile mismatches.
    pub fn is_configuration_drift(&self) -> bool {
        matches!(
            self,
            RebuildReason::TargetChanged | RebuildReason::ProfileChanged | RebuildReason::FlagsChanged
        )
    }
}

impl fmt::Display for RebuildReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebuildReason::ObjectMissing => f.write_str("object file does not exist"),
            RebuildReason::NotCached => f.write_str("no cache entry found"),
            RebuildReason::TargetChanged => f.write_str("build target changed"),
            RebuildReason::ProfileChanged => f.write_str("build profile changed"),
            RebuildReason::FlagsChanged => f.write_str("compiler flags changed"),
            RebuildReason::SourceUnreadable => f.write_str("source file could not be read"),
            RebuildReason::SourceChanged => f.write_str("source file changed"),
            RebuildReason::IncludeAdded(p) => write!(f, "new include file {}", p.display()),
            RebuildReason::IncludeUnreadable(p) => {
                write!(f, "include file {} could not be read", p.display())
            }
            RebuildReason::IncludeChanged(p) => write!(f, "include file {} changed", p.display()),
            RebuildReason::IncludeRemoved { recorded, current } => {
                write!(f, "number of includes changed ({recorded} -> {current})")
            }
        }
    }
}

/// Result of a staleness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// The object is current; reuse it.
    Fresh,
    /// The object must be rebuilt.
    Stale(RebuildReason),
}

impl Freshness {
    /// Returns `true` if the object must be rebuilt.
    pub fn is_stale(&self) -> bool {
        matches!(self, Freshness::Stale(_))
    }

    /// Returns the rebuild reason, if stale.
    pub fn reason(&self) -> Option<&RebuildReason> {
        match self {
            Freshness::Fresh => None,
            Freshness::Stale(reason) => Some(reason),
        }
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Freshness::Fresh => f.write_str("up to date"),
            Freshness::Stale(reason) => write!(f, "stale: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_has_no_reason() {
        assert!(!Freshness::Fresh.is_stale());
        assert!(Freshness::Fresh.reason().is_none());
        assert_eq!(Freshness::Fresh.to_string(), "up to date");
    }

    #[test]
    fn stale_display_includes_reason() {
        let f = Freshness::Stale(RebuildReason::IncludeAdded(PathBuf::from("b.h")));
        assert!(f.is_stale());
        assert_eq!(f.to_string(), "stale: new include file b.h");
    }

    #[test]
    fn include_removed_display() {
        let r = RebuildReason::IncludeRemoved {
            recorded: 3,
            current: 2,
        };
        assert_eq!(r.to_string(), "number of includes changed (3 -> 2)");
    }

    #[test]
    fn configuration_drift_classification() {
        assert!(RebuildReason::FlagsChanged.is_configuration_drift());
        assert!(RebuildReason::TargetChanged.is_configuration_drift());
        assert!(RebuildReason::ProfileChanged.is_configuration_drift());
        assert!(!RebuildReason::SourceChanged.is_configuration_drift());
        assert!(!RebuildReason::ObjectMissing.is_configuration_drift());
    }
}
