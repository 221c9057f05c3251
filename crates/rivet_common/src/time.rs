//! Unix-time helpers. All persisted timestamps are whole seconds since the epoch.

use std::time::{SystemTime, UNIX_EPOCH};

/// Converts a [`SystemTime`] to signed seconds since the unix epoch.
///
/// Times before the epoch yield negative values rather than an error.
pub fn unix_seconds(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}

/// Returns the current time as seconds since the unix epoch.
pub fn unix_now() -> i64 {
    unix_seconds(SystemTime::now())
}
