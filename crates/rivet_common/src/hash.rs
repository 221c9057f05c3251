//! Content hashing for staleness detection and path digests for cache naming.

use std::fmt;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// A 256-bit SHA-256 digest of a file's bytes.
///
/// Two files with the same `ContentHash` are assumed to have identical
/// content. Serialized as a 64-character lowercase hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Computes a content hash from a byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Computes a content hash by draining a reader to EOF.
    pub fn from_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut hasher = Sha256::new();
        io::copy(&mut reader, &mut hasher)?;
        Ok(Self(hasher.finalize().into()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}

/// Error returned when a string is not a valid hex-encoded [`ContentHash`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid content hash: '{input}'")]
pub struct ParseHashError {
    /// The input string that failed to parse.
    pub input: String,
}

impl FromStr for ContentHash {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| ParseHashError {
            input: s.to_string(),
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// A 64-bit XXH3 digest of a path's bytes.
///
/// Used to give cache files collision-resistant names: two sources that
/// share a base name but live in different directories get different
/// digests. Not a content hash and not stable across platforms with
/// different path encodings.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathDigest(u64);

impl PathDigest {
    /// Computes the digest of a path exactly as given (no canonicalization).
    pub fn of(path: &Path) -> Self {
        Self(xxhash_rust::xxh3::xxh3_64(
            path.as_os_str().as_encoded_bytes(),
        ))
    }
}

impl fmt::Display for PathDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Debug for PathDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PathDigest({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = ContentHash::from_bytes(b"int main() {}");
        let b = ContentHash::from_bytes(b"int main() {}");
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_differ() {
        let a = ContentHash::from_bytes(b"#define A 1");
        let b = ContentHash::from_bytes(b"#define A 2");
        assert_ne!(a, b);
    }

    #[test]
    fn reader_matches_bytes() {
        let data = b"static int x = 42;\n".repeat(1000);
        let from_reader = ContentHash::from_reader(&data[..]).unwrap();
        assert_eq!(from_reader, ContentHash::from_bytes(&data));
    }

    #[test]
    fn known_digest_of_empty_input() {
        let h = ContentHash::from_bytes(b"");
        assert_eq!(
            h.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn display_is_64_hex_chars() {
        let s = ContentHash::from_bytes(b"test").to_string();
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn parse_rejects_bad_hex() {
        assert!("xyz".parse::<ContentHash>().is_err());
        assert!("abcd".parse::<ContentHash>().is_err());
        let err = "quick_check".parse::<ContentHash>().unwrap_err();
        assert_eq!(err.input, "quick_check");
    }

    #[test]
    fn debug_abbreviated() {
        let s = format!("{:?}", ContentHash::from_bytes(b"test"));
        assert!(s.starts_with("ContentHash("));
        assert!(s.ends_with("..)"));
    }

    #[test]
    fn serde_as_hex_string() {
        let h = ContentHash::from_bytes(b"serde test");
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, format!("\"{h}\""));
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }

    #[test]
    fn path_digest_distinguishes_directories() {
        let a = PathDigest::of(Path::new("src/net/util.c"));
        let b = PathDigest::of(Path::new("src/fs/util.c"));
        assert_ne!(a, b);
        assert_eq!(a, PathDigest::of(Path::new("src/net/util.c")));
    }

    #[test]
    fn path_digest_display_width() {
        let s = PathDigest::of(Path::new("a.c")).to_string();
        assert_eq!(s.len(), 16);
    }
}
