//! Record identifiers and sharded storage paths.
//!
//! Donors, donations, requests and transfusions are identified by a v4 UUID held in a *canonical*
//! form: 32 lowercase hexadecimal characters without hyphens. The same value derives the record's
//! directory:
//!
//! `parent_dir/<id[0..2]>/<id[2..4]>/<id>/`
//!
//! Blood units are the exception; they are keyed by bag number (see [`crate::identifiers`]).

use crate::{BloodBankError, BloodBankResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

pub use ::uuid::Uuid;

/// Canonical record identifier (32 lowercase hex characters, no hyphens).
///
/// Once constructed the contained UUID is guaranteed to be canonical, so path derivation is
/// deterministic across the codebase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(Uuid);

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordId {
    /// Generates a new random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates an externally supplied identifier.
    ///
    /// Other common UUID spellings (hyphenated, uppercase) are rejected rather than normalised.
    ///
    /// # Errors
    ///
    /// Returns [`BloodBankError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> BloodBankResult<Self> {
        if !Self::is_canonical(input) {
            return Err(BloodBankError::InvalidInput(format!(
                "record id must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| BloodBankError::InvalidInput(e.to_string()))
    }

    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is exactly 32 lowercase hex characters.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns `parent_dir/<s1>/<s2>/<id>/` where `s1`/`s2` are the first four hex characters.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for RecordId {
    type Err = BloodBankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordId::parse(s)
    }
}

impl serde::Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_canonical_id() {
        let id = RecordId::new();
        assert!(RecordId::is_canonical(&id.to_string()));
    }

    #[test]
    fn test_parse_rejects_hyphenated_uuid() {
        let result = RecordId::parse("550e8400-e29b-41d4-a716-446655440000");
        match result {
            Err(BloodBankError::InvalidInput(msg)) => {
                assert!(msg.contains("32 lowercase hex characters"));
            }
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_parse_rejects_uppercase_and_bad_length() {
        assert!(RecordId::parse("550E8400E29B41D4A716446655440000").is_err());
        assert!(RecordId::parse("550e8400e29b41d4a71644665544000").is_err());
        assert!(RecordId::parse("").is_err());
    }

    #[test]
    fn test_sharded_dir_structure() {
        let id = RecordId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let sharded = id.sharded_dir(Path::new("/data/donors"));

        assert_eq!(
            sharded,
            PathBuf::from("/data/donors/55/0e/550e8400e29b41d4a716446655440000")
        );
    }

    #[test]
    fn test_serde_round_trip_through_yaml() {
        let id = RecordId::parse("00112233445566778899aabbccddeeff").unwrap();
        let yaml = serde_yaml::to_string(&id).unwrap();
        assert_eq!(yaml.trim(), "00112233445566778899aabbccddeeff");
        let back: RecordId = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, id);
    }
}
