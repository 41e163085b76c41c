//! Bag number generation and validation.
//!
//! A bag number identifies a physical blood unit:
//!
//! `BB-<YYYYMMDD>-<6 chars of 0-9A-Z>`
//!
//! Example: `BB-20240101-7Q2XK9`
//!
//! The date segment is the UTC calendar date at generation. The random segment comes from a
//! non-cryptographic generator; uniqueness is enforced by storage, which creates the unit's
//! directory exclusively and retries with a fresh number on collision (see
//! [`crate::repositories::inventory`]).

use crate::{BloodBankError, BloodBankResult};
use chrono::{NaiveDate, Utc};
use rand::Rng;
use std::{fmt, str::FromStr};

pub const BAG_NUMBER_PREFIX: &str = "BB";
pub const BAG_RANDOM_LEN: usize = 6;
const BAG_DATE_LEN: usize = 8;
const BASE36_UPPER: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Validated bag number.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BagNumber(String);

impl BagNumber {
    /// Validates a bag number string.
    ///
    /// # Errors
    ///
    /// Returns [`BloodBankError::InvalidInput`] unless `input` matches
    /// `BB-<8 digits>-<6 of [A-Z0-9]>`.
    pub fn parse(input: &str) -> BloodBankResult<Self> {
        if Self::is_well_formed(input) {
            return Ok(Self(input.to_owned()));
        }
        Err(BloodBankError::InvalidInput(format!(
            "bag number must look like BB-YYYYMMDD-XXXXXX, got: '{}'",
            input
        )))
    }

    /// Purely syntactic check of the bag number shape.
    pub fn is_well_formed(input: &str) -> bool {
        let mut parts = input.split('-');
        let (Some(prefix), Some(date), Some(random), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };

        prefix == BAG_NUMBER_PREFIX
            && date.len() == BAG_DATE_LEN
            && date.bytes().all(|b| b.is_ascii_digit())
            && random.len() == BAG_RANDOM_LEN
            && random
                .bytes()
                .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BagNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BagNumber {
    type Err = BloodBankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BagNumber::parse(s)
    }
}

impl AsRef<str> for BagNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for BagNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for BagNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BagNumber::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Generates a bag number dated today (UTC).
pub fn generate_bag_number() -> BagNumber {
    generate_bag_number_with(Utc::now().date_naive(), &mut rand::thread_rng())
}

/// Generates a bag number for `date` using the supplied random source.
pub fn generate_bag_number_with(date: NaiveDate, rng: &mut impl Rng) -> BagNumber {
    let random: String = (0..BAG_RANDOM_LEN)
        .map(|_| char::from(BASE36_UPPER[rng.gen_range(0..BASE36_UPPER.len())]))
        .collect();
    BagNumber(format!(
        "{}-{}-{}",
        BAG_NUMBER_PREFIX,
        date.format("%Y%m%d"),
        random
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_bag_number_is_well_formed() {
        for _ in 0..100 {
            let bag = generate_bag_number();
            assert!(BagNumber::is_well_formed(bag.as_str()), "{bag}");
        }
    }

    #[test]
    fn test_generated_bag_number_carries_today() {
        let today = Utc::now().date_naive().format("%Y%m%d").to_string();
        let bag = generate_bag_number();
        assert_eq!(&bag.as_str()[3..11], today);
    }

    #[test]
    fn test_consecutive_bag_numbers_differ() {
        assert_ne!(generate_bag_number(), generate_bag_number());
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let a = generate_bag_number_with(date, &mut StdRng::seed_from_u64(7));
        let b = generate_bag_number_with(date, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("BB-20240101-"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(BagNumber::parse("BB-20240101-ABC12Z").is_ok());
        assert!(BagNumber::parse("BB-20240101-abc12z").is_err());
        assert!(BagNumber::parse("XX-20240101-ABC12Z").is_err());
        assert!(BagNumber::parse("BB-2024011-ABC12Z").is_err());
        assert!(BagNumber::parse("BB-20240101-ABC12").is_err());
        assert!(BagNumber::parse("BB-20240101-ABC12Z-1").is_err());
        assert!(BagNumber::parse("").is_err());
    }
}
