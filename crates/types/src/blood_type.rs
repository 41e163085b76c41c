use crate::{label_serde, TypeError};
use std::str::FromStr;

/// ABO/Rh blood group.
///
/// The eight values are the only keys used by the compatibility tables. Labels follow the
/// conventional clinical form (`A+`, `AB-`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BloodType {
    APositive,
    ANegative,
    BPositive,
    BNegative,
    ABPositive,
    ABNegative,
    OPositive,
    ONegative,
}

impl BloodType {
    /// All eight blood types, in table order.
    pub const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::ABPositive,
        BloodType::ABNegative,
        BloodType::OPositive,
        BloodType::ONegative,
    ];

    /// Returns the canonical label, e.g. `"AB-"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::ABPositive => "AB+",
            BloodType::ABNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }

    /// Whether the type carries the RhD antigen.
    pub fn is_rh_positive(&self) -> bool {
        matches!(
            self,
            BloodType::APositive
                | BloodType::BPositive
                | BloodType::ABPositive
                | BloodType::OPositive
        )
    }
}

impl FromStr for BloodType {
    type Err = TypeError;

    /// Parses a blood type label.
    ///
    /// Accepts the canonical labels with surrounding whitespace, lowercase group letters and the
    /// Unicode minus sign (U+2212) in place of `-`.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::UnknownBloodType`] for anything outside the eight labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().replace('\u{2212}', "-").to_ascii_uppercase();
        BloodType::ALL
            .into_iter()
            .find(|bt| bt.as_str() == normalised)
            .ok_or_else(|| TypeError::UnknownBloodType(s.to_owned()))
    }
}

label_serde!(BloodType);
