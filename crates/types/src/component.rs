use crate::{label_serde, TypeError};
use std::str::FromStr;

/// Blood product derived from a donation.
///
/// The component decides which compatibility regime applies and how long a unit stays usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentType {
    WholeBlood,
    PackedRbc,
    Platelets,
    FreshFrozenPlasma,
    Cryoprecipitate,
}

impl ComponentType {
    pub const ALL: [ComponentType; 5] = [
        ComponentType::WholeBlood,
        ComponentType::PackedRbc,
        ComponentType::Platelets,
        ComponentType::FreshFrozenPlasma,
        ComponentType::Cryoprecipitate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::WholeBlood => "whole_blood",
            ComponentType::PackedRbc => "packed_rbc",
            ComponentType::Platelets => "platelets",
            ComponentType::FreshFrozenPlasma => "fresh_frozen_plasma",
            ComponentType::Cryoprecipitate => "cryoprecipitate",
        }
    }

    /// Parses a component label, falling back to [`ComponentType::WholeBlood`].
    ///
    /// Whole blood is the default case for both compatibility (red-cell regime) and shelf life
    /// (35 days), so an unrecognised label never selects a more permissive rule.
    pub fn parse_lenient(input: &str) -> ComponentType {
        input.parse().unwrap_or(ComponentType::WholeBlood)
    }
}

impl FromStr for ComponentType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase();
        ComponentType::ALL
            .into_iter()
            .find(|c| c.as_str() == normalised)
            .ok_or_else(|| TypeError::UnknownComponentType(s.to_owned()))
    }
}

label_serde!(ComponentType);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        for c in ComponentType::ALL {
            assert_eq!(c.as_str().parse::<ComponentType>().unwrap(), c);
        }
        assert_eq!(
            "Packed_RBC".parse::<ComponentType>().unwrap(),
            ComponentType::PackedRbc
        );
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        assert_eq!(
            "plasma".parse::<ComponentType>().unwrap_err(),
            TypeError::UnknownComponentType("plasma".into())
        );
    }

    #[test]
    fn test_lenient_parse_falls_back_to_whole_blood() {
        assert_eq!(
            ComponentType::parse_lenient("granulocytes"),
            ComponentType::WholeBlood
        );
        assert_eq!(
            ComponentType::parse_lenient("platelets"),
            ComponentType::Platelets
        );
    }
}
