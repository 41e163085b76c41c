//! Blood type compatibility engine.
//!
//! Compatibility is decided by two static tables, one per regime:
//!
//! - **Red-cell regime** (whole blood, packed RBC, platelets): the recipient's antibodies must
//!   tolerate the donor's red-cell antigens. O- gives to everyone; AB+ receives from everyone.
//! - **Plasma regime** (fresh frozen plasma, cryoprecipitate): governed by the antibodies carried
//!   in the donor's plasma, so the table mirrors the red-cell one with O and AB swapped.
//!
//! The relation is neither symmetric nor transitive and is therefore written out explicitly
//! rather than derived from antigen sets. Platelets follow the red-cell table as a practical
//! simplification; that is the rule this engine applies.
//!
//! Every function here is pure and total. A pair missing from a table is incompatible.

use bloodbank_types::{BloodType, ComponentType};

use BloodType::{
    ABNegative as AB_NEG, ABPositive as AB_POS, ANegative as A_NEG, APositive as A_POS,
    BNegative as B_NEG, BPositive as B_POS, ONegative as O_NEG, OPositive as O_POS,
};

/// Which compatibility table applies to a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompatibilityRegime {
    RedCell,
    Plasma,
}

impl CompatibilityRegime {
    pub fn for_component(component: ComponentType) -> Self {
        match component {
            ComponentType::WholeBlood | ComponentType::PackedRbc | ComponentType::Platelets => {
                CompatibilityRegime::RedCell
            }
            ComponentType::FreshFrozenPlasma | ComponentType::Cryoprecipitate => {
                CompatibilityRegime::Plasma
            }
        }
    }

    fn table(self) -> &'static [(BloodType, &'static [BloodType])] {
        match self {
            CompatibilityRegime::RedCell => RED_CELL_COMPATIBILITY,
            CompatibilityRegime::Plasma => PLASMA_COMPATIBILITY,
        }
    }
}

/// Recipient -> donors permitted under the red-cell regime.
static RED_CELL_COMPATIBILITY: &[(BloodType, &[BloodType])] = &[
    (A_POS, &[A_POS, A_NEG, O_POS, O_NEG]),
    (A_NEG, &[A_NEG, O_NEG]),
    (B_POS, &[B_POS, B_NEG, O_POS, O_NEG]),
    (B_NEG, &[B_NEG, O_NEG]),
    (AB_POS, &[A_POS, A_NEG, B_POS, B_NEG, AB_POS, AB_NEG, O_POS, O_NEG]),
    (AB_NEG, &[A_NEG, B_NEG, AB_NEG, O_NEG]),
    (O_POS, &[O_POS, O_NEG]),
    (O_NEG, &[O_NEG]),
];

/// Recipient -> donors permitted under the plasma regime.
static PLASMA_COMPATIBILITY: &[(BloodType, &[BloodType])] = &[
    (A_POS, &[A_POS, A_NEG, AB_POS, AB_NEG]),
    (A_NEG, &[A_NEG, AB_NEG]),
    (B_POS, &[B_POS, B_NEG, AB_POS, AB_NEG]),
    (B_NEG, &[B_NEG, AB_NEG]),
    (AB_POS, &[AB_POS, AB_NEG]),
    (AB_NEG, &[AB_NEG]),
    (O_POS, &[A_POS, A_NEG, B_POS, B_NEG, AB_POS, AB_NEG, O_POS, O_NEG]),
    (O_NEG, &[A_NEG, B_NEG, AB_NEG, O_NEG]),
];

fn donors_in_table(regime: CompatibilityRegime, recipient: BloodType) -> &'static [BloodType] {
    regime
        .table()
        .iter()
        .find(|(r, _)| *r == recipient)
        .map(|(_, donors)| *donors)
        .unwrap_or(&[])
}

/// Decides whether `donor` blood of the given component may be given to `recipient`.
pub fn is_compatible(recipient: BloodType, donor: BloodType, component: ComponentType) -> bool {
    donors_in_table(CompatibilityRegime::for_component(component), recipient).contains(&donor)
}

/// Returns every donor type compatible with `recipient` for the given component.
pub fn compatible_donors(recipient: BloodType, component: ComponentType) -> Vec<BloodType> {
    donors_in_table(CompatibilityRegime::for_component(component), recipient).to_vec()
}

/// Returns every recipient type that may receive `donor` blood of the given component.
///
/// The order follows [`BloodType::ALL`].
pub fn compatible_recipients(donor: BloodType, component: ComponentType) -> Vec<BloodType> {
    BloodType::ALL
        .into_iter()
        .filter(|recipient| is_compatible(*recipient, donor, component))
        .collect()
}

/// String form of [`is_compatible`] for untyped boundaries.
///
/// An unknown blood type on either side yields `false`; an unknown component falls back to the
/// red-cell regime.
pub fn is_compatible_lenient(recipient: &str, donor: &str, component: &str) -> bool {
    match (recipient.parse::<BloodType>(), donor.parse::<BloodType>()) {
        (Ok(recipient), Ok(donor)) => {
            is_compatible(recipient, donor, ComponentType::parse_lenient(component))
        }
        _ => {
            tracing::debug!(recipient, donor, "compatibility lookup with unknown blood type");
            false
        }
    }
}

/// String form of [`compatible_donors`]; unknown recipient yields an empty list.
pub fn compatible_donors_lenient(recipient: &str, component: &str) -> Vec<BloodType> {
    recipient
        .parse::<BloodType>()
        .map(|r| compatible_donors(r, ComponentType::parse_lenient(component)))
        .unwrap_or_default()
}

/// String form of [`compatible_recipients`]; unknown donor yields an empty list.
pub fn compatible_recipients_lenient(donor: &str, component: &str) -> Vec<BloodType> {
    donor
        .parse::<BloodType>()
        .map(|d| compatible_recipients(d, ComponentType::parse_lenient(component)))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn set(types: &[BloodType]) -> BTreeSet<BloodType> {
        types.iter().copied().collect()
    }

    #[test]
    fn test_every_type_is_compatible_with_itself() {
        for component in ComponentType::ALL {
            for bt in BloodType::ALL {
                assert!(is_compatible(bt, bt, component), "{bt} {component}");
            }
        }
    }

    #[test]
    fn test_tables_cover_every_recipient() {
        for regime in [CompatibilityRegime::RedCell, CompatibilityRegime::Plasma] {
            for bt in BloodType::ALL {
                let donors = donors_in_table(regime, bt);
                assert!(!donors.is_empty());
                assert!(donors.contains(&bt));
            }
        }
    }

    #[test]
    fn test_o_negative_is_universal_red_cell_donor() {
        for recipient in BloodType::ALL {
            assert!(is_compatible(recipient, O_NEG, ComponentType::PackedRbc));
        }
        assert_eq!(
            compatible_recipients(O_NEG, ComponentType::PackedRbc).len(),
            8
        );
    }

    #[test]
    fn test_ab_positive_is_universal_red_cell_recipient() {
        for donor in BloodType::ALL {
            assert!(is_compatible(AB_POS, donor, ComponentType::PackedRbc));
        }
        assert_eq!(compatible_donors(AB_POS, ComponentType::PackedRbc).len(), 8);
    }

    #[test]
    fn test_red_cell_cardinality_bounds() {
        assert_eq!(
            compatible_donors(O_NEG, ComponentType::PackedRbc),
            vec![O_NEG]
        );
        assert_eq!(
            compatible_recipients(AB_POS, ComponentType::PackedRbc),
            vec![AB_POS]
        );
    }

    #[test]
    fn test_known_incompatible_pairs() {
        assert!(!is_compatible(A_POS, B_POS, ComponentType::PackedRbc));
        assert!(!is_compatible(B_NEG, A_NEG, ComponentType::PackedRbc));
        assert!(!is_compatible(O_NEG, O_POS, ComponentType::WholeBlood));
    }

    #[test]
    fn test_compatibility_is_not_symmetric() {
        assert!(is_compatible(A_POS, O_NEG, ComponentType::PackedRbc));
        assert!(!is_compatible(O_NEG, A_POS, ComponentType::PackedRbc));
    }

    #[test]
    fn test_donors_and_recipients_are_dual() {
        for component in ComponentType::ALL {
            for x in BloodType::ALL {
                for y in BloodType::ALL {
                    let y_donates_to_x = compatible_donors(x, component).contains(&y);
                    let x_receives_from_y = compatible_recipients(y, component).contains(&x);
                    assert_eq!(y_donates_to_x, x_receives_from_y, "{x} <- {y} {component}");
                }
            }
        }
    }

    #[test]
    fn test_o_positive_recipient_packed_rbc() {
        assert_eq!(
            set(&compatible_donors(O_POS, ComponentType::PackedRbc)),
            set(&[O_POS, O_NEG])
        );
    }

    #[test]
    fn test_ab_negative_recipient_plasma_only_from_ab_negative() {
        assert_eq!(
            compatible_donors(AB_NEG, ComponentType::FreshFrozenPlasma),
            vec![AB_NEG]
        );
    }

    #[test]
    fn test_o_negative_platelets_reach_every_recipient() {
        assert_eq!(
            set(&compatible_recipients(O_NEG, ComponentType::Platelets)),
            set(&BloodType::ALL)
        );
    }

    #[test]
    fn test_plasma_and_cryo_share_a_table() {
        for x in BloodType::ALL {
            assert_eq!(
                compatible_donors(x, ComponentType::FreshFrozenPlasma),
                compatible_donors(x, ComponentType::Cryoprecipitate)
            );
        }
        assert_eq!(
            compatible_recipients(AB_POS, ComponentType::FreshFrozenPlasma).len(),
            8
        );
    }

    #[test]
    fn test_platelets_follow_red_cell_table() {
        for x in BloodType::ALL {
            assert_eq!(
                compatible_donors(x, ComponentType::Platelets),
                compatible_donors(x, ComponentType::PackedRbc)
            );
        }
    }

    #[test]
    fn test_lookups_are_repeatable() {
        let first = compatible_donors(B_POS, ComponentType::WholeBlood);
        let second = compatible_donors(B_POS, ComponentType::WholeBlood);
        assert_eq!(first, second);
    }

    #[test]
    fn test_lenient_unknown_blood_type_is_incompatible() {
        assert!(!is_compatible_lenient("X+", "O-", "packed_rbc"));
        assert!(!is_compatible_lenient("A+", "", "packed_rbc"));
        assert!(compatible_donors_lenient("Q", "packed_rbc").is_empty());
        assert!(compatible_recipients_lenient("not-a-type", "platelets").is_empty());
    }

    #[test]
    fn test_lenient_unknown_component_uses_red_cell_regime() {
        // Under the plasma regime AB- could give to O+; under red-cell it cannot.
        assert!(!is_compatible_lenient("O+", "AB-", "granulocytes"));
        assert!(is_compatible_lenient("O+", "AB-", "fresh_frozen_plasma"));
        assert_eq!(
            compatible_donors_lenient("O-", "mystery"),
            vec![O_NEG]
        );
    }
}
