//! Component lifecycle calculator.
//!
//! Expiry offsets are regulatory constants per component and donor eligibility follows a fixed
//! 56-day inter-donation interval. Dates are `DateTime<Utc>`; day offsets are exact 24-hour days
//! in UTC and year offsets use calendar months, so month and year rollover are handled by chrono.

use bloodbank_types::ComponentType;
use chrono::{DateTime, Duration, Months, Utc};

/// Minimum number of days between two whole-blood donations from the same donor.
pub const DONATION_INTERVAL_DAYS: i64 = 56;

/// How long a component remains usable after collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShelfLife {
    Days(i64),
    Months(u32),
}

impl ShelfLife {
    /// Adds this shelf life to `from`, saturating at the latest representable instant.
    pub fn after(self, from: DateTime<Utc>) -> DateTime<Utc> {
        let added = match self {
            ShelfLife::Days(days) => Duration::try_days(days).and_then(|d| from.checked_add_signed(d)),
            ShelfLife::Months(months) => from.checked_add_months(Months::new(months)),
        };
        added.unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

pub fn shelf_life(component: ComponentType) -> ShelfLife {
    match component {
        ComponentType::WholeBlood => ShelfLife::Days(35),
        ComponentType::PackedRbc => ShelfLife::Days(42),
        ComponentType::Platelets => ShelfLife::Days(5),
        ComponentType::FreshFrozenPlasma => ShelfLife::Months(12),
        ComponentType::Cryoprecipitate => ShelfLife::Months(12),
    }
}

/// Computes when a unit collected at `collection_date` expires.
///
/// The result saturates at `DateTime::<Utc>::MAX_UTC`. A collection date less than one shelf
/// life before that instant therefore gets an expiry equal to `MAX_UTC`, which can be equal to
/// the collection date itself. Inventory refuses such units rather than store one whose shelf
/// life is empty.
pub fn calculate_expiry_date(
    collection_date: DateTime<Utc>,
    component: ComponentType,
) -> DateTime<Utc> {
    shelf_life(component).after(collection_date)
}

/// String form of [`calculate_expiry_date`]; an unknown component gets the whole blood offset.
pub fn calculate_expiry_date_lenient(
    collection_date: DateTime<Utc>,
    component: &str,
) -> DateTime<Utc> {
    calculate_expiry_date(collection_date, ComponentType::parse_lenient(component))
}

/// The first instant a donor may donate again.
pub fn calculate_next_eligible_date(last_donation_date: DateTime<Utc>) -> DateTime<Utc> {
    ShelfLife::Days(DONATION_INTERVAL_DAYS).after(last_donation_date)
}

/// Whether a donor may donate now.
///
/// Evaluated against the clock on every call; eligibility is never cached.
pub fn is_donor_eligible(last_donation_date: Option<DateTime<Utc>>) -> bool {
    is_donor_eligible_at(last_donation_date, Utc::now())
}

/// Whether a donor may donate at `now`. A donor who never donated is always eligible; the
/// boundary is inclusive.
pub fn is_donor_eligible_at(
    last_donation_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    match last_donation_date {
        None => true,
        Some(last) => now >= calculate_next_eligible_date(last),
    }
}

pub fn is_expired_at(expiry_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now >= expiry_date
}

/// Whole days left before `expiry_date`; negative once expired.
pub fn days_until_expiry(expiry_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (expiry_date - now).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_expiry_offsets_from_new_year() {
        let collected = utc(2024, 1, 1);
        assert_eq!(
            calculate_expiry_date(collected, ComponentType::PackedRbc),
            utc(2024, 2, 12)
        );
        assert_eq!(
            calculate_expiry_date(collected, ComponentType::Platelets),
            utc(2024, 1, 6)
        );
        assert_eq!(
            calculate_expiry_date(collected, ComponentType::WholeBlood),
            utc(2024, 2, 5)
        );
        assert_eq!(
            calculate_expiry_date(collected, ComponentType::FreshFrozenPlasma),
            utc(2025, 1, 1)
        );
        assert_eq!(
            calculate_expiry_date(collected, ComponentType::Cryoprecipitate),
            utc(2025, 1, 1)
        );
    }

    #[test]
    fn test_expiry_crosses_year_boundary() {
        assert_eq!(
            calculate_expiry_date(utc(2024, 12, 20), ComponentType::Platelets),
            utc(2024, 12, 25)
        );
        assert_eq!(
            calculate_expiry_date(utc(2024, 12, 30), ComponentType::PackedRbc),
            utc(2025, 2, 10)
        );
    }

    #[test]
    fn test_plasma_expiry_from_leap_day_clamps_to_month_end() {
        assert_eq!(
            calculate_expiry_date(utc(2024, 2, 29), ComponentType::FreshFrozenPlasma),
            utc(2025, 2, 28)
        );
    }

    #[test]
    fn test_expiry_keeps_time_of_day() {
        let collected = Utc.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap();
        assert_eq!(
            calculate_expiry_date(collected, ComponentType::Platelets),
            Utc.with_ymd_and_hms(2024, 3, 14, 14, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_expiry_is_strictly_after_collection() {
        let collected = utc(2024, 6, 15);
        for component in ComponentType::ALL {
            assert!(calculate_expiry_date(collected, component) > collected);
        }
    }

    #[test]
    fn test_lenient_expiry_defaults_to_whole_blood() {
        assert_eq!(
            calculate_expiry_date_lenient(utc(2024, 1, 1), "granulocytes"),
            utc(2024, 2, 5)
        );
    }

    #[test]
    fn test_expiry_saturates_instead_of_panicking() {
        let near_max = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        assert_eq!(
            calculate_expiry_date(near_max, ComponentType::PackedRbc),
            DateTime::<Utc>::MAX_UTC
        );
    }

    #[test]
    fn test_next_eligible_date_is_56_days_later() {
        assert_eq!(calculate_next_eligible_date(utc(2024, 1, 1)), utc(2024, 2, 26));
    }

    #[test]
    fn test_never_donated_is_eligible() {
        assert!(is_donor_eligible(None));
        assert!(is_donor_eligible_at(None, utc(2000, 1, 1)));
    }

    #[test]
    fn test_eligibility_boundary_is_inclusive() {
        let now = utc(2024, 5, 1);
        let exactly = now - Duration::days(56);
        assert!(is_donor_eligible_at(Some(exactly), now));

        let one_second_short = exactly + Duration::seconds(1);
        assert!(!is_donor_eligible_at(Some(one_second_short), now));
    }

    #[test]
    fn test_eligibility_against_clock() {
        let now = Utc::now();
        assert!(is_donor_eligible(Some(now - Duration::days(57))));
        assert!(!is_donor_eligible(Some(now - Duration::days(30))));
    }

    #[test]
    fn test_expired_and_days_left() {
        let expiry = utc(2024, 1, 10);
        assert!(!is_expired_at(expiry, utc(2024, 1, 9)));
        assert!(is_expired_at(expiry, expiry));
        assert_eq!(days_until_expiry(expiry, utc(2024, 1, 7)), 3);
        assert_eq!(days_until_expiry(expiry, utc(2024, 1, 12)), -2);
    }
}
