//! Presentation tokens for blood types, priorities and expiry state.
//!
//! Tokens are colour names understood by the front end. Lookups never fail; anything outside the
//! known vocabularies maps to [`FALLBACK_COLOR`].

use crate::lifecycle::days_until_expiry;
use bloodbank_types::{BloodType, Priority};
use chrono::{DateTime, Utc};

pub const FALLBACK_COLOR: &str = "gray";

/// Units with fewer whole days left than this are flagged as expiring soon.
pub const EXPIRING_SOON_DAYS: i64 = 3;

pub fn blood_type_color(blood_type: BloodType) -> &'static str {
    match blood_type {
        BloodType::APositive => "red",
        BloodType::ANegative => "rose",
        BloodType::BPositive => "blue",
        BloodType::BNegative => "sky",
        BloodType::ABPositive => "purple",
        BloodType::ABNegative => "violet",
        BloodType::OPositive => "green",
        BloodType::ONegative => "emerald",
    }
}

pub fn priority_color(priority: Priority) -> &'static str {
    match priority {
        Priority::Routine => "green",
        Priority::Urgent => "yellow",
        Priority::Emergency => "orange",
        Priority::Critical => "red",
    }
}

pub fn blood_type_color_lenient(label: &str) -> &'static str {
    label
        .parse::<BloodType>()
        .map(blood_type_color)
        .unwrap_or(FALLBACK_COLOR)
}

pub fn priority_color_lenient(label: &str) -> &'static str {
    label
        .parse::<Priority>()
        .map(priority_color)
        .unwrap_or(FALLBACK_COLOR)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    Expired,
    ExpiringSoon,
    Fresh,
}

impl ExpiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpiryStatus::Expired => "expired",
            ExpiryStatus::ExpiringSoon => "expiring_soon",
            ExpiryStatus::Fresh => "fresh",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ExpiryStatus::Expired => "red",
            ExpiryStatus::ExpiringSoon => "orange",
            ExpiryStatus::Fresh => "green",
        }
    }
}

pub fn expiry_status(expiry_date: DateTime<Utc>, now: DateTime<Utc>) -> ExpiryStatus {
    if now >= expiry_date {
        ExpiryStatus::Expired
    } else if days_until_expiry(expiry_date, now) < EXPIRING_SOON_DAYS {
        ExpiryStatus::ExpiringSoon
    } else {
        ExpiryStatus::Fresh
    }
}
