//! Stored blood bank records.
//!
//! These are the domain-shaped records handed out by the repositories. Each is serialised to its
//! own YAML file; unknown keys are rejected so that schema drift surfaces as a load error.

use crate::identifiers::BagNumber;
use crate::uuid::RecordId;
use crate::BloodBankError;
use bloodbank_types::{BloodType, ComponentType, NonEmptyText, Priority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Donor {
    pub id: RecordId,
    pub name: NonEmptyText,
    pub blood_type: BloodType,
    #[serde(default)]
    pub last_donation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub contact: Option<String>,
    pub registered_at: DateTime<Utc>,
}

/// Where a unit is in its lifecycle.
///
/// `Available -> Reserved -> Issued -> Transfused`, with `Available`/`Reserved` able to move to
/// `Discarded` once expired. `Transfused` and `Discarded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
    Available,
    Reserved,
    Issued,
    Transfused,
    Discarded,
}

impl UnitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::Available => "available",
            UnitStatus::Reserved => "reserved",
            UnitStatus::Issued => "issued",
            UnitStatus::Transfused => "transfused",
            UnitStatus::Discarded => "discarded",
        }
    }

    /// Still part of active inventory.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            UnitStatus::Available | UnitStatus::Reserved | UnitStatus::Issued
        )
    }
}

impl FromStr for UnitStatus {
    type Err = BloodBankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase();
        [
            UnitStatus::Available,
            UnitStatus::Reserved,
            UnitStatus::Issued,
            UnitStatus::Transfused,
            UnitStatus::Discarded,
        ]
        .into_iter()
        .find(|status| status.as_str() == normalised)
        .ok_or_else(|| BloodBankError::InvalidInput(format!("unknown unit status: '{}'", s)))
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BloodUnit {
    pub bag_number: BagNumber,
    pub blood_type: BloodType,
    pub component_type: ComponentType,
    pub collection_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub status: UnitStatus,
    #[serde(default)]
    pub donor_id: Option<RecordId>,
    pub volume_ml: u32,
    /// Request the unit is reserved or issued for.
    #[serde(default)]
    pub reserved_for: Option<RecordId>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Donation {
    pub id: RecordId,
    pub donor_id: RecordId,
    pub bag_number: BagNumber,
    pub component_type: ComponentType,
    pub volume_ml: u32,
    pub donated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    PartiallyIssued,
    Fulfilled,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::PartiallyIssued => "partially_issued",
            RequestStatus::Fulfilled => "fulfilled",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    /// Units may still be reserved or issued against the request.
    pub fn is_open(&self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::PartiallyIssued)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransfusionRequest {
    pub id: RecordId,
    pub patient_ref: NonEmptyText,
    pub recipient_blood_type: BloodType,
    pub component_type: ComponentType,
    pub units_requested: u32,
    #[serde(default)]
    pub units_issued: u32,
    pub priority: Priority,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transfusion {
    pub id: RecordId,
    pub request_id: RecordId,
    pub bag_number: BagNumber,
    pub patient_ref: NonEmptyText,
    pub recipient_blood_type: BloodType,
    pub donor_blood_type: BloodType,
    pub component_type: ComponentType,
    pub transfused_at: DateTime<Utc>,
    #[serde(default)]
    pub adverse_reaction: Option<String>,
}
