//! Request and response bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

// ----------------------------------------------------------------------------
// Engine lookups
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompatibilityQuery {
    pub recipient: String,
    pub donor: String,
    pub component: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompatibilityRes {
    pub recipient: String,
    pub donor: String,
    pub component: String,
    pub compatible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompatibleDonorsQuery {
    pub recipient: String,
    pub component: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompatibleRecipientsQuery {
    pub donor: String,
    pub component: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BloodTypeListRes {
    pub blood_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExpiryQuery {
    pub collection_date: DateTime<Utc>,
    pub component: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpiryRes {
    pub collection_date: DateTime<Utc>,
    pub component: String,
    pub expiry_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EligibilityQuery {
    #[serde(default)]
    pub last_donation_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EligibilityRes {
    pub eligible: bool,
    pub next_eligible_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BagNumberRes {
    pub bag_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ColorRes {
    pub label: String,
    pub color: String,
}

// ----------------------------------------------------------------------------
// Records
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DonorRes {
    pub id: String,
    pub name: String,
    pub blood_type: String,
    pub last_donation_date: Option<DateTime<Utc>>,
    pub contact: Option<String>,
    pub registered_at: DateTime<Utc>,
    /// Computed on every read.
    pub eligible: bool,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListDonorsRes {
    pub donors: Vec<DonorRes>,
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DonorsQuery {
    /// Only donors of this blood type, e.g. `O-`.
    #[serde(default)]
    pub blood_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterDonorReq {
    pub name: String,
    pub blood_type: String,
    #[serde(default)]
    pub last_donation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordDonationReq {
    pub component: String,
    pub volume_ml: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnitRes {
    pub bag_number: String,
    pub blood_type: String,
    pub component: String,
    pub collection_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub status: String,
    pub donor_id: Option<String>,
    pub volume_ml: u32,
    pub reserved_for: Option<String>,
    pub expiry_status: String,
    pub expiry_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DonationRes {
    pub id: String,
    pub donor_id: String,
    pub bag_number: String,
    pub component: String,
    pub volume_ml: u32,
    pub donated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListDonationsRes {
    pub donations: Vec<DonationRes>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordDonationRes {
    pub donation_id: String,
    pub unit: UnitRes,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddUnitReq {
    pub blood_type: String,
    pub component: String,
    pub collection_date: DateTime<Utc>,
    pub volume_ml: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListUnitsRes {
    pub units: Vec<UnitRes>,
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InventoryQuery {
    /// Filter by unit status (`available`, `reserved`, `issued`, `transfused`, `discarded`).
    #[serde(default)]
    pub status: Option<String>,
    /// Only units still in circulation (available, reserved or issued).
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockLevelRes {
    pub blood_type: String,
    pub component: String,
    pub units: u64,
    pub total_volume_ml: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockSummaryRes {
    pub levels: Vec<StockLevelRes>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRequestReq {
    pub patient_ref: String,
    pub recipient_blood_type: String,
    pub component: String,
    pub units_requested: u32,
    pub priority: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestRes {
    pub id: String,
    pub patient_ref: String,
    pub recipient_blood_type: String,
    pub component: String,
    pub units_requested: u32,
    pub units_issued: u32,
    pub priority: String,
    pub priority_color: String,
    pub status: String,
    pub requested_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListRequestsRes {
    pub requests: Vec<RequestRes>,
}

#[derive(Debug, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequestsQuery {
    /// Only requests that can still receive units.
    #[serde(default)]
    pub open: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnitActionReq {
    pub bag_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordTransfusionReq {
    pub request_id: String,
    pub bag_number: String,
    #[serde(default)]
    pub adverse_reaction: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransfusionRes {
    pub id: String,
    pub request_id: String,
    pub bag_number: String,
    pub patient_ref: String,
    pub recipient_blood_type: String,
    pub donor_blood_type: String,
    pub component: String,
    pub transfused_at: DateTime<Utc>,
    pub adverse_reaction: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListTransfusionsRes {
    pub transfusions: Vec<TransfusionRes>,
}
