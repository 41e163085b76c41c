//! Domain record to wire body conversions.

use api_shared::{DonationRes, DonorRes, RequestRes, StockLevelRes, TransfusionRes, UnitRes};
use bloodbank_core::lifecycle::is_donor_eligible;
use bloodbank_core::models::{BloodUnit, Donation, Donor, Transfusion, TransfusionRequest};
use bloodbank_core::presentation::{blood_type_color, expiry_status, priority_color};
use bloodbank_core::repositories::inventory::StockLevel;
use chrono::{DateTime, Utc};

pub(crate) fn donor_res(donor: Donor) -> DonorRes {
    DonorRes {
        id: donor.id.to_string(),
        name: donor.name.to_string(),
        blood_type: donor.blood_type.to_string(),
        eligible: is_donor_eligible(donor.last_donation_date),
        color: blood_type_color(donor.blood_type).to_string(),
        last_donation_date: donor.last_donation_date,
        contact: donor.contact,
        registered_at: donor.registered_at,
    }
}

pub(crate) fn donation_res(donation: Donation) -> DonationRes {
    DonationRes {
        id: donation.id.to_string(),
        donor_id: donation.donor_id.to_string(),
        bag_number: donation.bag_number.to_string(),
        component: donation.component_type.to_string(),
        volume_ml: donation.volume_ml,
        donated_at: donation.donated_at,
    }
}

pub(crate) fn unit_res(unit: BloodUnit, now: DateTime<Utc>) -> UnitRes {
    let status = expiry_status(unit.expiry_date, now);
    UnitRes {
        bag_number: unit.bag_number.to_string(),
        blood_type: unit.blood_type.to_string(),
        component: unit.component_type.to_string(),
        collection_date: unit.collection_date,
        expiry_date: unit.expiry_date,
        status: unit.status.to_string(),
        donor_id: unit.donor_id.map(|id| id.to_string()),
        volume_ml: unit.volume_ml,
        reserved_for: unit.reserved_for.map(|id| id.to_string()),
        expiry_status: status.as_str().to_string(),
        expiry_color: status.color().to_string(),
    }
}

pub(crate) fn request_res(request: TransfusionRequest) -> RequestRes {
    RequestRes {
        id: request.id.to_string(),
        patient_ref: request.patient_ref.to_string(),
        recipient_blood_type: request.recipient_blood_type.to_string(),
        component: request.component_type.to_string(),
        units_requested: request.units_requested,
        units_issued: request.units_issued,
        priority: request.priority.to_string(),
        priority_color: priority_color(request.priority).to_string(),
        status: request.status.to_string(),
        requested_at: request.requested_at,
        notes: request.notes,
    }
}

pub(crate) fn transfusion_res(transfusion: Transfusion) -> TransfusionRes {
    TransfusionRes {
        id: transfusion.id.to_string(),
        request_id: transfusion.request_id.to_string(),
        bag_number: transfusion.bag_number.to_string(),
        patient_ref: transfusion.patient_ref.to_string(),
        recipient_blood_type: transfusion.recipient_blood_type.to_string(),
        donor_blood_type: transfusion.donor_blood_type.to_string(),
        component: transfusion.component_type.to_string(),
        transfused_at: transfusion.transfused_at,
        adverse_reaction: transfusion.adverse_reaction,
    }
}

pub(crate) fn stock_level_res(level: StockLevel) -> StockLevelRes {
    StockLevelRes {
        blood_type: level.blood_type.to_string(),
        component: level.component_type.to_string(),
        units: level.units as u64,
        total_volume_ml: level.total_volume_ml,
    }
}
