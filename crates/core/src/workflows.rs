//! Blood bank workflows.
//!
//! [`BloodBankService`] orchestrates the repositories and consults the stateless engines before
//! any state change:
//!
//! - accepting a donation requires [`is_donor_eligible`];
//! - taking a unit into inventory derives its bag number and expiry;
//! - reserving, issuing and transfusing a unit require [`is_compatible`] between the request's
//!   recipient and the unit.
//!
//! The engines answer "is this pairing allowed", never "is this unit free". Unit and request
//! transitions are read-modify-write on files, so the service serialises them behind one
//! process-local lock.

use crate::compatibility::is_compatible;
use crate::config::CoreConfig;
use crate::identifiers::BagNumber;
use crate::lifecycle::{calculate_next_eligible_date, is_donor_eligible, is_expired_at};
use crate::models::{
    BloodUnit, Donation, Donor, RequestStatus, Transfusion, TransfusionRequest, UnitStatus,
};
use crate::repositories::donations::DonationRepository;
use crate::repositories::donors::DonorRepository;
use crate::repositories::inventory::{InventoryRepository, NewUnit, StockLevel};
use crate::repositories::requests::{NewRequest, RequestRepository};
use crate::repositories::transfusions::TransfusionRepository;
use crate::uuid::RecordId;
use crate::{BloodBankError, BloodBankResult};
use bloodbank_types::{BloodType, ComponentType, NonEmptyText};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

/// Workflow entry point used by the CLI and REST API.
#[derive(Debug)]
pub struct BloodBankService {
    cfg: Arc<CoreConfig>,
    donors: DonorRepository,
    inventory: InventoryRepository,
    donations: DonationRepository,
    requests: RequestRepository,
    transfusions: TransfusionRepository,
    transitions: Mutex<()>,
}

impl BloodBankService {
    /// Creates the service and makes sure every collection directory exists.
    ///
    /// # Errors
    ///
    /// Returns [`BloodBankError::StorageDirCreation`] if the storage layout cannot be created.
    pub fn new(cfg: Arc<CoreConfig>) -> BloodBankResult<Self> {
        cfg.ensure_layout()?;
        Ok(Self {
            donors: DonorRepository::new(cfg.clone()),
            inventory: InventoryRepository::new(cfg.clone()),
            donations: DonationRepository::new(cfg.clone()),
            requests: RequestRepository::new(cfg.clone()),
            transfusions: TransfusionRepository::new(cfg.clone()),
            cfg,
            transitions: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn donors(&self) -> &DonorRepository {
        &self.donors
    }

    pub fn inventory(&self) -> &InventoryRepository {
        &self.inventory
    }

    pub fn donations(&self) -> &DonationRepository {
        &self.donations
    }

    pub fn requests(&self) -> &RequestRepository {
        &self.requests
    }

    pub fn transfusions(&self) -> &TransfusionRepository {
        &self.transfusions
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        self.transitions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ------------------------------------------------------------------------
    // Donors and donations
    // ------------------------------------------------------------------------

    pub fn register_donor(
        &self,
        name: &str,
        blood_type: BloodType,
        last_donation_date: Option<DateTime<Utc>>,
        contact: Option<String>,
    ) -> BloodBankResult<Donor> {
        let name = NonEmptyText::new(name)?;
        self.donors
            .create(name, blood_type, last_donation_date, contact)
    }

    /// Records a donation and takes the collected unit into inventory.
    ///
    /// The donor's eligibility is recomputed from their last donation date at call time. The
    /// donor's new last donation date is written before the unit, and is restored if the unit or
    /// donation record cannot be written.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`BloodBankError::NotFound`] if the donor does not exist,
    /// - [`BloodBankError::DonorIneligible`] if fewer than 56 days have passed since the last
    ///   donation,
    /// - [`BloodBankError::InvalidInput`] if `volume_ml` is zero,
    /// - a storage error if any record cannot be written.
    pub fn record_donation(
        &self,
        donor_id: &RecordId,
        component_type: ComponentType,
        volume_ml: u32,
    ) -> BloodBankResult<(Donation, BloodUnit)> {
        if volume_ml == 0 {
            return Err(BloodBankError::InvalidInput(
                "volume_ml must be greater than zero".into(),
            ));
        }

        let _guard = self.lock();
        let mut donor = self.donors.get(donor_id)?;

        if !is_donor_eligible(donor.last_donation_date) {
            let next_eligible = donor
                .last_donation_date
                .map(calculate_next_eligible_date)
                .unwrap_or_else(Utc::now);
            tracing::warn!(donor_id = %donor.id, %next_eligible, "donation refused: donor not yet eligible");
            return Err(BloodBankError::DonorIneligible {
                donor_id: donor.id.to_string(),
                next_eligible,
            });
        }

        let donated_at = Utc::now();
        let previous_donation = donor.last_donation_date;
        donor.last_donation_date = Some(donated_at);
        self.donors.update(&donor)?;

        let recorded = self.collect_unit(&donor, component_type, volume_ml, donated_at);
        let (donation, unit) = match recorded {
            Ok(recorded) => recorded,
            Err(e) => {
                donor.last_donation_date = previous_donation;
                if let Err(restore) = self.donors.update(&donor) {
                    tracing::error!(
                        donor_id = %donor.id,
                        "failed to restore last donation date: {}",
                        restore
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(
            donor_id = %donor.id,
            bag_number = %unit.bag_number,
            "donation recorded"
        );
        Ok((donation, unit))
    }

    /// Writes the unit and its donation record, removing the unit again if the donation
    /// record cannot be written.
    fn collect_unit(
        &self,
        donor: &Donor,
        component_type: ComponentType,
        volume_ml: u32,
        donated_at: DateTime<Utc>,
    ) -> BloodBankResult<(Donation, BloodUnit)> {
        let unit = self.inventory.insert_new(NewUnit {
            blood_type: donor.blood_type,
            component_type,
            collection_date: donated_at,
            donor_id: Some(donor.id),
            volume_ml,
        })?;

        match self.donations.create(
            donor.id,
            unit.bag_number.clone(),
            component_type,
            volume_ml,
            donated_at,
        ) {
            Ok(donation) => Ok((donation, unit)),
            Err(e) => {
                if let Err(cleanup) = self.inventory.remove(&unit.bag_number) {
                    tracing::error!(
                        bag_number = %unit.bag_number,
                        "failed to remove unit of unrecorded donation: {}",
                        cleanup
                    );
                }
                Err(e)
            }
        }
    }

    /// Takes an externally sourced unit (no registered donor) into inventory.
    pub fn add_unit(
        &self,
        blood_type: BloodType,
        component_type: ComponentType,
        collection_date: DateTime<Utc>,
        volume_ml: u32,
    ) -> BloodBankResult<BloodUnit> {
        if volume_ml == 0 {
            return Err(BloodBankError::InvalidInput(
                "volume_ml must be greater than zero".into(),
            ));
        }
        if collection_date > Utc::now() {
            return Err(BloodBankError::InvalidInput(
                "collection_date cannot be in the future".into(),
            ));
        }

        self.inventory.insert_new(NewUnit {
            blood_type,
            component_type,
            collection_date,
            donor_id: None,
            volume_ml,
        })
    }

    pub fn stock_summary(&self) -> Vec<StockLevel> {
        self.inventory.summary(Utc::now())
    }

    // ------------------------------------------------------------------------
    // Requests, issuance and transfusion
    // ------------------------------------------------------------------------

    pub fn create_request(&self, new_request: NewRequest) -> BloodBankResult<TransfusionRequest> {
        self.requests.create(new_request)
    }

    /// Units that could be issued against a request right now.
    ///
    /// Only available, unexpired units of the requested component whose blood type is
    /// compatible with the recipient are returned. Exact type matches come first, then units
    /// are ordered first-expiring first-out.
    pub fn compatible_units(&self, request_id: &RecordId) -> BloodBankResult<Vec<BloodUnit>> {
        let request = self.requests.get(request_id)?;
        let mut units: Vec<BloodUnit> = self
            .inventory
            .available_units(Utc::now())
            .into_iter()
            .filter(|u| u.component_type == request.component_type)
            .filter(|u| {
                is_compatible(
                    request.recipient_blood_type,
                    u.blood_type,
                    request.component_type,
                )
            })
            .collect();
        units.sort_by_key(|u| (u.blood_type != request.recipient_blood_type, u.expiry_date));
        tracing::debug!(request_id = %request.id, candidates = units.len(), "compatible units");
        Ok(units)
    }

    /// Holds an available unit for a request.
    ///
    /// # Errors
    ///
    /// Same gates as [`issue_unit`](Self::issue_unit); additionally the unit must currently be
    /// `Available`, and [`BloodBankError::RequestFullyAllocated`] is returned once the units
    /// issued plus the units already reserved for the request cover `units_requested`.
    pub fn reserve_unit(
        &self,
        request_id: &RecordId,
        bag_number: &BagNumber,
    ) -> BloodBankResult<BloodUnit> {
        let _guard = self.lock();
        let request = self.open_request(request_id)?;

        let held = self.inventory.reserved_for(&request.id).len();
        if request.units_issued as usize + held >= request.units_requested as usize {
            tracing::warn!(
                request_id = %request.id,
                issued = request.units_issued,
                reserved = held,
                requested = request.units_requested,
                "reservation refused: request fully allocated"
            );
            return Err(BloodBankError::RequestFullyAllocated {
                request_id: request.id.to_string(),
                units_requested: request.units_requested,
            });
        }

        let mut unit = self.inventory.get(bag_number)?;

        if unit.status != UnitStatus::Available {
            return Err(refuse_unavailable(&unit));
        }
        check_unit_for_request(&request, &unit, Utc::now())?;

        unit.status = UnitStatus::Reserved;
        unit.reserved_for = Some(request.id);
        self.inventory.update(&mut unit)?;

        tracing::info!(request_id = %request.id, %bag_number, "unit reserved");
        Ok(unit)
    }

    /// Issues a unit against a request.
    ///
    /// Gates, in order:
    /// 1. the request is still open,
    /// 2. the unit is `Available`, or `Reserved` for this same request,
    /// 3. the unit's component matches the request,
    /// 4. the unit has not expired,
    /// 5. the unit's blood type is compatible with the recipient.
    ///
    /// On success the unit becomes `Issued` and the request moves to `PartiallyIssued` or
    /// `Fulfilled`. Fulfilling a request returns any units still reserved for it to stock.
    ///
    /// # Errors
    ///
    /// Returns the [`BloodBankError`] of the first failing gate, or [`BloodBankError::NotFound`]
    /// if the request or unit does not exist.
    pub fn issue_unit(
        &self,
        request_id: &RecordId,
        bag_number: &BagNumber,
    ) -> BloodBankResult<BloodUnit> {
        let _guard = self.lock();
        let mut request = self.open_request(request_id)?;
        let mut unit = self.inventory.get(bag_number)?;

        let held_for_request = match unit.status {
            UnitStatus::Available => true,
            UnitStatus::Reserved => unit.reserved_for == Some(request.id),
            _ => false,
        };
        if !held_for_request {
            return Err(refuse_unavailable(&unit));
        }
        check_unit_for_request(&request, &unit, Utc::now())?;

        unit.status = UnitStatus::Issued;
        unit.reserved_for = Some(request.id);
        self.inventory.update(&mut unit)?;

        request.units_issued += 1;
        request.status = if request.units_issued >= request.units_requested {
            RequestStatus::Fulfilled
        } else {
            RequestStatus::PartiallyIssued
        };
        self.requests.update(&request)?;

        if request.status == RequestStatus::Fulfilled {
            self.release_reservations(&request.id)?;
        }

        tracing::info!(
            request_id = %request.id,
            %bag_number,
            issued = request.units_issued,
            requested = request.units_requested,
            "unit issued"
        );
        Ok(unit)
    }

    /// Records that an issued unit was transfused.
    ///
    /// Compatibility is checked again at the bedside step.
    ///
    /// # Errors
    ///
    /// Returns [`BloodBankError::UnitUnavailable`] unless the unit is `Issued` for this request,
    /// or [`BloodBankError::Incompatible`] if the pairing is not allowed.
    pub fn record_transfusion(
        &self,
        request_id: &RecordId,
        bag_number: &BagNumber,
        adverse_reaction: Option<String>,
    ) -> BloodBankResult<Transfusion> {
        let _guard = self.lock();
        let request = self.requests.get(request_id)?;
        let mut unit = self.inventory.get(bag_number)?;

        if unit.status != UnitStatus::Issued || unit.reserved_for != Some(request.id) {
            return Err(refuse_unavailable(&unit));
        }
        if !is_compatible(
            request.recipient_blood_type,
            unit.blood_type,
            unit.component_type,
        ) {
            return Err(refuse_incompatible(&request, &unit));
        }

        unit.status = UnitStatus::Transfused;
        self.inventory.update(&mut unit)?;

        let transfusion = self.transfusions.create(|id| Transfusion {
            id,
            request_id: request.id,
            bag_number: unit.bag_number.clone(),
            patient_ref: request.patient_ref.clone(),
            recipient_blood_type: request.recipient_blood_type,
            donor_blood_type: unit.blood_type,
            component_type: unit.component_type,
            transfused_at: Utc::now(),
            adverse_reaction: adverse_reaction.filter(|r| !r.trim().is_empty()),
        })?;

        if transfusion.adverse_reaction.is_some() {
            tracing::warn!(transfusion_id = %transfusion.id, %bag_number, "adverse reaction recorded");
        }
        tracing::info!(transfusion_id = %transfusion.id, %bag_number, "transfusion recorded");
        Ok(transfusion)
    }

    /// Cancels an open request and returns its reserved units to stock.
    pub fn cancel_request(&self, request_id: &RecordId) -> BloodBankResult<TransfusionRequest> {
        let _guard = self.lock();
        let mut request = self.open_request(request_id)?;

        self.release_reservations(&request.id)?;

        request.status = RequestStatus::Cancelled;
        self.requests.update(&request)?;
        tracing::info!(request_id = %request.id, "request cancelled");
        Ok(request)
    }

    /// Discards every available or reserved unit whose expiry has passed.
    pub fn discard_expired(&self) -> BloodBankResult<Vec<BloodUnit>> {
        self.discard_expired_at(Utc::now())
    }

    pub fn discard_expired_at(&self, now: DateTime<Utc>) -> BloodBankResult<Vec<BloodUnit>> {
        let _guard = self.lock();
        let mut discarded = Vec::new();

        for mut unit in self.inventory.list() {
            let discardable = matches!(unit.status, UnitStatus::Available | UnitStatus::Reserved);
            if discardable && is_expired_at(unit.expiry_date, now) {
                unit.status = UnitStatus::Discarded;
                unit.reserved_for = None;
                self.inventory.update(&mut unit)?;
                tracing::info!(bag_number = %unit.bag_number, expiry = %unit.expiry_date, "expired unit discarded");
                discarded.push(unit);
            }
        }

        Ok(discarded)
    }

    /// Returns every unit reserved for `request_id` to `Available`.
    fn release_reservations(&self, request_id: &RecordId) -> BloodBankResult<usize> {
        let units = self.inventory.reserved_for(request_id);
        let released = units.len();
        for mut unit in units {
            unit.status = UnitStatus::Available;
            unit.reserved_for = None;
            self.inventory.update(&mut unit)?;
            tracing::info!(%request_id, bag_number = %unit.bag_number, "reservation released");
        }
        Ok(released)
    }

    fn open_request(&self, request_id: &RecordId) -> BloodBankResult<TransfusionRequest> {
        let request = self.requests.get(request_id)?;
        if !request.status.is_open() {
            tracing::warn!(request_id = %request.id, status = %request.status, "request is closed");
            return Err(BloodBankError::RequestClosed {
                request_id: request.id.to_string(),
                status: request.status.to_string(),
            });
        }
        Ok(request)
    }
}

/// Component, expiry and compatibility gates shared by reservation and issuance.
fn check_unit_for_request(
    request: &TransfusionRequest,
    unit: &BloodUnit,
    now: DateTime<Utc>,
) -> BloodBankResult<()> {
    if unit.component_type != request.component_type {
        tracing::warn!(
            request_id = %request.id,
            bag_number = %unit.bag_number,
            "refused: component mismatch"
        );
        return Err(BloodBankError::ComponentMismatch {
            requested: request.component_type,
            actual: unit.component_type,
        });
    }

    if is_expired_at(unit.expiry_date, now) {
        tracing::warn!(bag_number = %unit.bag_number, "refused: unit expired");
        return Err(BloodBankError::UnitExpired {
            bag_number: unit.bag_number.to_string(),
            expiry: unit.expiry_date,
        });
    }

    if !is_compatible(
        request.recipient_blood_type,
        unit.blood_type,
        request.component_type,
    ) {
        return Err(refuse_incompatible(request, unit));
    }

    Ok(())
}

fn refuse_unavailable(unit: &BloodUnit) -> BloodBankError {
    tracing::warn!(bag_number = %unit.bag_number, status = %unit.status, "refused: unit not available");
    BloodBankError::UnitUnavailable {
        bag_number: unit.bag_number.to_string(),
        status: unit.status.to_string(),
    }
}

fn refuse_incompatible(request: &TransfusionRequest, unit: &BloodUnit) -> BloodBankError {
    tracing::warn!(
        request_id = %request.id,
        bag_number = %unit.bag_number,
        recipient = %request.recipient_blood_type,
        donor = %unit.blood_type,
        "refused: incompatible blood type"
    );
    BloodBankError::Incompatible {
        recipient: request.recipient_blood_type,
        donor: unit.blood_type,
        component: unit.component_type,
    }
}
