//! Route handlers.
//!
//! Handlers are thin: they parse wire labels, call into `bloodbank_core` and convert the result
//! back to wire bodies. Storage I/O is small and local so it runs inline on the runtime.

use crate::convert::{
    donation_res, donor_res, request_res, stock_level_res, transfusion_res, unit_res,
};
use crate::{ApiError, AppState};
use api_shared::{
    AddUnitReq, BagNumberRes, BloodTypeListRes, ColorRes, CompatibilityQuery, CompatibilityRes,
    CompatibleDonorsQuery, CompatibleRecipientsQuery, CreateRequestReq, DonationRes, DonorRes,
    DonorsQuery, EligibilityQuery, EligibilityRes, ExpiryQuery, ExpiryRes, HealthRes,
    HealthService, InventoryQuery, ListDonationsRes, ListDonorsRes, ListRequestsRes,
    ListTransfusionsRes, ListUnitsRes, RecordDonationReq, RecordDonationRes, RecordTransfusionReq,
    RegisterDonorReq, RequestRes, RequestsQuery, StockSummaryRes, TransfusionRes, UnitActionReq,
    UnitRes,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use bloodbank_core::compatibility::{
    compatible_donors_lenient, compatible_recipients_lenient, is_compatible_lenient,
};
use bloodbank_core::identifiers::generate_bag_number;
use bloodbank_core::lifecycle::{
    calculate_expiry_date_lenient, calculate_next_eligible_date, is_donor_eligible,
};
use bloodbank_core::models::UnitStatus;
use bloodbank_core::presentation::{blood_type_color_lenient, priority_color_lenient};
use bloodbank_core::repositories::requests::NewRequest;
use bloodbank_core::{BagNumber, BloodType, ComponentType, Priority, RecordId};
use bloodbank_types::NonEmptyText;
use chrono::Utc;

type ApiResult<T> = Result<Json<T>, ApiError>;
type Created<T> = Result<(StatusCode, Json<T>), ApiError>;

fn labels(blood_types: Vec<BloodType>) -> BloodTypeListRes {
    BloodTypeListRes {
        blood_types: blood_types.into_iter().map(|bt| bt.to_string()).collect(),
    }
}

// ----------------------------------------------------------------------------
// Engine lookups
// ----------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used by monitoring and load balancers.
pub(crate) async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/compatibility",
    params(CompatibilityQuery),
    responses(
        (status = 200, description = "Whether the donor type may be given to the recipient", body = CompatibilityRes)
    )
)]
/// Checks a single recipient/donor pairing for a component.
///
/// Unknown blood types are reported as incompatible and an unknown component is treated as whole
/// blood, so this endpoint never fails on label content.
pub(crate) async fn is_compatible(Query(q): Query<CompatibilityQuery>) -> Json<CompatibilityRes> {
    let compatible = is_compatible_lenient(&q.recipient, &q.donor, &q.component);
    tracing::debug!(recipient = %q.recipient, donor = %q.donor, component = %q.component, compatible, "compatibility lookup");
    Json(CompatibilityRes {
        recipient: q.recipient,
        donor: q.donor,
        component: q.component,
        compatible,
    })
}

#[utoipa::path(
    get,
    path = "/compatibility/donors",
    params(CompatibleDonorsQuery),
    responses(
        (status = 200, description = "Donor types acceptable for the recipient", body = BloodTypeListRes)
    )
)]
pub(crate) async fn compatible_donors(
    Query(q): Query<CompatibleDonorsQuery>,
) -> Json<BloodTypeListRes> {
    Json(labels(compatible_donors_lenient(&q.recipient, &q.component)))
}

#[utoipa::path(
    get,
    path = "/compatibility/recipients",
    params(CompatibleRecipientsQuery),
    responses(
        (status = 200, description = "Recipient types that may receive the donor type", body = BloodTypeListRes)
    )
)]
pub(crate) async fn compatible_recipients(
    Query(q): Query<CompatibleRecipientsQuery>,
) -> Json<BloodTypeListRes> {
    Json(labels(compatible_recipients_lenient(&q.donor, &q.component)))
}

#[utoipa::path(
    get,
    path = "/lifecycle/expiry",
    params(ExpiryQuery),
    responses(
        (status = 200, description = "Expiry date for the component", body = ExpiryRes),
        (status = 400, description = "Malformed collection date")
    )
)]
pub(crate) async fn expiry_date(Query(q): Query<ExpiryQuery>) -> Json<ExpiryRes> {
    Json(ExpiryRes {
        expiry_date: calculate_expiry_date_lenient(q.collection_date, &q.component),
        collection_date: q.collection_date,
        component: q.component,
    })
}

#[utoipa::path(
    get,
    path = "/lifecycle/eligibility",
    params(EligibilityQuery),
    responses(
        (status = 200, description = "Donor eligibility as of now", body = EligibilityRes)
    )
)]
/// Reports whether a donor with the given last donation date may donate today.
///
/// A donor with no recorded donation is always eligible and has no next eligible date.
pub(crate) async fn eligibility(Query(q): Query<EligibilityQuery>) -> Json<EligibilityRes> {
    Json(EligibilityRes {
        eligible: is_donor_eligible(q.last_donation_date),
        next_eligible_date: q.last_donation_date.map(calculate_next_eligible_date),
    })
}

#[utoipa::path(
    post,
    path = "/bag-numbers",
    responses(
        (status = 200, description = "Freshly generated bag number", body = BagNumberRes)
    )
)]
/// Generates a bag number without reserving it.
///
/// Uniqueness is only guaranteed when a unit is stored under the number; use the inventory
/// endpoints for intake.
pub(crate) async fn new_bag_number() -> Json<BagNumberRes> {
    Json(BagNumberRes {
        bag_number: generate_bag_number().to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/presentation/blood-types/{label}/color",
    params(("label" = String, Path, description = "Blood type label, e.g. `O-`")),
    responses(
        (status = 200, description = "Colour token for the blood type", body = ColorRes)
    )
)]
pub(crate) async fn blood_type_color(Path(label): Path<String>) -> Json<ColorRes> {
    let color = blood_type_color_lenient(&label).to_string();
    Json(ColorRes { label, color })
}

#[utoipa::path(
    get,
    path = "/presentation/priorities/{label}/color",
    params(("label" = String, Path, description = "Priority label, e.g. `urgent`")),
    responses(
        (status = 200, description = "Colour token for the priority", body = ColorRes)
    )
)]
pub(crate) async fn priority_color(Path(label): Path<String>) -> Json<ColorRes> {
    let color = priority_color_lenient(&label).to_string();
    Json(ColorRes { label, color })
}

// ----------------------------------------------------------------------------
// Donors
// ----------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/donors",
    params(DonorsQuery),
    responses(
        (status = 200, description = "Registered donors, ordered by name", body = ListDonorsRes),
        (status = 400, description = "Unknown blood type filter")
    )
)]
pub(crate) async fn list_donors(
    State(state): State<AppState>,
    Query(q): Query<DonorsQuery>,
) -> ApiResult<ListDonorsRes> {
    let repo = state.service.donors();
    let donors = match q.blood_type.as_deref() {
        Some(label) => repo.list_by_blood_type(label.parse::<BloodType>()?),
        None => repo.list(),
    };
    Ok(Json(ListDonorsRes {
        donors: donors.into_iter().map(donor_res).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/donors",
    request_body = RegisterDonorReq,
    responses(
        (status = 201, description = "Donor registered", body = DonorRes),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    )
)]
pub(crate) async fn register_donor(
    State(state): State<AppState>,
    Json(req): Json<RegisterDonorReq>,
) -> Created<DonorRes> {
    let blood_type: BloodType = req.blood_type.parse()?;
    let donor = state.service.register_donor(
        &req.name,
        blood_type,
        req.last_donation_date,
        req.contact,
    )?;
    Ok((StatusCode::CREATED, Json(donor_res(donor))))
}

#[utoipa::path(
    get,
    path = "/donors/{id}",
    params(("id" = String, Path, description = "Donor id")),
    responses(
        (status = 200, description = "Donor record with eligibility computed now", body = DonorRes),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Donor not found")
    )
)]
pub(crate) async fn get_donor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DonorRes> {
    let id = RecordId::parse(&id)?;
    let donor = state.service.donors().get(&id)?;
    Ok(Json(donor_res(donor)))
}

#[utoipa::path(
    post,
    path = "/donors/{id}/donations",
    params(("id" = String, Path, description = "Donor id")),
    request_body = RecordDonationReq,
    responses(
        (status = 201, description = "Donation recorded and unit taken into stock", body = RecordDonationRes),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Donor not found"),
        (status = 422, description = "Donor not yet eligible")
    )
)]
/// Records a donation from a registered donor.
///
/// The collected unit takes the donor's blood type, a fresh bag number and an expiry derived
/// from the component.
pub(crate) async fn record_donation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RecordDonationReq>,
) -> Created<RecordDonationRes> {
    let id = RecordId::parse(&id)?;
    let component: ComponentType = req.component.parse()?;
    let (donation, unit) = state
        .service
        .record_donation(&id, component, req.volume_ml)?;
    Ok((
        StatusCode::CREATED,
        Json(RecordDonationRes {
            donation_id: donation.id.to_string(),
            unit: unit_res(unit, Utc::now()),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/donors/{id}/donations",
    params(("id" = String, Path, description = "Donor id")),
    responses(
        (status = 200, description = "The donor's donations, most recent first", body = ListDonationsRes),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Donor not found")
    )
)]
pub(crate) async fn list_donor_donations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ListDonationsRes> {
    let id = RecordId::parse(&id)?;
    let donor = state.service.donors().get(&id)?;
    let donations = state
        .service
        .donations()
        .list_for_donor(&donor.id)
        .into_iter()
        .map(donation_res)
        .collect();
    Ok(Json(ListDonationsRes { donations }))
}

#[utoipa::path(
    get,
    path = "/donations",
    responses(
        (status = 200, description = "All donations, most recent first", body = ListDonationsRes)
    )
)]
pub(crate) async fn list_donations(State(state): State<AppState>) -> Json<ListDonationsRes> {
    let donations = state
        .service
        .donations()
        .list()
        .into_iter()
        .map(donation_res)
        .collect();
    Json(ListDonationsRes { donations })
}

#[utoipa::path(
    get,
    path = "/donations/{id}",
    params(("id" = String, Path, description = "Donation id")),
    responses(
        (status = 200, description = "Donation record", body = DonationRes),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Donation not found")
    )
)]
pub(crate) async fn get_donation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DonationRes> {
    let id = RecordId::parse(&id)?;
    let donation = state.service.donations().get(&id)?;
    Ok(Json(donation_res(donation)))
}

// ----------------------------------------------------------------------------
// Inventory
// ----------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/inventory",
    params(InventoryQuery),
    responses(
        (status = 200, description = "Units in stock", body = ListUnitsRes),
        (status = 400, description = "Unknown status filter")
    )
)]
pub(crate) async fn list_inventory(
    State(state): State<AppState>,
    Query(q): Query<InventoryQuery>,
) -> ApiResult<ListUnitsRes> {
    let inventory = state.service.inventory();
    let mut units = match (q.status.as_deref(), q.active) {
        (Some(status), _) => inventory.list_by_status(status.parse::<UnitStatus>()?),
        (None, Some(true)) => inventory.list_active(),
        (None, _) => inventory.list(),
    };
    if let Some(active) = q.active {
        units.retain(|u| u.status.is_active() == active);
    }
    let now = Utc::now();
    Ok(Json(ListUnitsRes {
        units: units.into_iter().map(|u| unit_res(u, now)).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/inventory",
    request_body = AddUnitReq,
    responses(
        (status = 201, description = "Unit taken into stock", body = UnitRes),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    )
)]
pub(crate) async fn add_unit(
    State(state): State<AppState>,
    Json(req): Json<AddUnitReq>,
) -> Created<UnitRes> {
    let blood_type: BloodType = req.blood_type.parse()?;
    let component: ComponentType = req.component.parse()?;
    let unit = state
        .service
        .add_unit(blood_type, component, req.collection_date, req.volume_ml)?;
    Ok((StatusCode::CREATED, Json(unit_res(unit, Utc::now()))))
}

#[utoipa::path(
    get,
    path = "/inventory/summary",
    responses(
        (status = 200, description = "Usable units per blood type and component", body = StockSummaryRes)
    )
)]
pub(crate) async fn stock_summary(State(state): State<AppState>) -> Json<StockSummaryRes> {
    let levels = state
        .service
        .stock_summary()
        .into_iter()
        .map(stock_level_res)
        .collect();
    Json(StockSummaryRes { levels })
}

#[utoipa::path(
    post,
    path = "/inventory/discard-expired",
    responses(
        (status = 200, description = "Units discarded by this sweep", body = ListUnitsRes),
        (status = 500, description = "Internal server error")
    )
)]
pub(crate) async fn discard_expired(State(state): State<AppState>) -> ApiResult<ListUnitsRes> {
    let now = Utc::now();
    let units = state.service.discard_expired_at(now)?;
    Ok(Json(ListUnitsRes {
        units: units.into_iter().map(|u| unit_res(u, now)).collect(),
    }))
}

// ----------------------------------------------------------------------------
// Requests and transfusions
// ----------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/requests",
    request_body = CreateRequestReq,
    responses(
        (status = 201, description = "Request opened", body = RequestRes),
        (status = 400, description = "Bad request")
    )
)]
pub(crate) async fn create_request(
    State(state): State<AppState>,
    Json(req): Json<CreateRequestReq>,
) -> Created<RequestRes> {
    let request = state.service.create_request(NewRequest {
        patient_ref: NonEmptyText::new(&req.patient_ref)?,
        recipient_blood_type: req.recipient_blood_type.parse()?,
        component_type: req.component.parse()?,
        units_requested: req.units_requested,
        priority: req.priority.parse::<Priority>()?,
        notes: req.notes,
    })?;
    Ok((StatusCode::CREATED, Json(request_res(request))))
}

#[utoipa::path(
    get,
    path = "/requests",
    params(RequestsQuery),
    responses(
        (status = 200, description = "Requests, most urgent first then oldest first", body = ListRequestsRes)
    )
)]
pub(crate) async fn list_requests(
    State(state): State<AppState>,
    Query(q): Query<RequestsQuery>,
) -> Json<ListRequestsRes> {
    let repo = state.service.requests();
    let requests = match q.open {
        Some(true) => repo.list_open(),
        Some(false) => repo
            .list()
            .into_iter()
            .filter(|r| !r.status.is_open())
            .collect(),
        None => repo.list(),
    };
    Json(ListRequestsRes {
        requests: requests.into_iter().map(request_res).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/requests/{id}",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Transfusion request", body = RequestRes),
        (status = 404, description = "Request not found")
    )
)]
pub(crate) async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<RequestRes> {
    let id = RecordId::parse(&id)?;
    let request = state.service.requests().get(&id)?;
    Ok(Json(request_res(request)))
}

#[utoipa::path(
    get,
    path = "/requests/{id}/compatible-units",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Issuable units, exact type matches first", body = ListUnitsRes),
        (status = 404, description = "Request not found")
    )
)]
pub(crate) async fn compatible_units(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ListUnitsRes> {
    let id = RecordId::parse(&id)?;
    let now = Utc::now();
    let units = state.service.compatible_units(&id)?;
    Ok(Json(ListUnitsRes {
        units: units.into_iter().map(|u| unit_res(u, now)).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/requests/{id}/reserve",
    params(("id" = String, Path, description = "Request id")),
    request_body = UnitActionReq,
    responses(
        (status = 200, description = "Unit reserved for the request", body = UnitRes),
        (status = 404, description = "Request or unit not found"),
        (status = 409, description = "Unit unavailable, expired, mismatched or incompatible")
    )
)]
pub(crate) async fn reserve_unit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UnitActionReq>,
) -> ApiResult<UnitRes> {
    let id = RecordId::parse(&id)?;
    let bag_number = BagNumber::parse(&req.bag_number)?;
    let unit = state.service.reserve_unit(&id, &bag_number)?;
    Ok(Json(unit_res(unit, Utc::now())))
}

#[utoipa::path(
    post,
    path = "/requests/{id}/issue",
    params(("id" = String, Path, description = "Request id")),
    request_body = UnitActionReq,
    responses(
        (status = 200, description = "Unit issued against the request", body = UnitRes),
        (status = 404, description = "Request or unit not found"),
        (status = 409, description = "Unit unavailable, expired, mismatched or incompatible")
    )
)]
pub(crate) async fn issue_unit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UnitActionReq>,
) -> ApiResult<UnitRes> {
    let id = RecordId::parse(&id)?;
    let bag_number = BagNumber::parse(&req.bag_number)?;
    let unit = state.service.issue_unit(&id, &bag_number)?;
    Ok(Json(unit_res(unit, Utc::now())))
}

#[utoipa::path(
    post,
    path = "/requests/{id}/cancel",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request cancelled and reservations released", body = RequestRes),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already closed")
    )
)]
pub(crate) async fn cancel_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<RequestRes> {
    let id = RecordId::parse(&id)?;
    let request = state.service.cancel_request(&id)?;
    Ok(Json(request_res(request)))
}

#[utoipa::path(
    post,
    path = "/transfusions",
    request_body = RecordTransfusionReq,
    responses(
        (status = 201, description = "Transfusion recorded", body = TransfusionRes),
        (status = 404, description = "Request or unit not found"),
        (status = 409, description = "Unit not issued to the request or incompatible")
    )
)]
pub(crate) async fn record_transfusion(
    State(state): State<AppState>,
    Json(req): Json<RecordTransfusionReq>,
) -> Created<TransfusionRes> {
    let request_id = RecordId::parse(&req.request_id)?;
    let bag_number = BagNumber::parse(&req.bag_number)?;
    let transfusion = state
        .service
        .record_transfusion(&request_id, &bag_number, req.adverse_reaction)?;
    Ok((StatusCode::CREATED, Json(transfusion_res(transfusion))))
}

#[utoipa::path(
    get,
    path = "/transfusions",
    responses(
        (status = 200, description = "All transfusions, most recent first", body = ListTransfusionsRes)
    )
)]
pub(crate) async fn list_transfusions(State(state): State<AppState>) -> Json<ListTransfusionsRes> {
    let transfusions = state
        .service
        .transfusions()
        .list()
        .into_iter()
        .map(transfusion_res)
        .collect();
    Json(ListTransfusionsRes { transfusions })
}

#[utoipa::path(
    get,
    path = "/transfusions/{id}",
    params(("id" = String, Path, description = "Transfusion id")),
    responses(
        (status = 200, description = "Transfusion record", body = TransfusionRes),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Transfusion not found")
    )
)]
pub(crate) async fn get_transfusion(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TransfusionRes> {
    let id = RecordId::parse(&id)?;
    let transfusion = state.service.transfusions().get(&id)?;
    Ok(Json(transfusion_res(transfusion)))
}

#[utoipa::path(
    get,
    path = "/requests/{id}/transfusions",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Transfusions recorded against the request", body = ListTransfusionsRes),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Request not found")
    )
)]
pub(crate) async fn list_request_transfusions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ListTransfusionsRes> {
    let id = RecordId::parse(&id)?;
    let request = state.service.requests().get(&id)?;
    let transfusions = state
        .service
        .transfusions()
        .list_for_request(&request.id)
        .into_iter()
        .map(transfusion_res)
        .collect();
    Ok(Json(ListTransfusionsRes { transfusions }))
}
