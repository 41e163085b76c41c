//! # API REST
//!
//! REST API implementation for the blood bank.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialisation, CORS, status codes)
//!
//! Engine lookups (`/compatibility`, `/lifecycle`, `/presentation`) accept raw labels and use the
//! lenient core functions: an unknown blood type is incompatible, an unknown component falls back
//! to whole blood. Record-changing endpoints parse labels strictly and reject bad input with 400.

#![warn(rust_2018_idioms)]

mod convert;
mod error;
mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use bloodbank_core::{BloodBankService, CoreConfig};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use error::ApiError;

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<BloodBankService>,
}

impl AppState {
    /// Builds the state from a resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage layout cannot be created.
    pub fn new(cfg: Arc<CoreConfig>) -> bloodbank_core::BloodBankResult<Self> {
        let service = Arc::new(BloodBankService::new(cfg)?);
        Ok(Self { service })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::is_compatible,
        handlers::compatible_donors,
        handlers::compatible_recipients,
        handlers::expiry_date,
        handlers::eligibility,
        handlers::new_bag_number,
        handlers::blood_type_color,
        handlers::priority_color,
        handlers::list_donors,
        handlers::register_donor,
        handlers::get_donor,
        handlers::record_donation,
        handlers::list_donor_donations,
        handlers::list_donations,
        handlers::get_donation,
        handlers::list_inventory,
        handlers::add_unit,
        handlers::stock_summary,
        handlers::discard_expired,
        handlers::list_requests,
        handlers::create_request,
        handlers::get_request,
        handlers::compatible_units,
        handlers::reserve_unit,
        handlers::issue_unit,
        handlers::cancel_request,
        handlers::record_transfusion,
        handlers::list_transfusions,
        handlers::get_transfusion,
        handlers::list_request_transfusions,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::ErrorRes,
        api_shared::CompatibilityRes,
        api_shared::BloodTypeListRes,
        api_shared::ExpiryRes,
        api_shared::EligibilityRes,
        api_shared::BagNumberRes,
        api_shared::ColorRes,
        api_shared::DonorRes,
        api_shared::ListDonorsRes,
        api_shared::DonationRes,
        api_shared::ListDonationsRes,
        api_shared::RegisterDonorReq,
        api_shared::RecordDonationReq,
        api_shared::RecordDonationRes,
        api_shared::UnitRes,
        api_shared::AddUnitReq,
        api_shared::ListUnitsRes,
        api_shared::StockLevelRes,
        api_shared::StockSummaryRes,
        api_shared::CreateRequestReq,
        api_shared::RequestRes,
        api_shared::ListRequestsRes,
        api_shared::UnitActionReq,
        api_shared::RecordTransfusionReq,
        api_shared::TransfusionRes,
        api_shared::ListTransfusionsRes,
    ))
)]
pub struct ApiDoc;

/// Builds the full router, including Swagger UI and CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/compatibility", get(handlers::is_compatible))
        .route("/compatibility/donors", get(handlers::compatible_donors))
        .route(
            "/compatibility/recipients",
            get(handlers::compatible_recipients),
        )
        .route("/lifecycle/expiry", get(handlers::expiry_date))
        .route("/lifecycle/eligibility", get(handlers::eligibility))
        .route("/bag-numbers", post(handlers::new_bag_number))
        .route(
            "/presentation/blood-types/:label/color",
            get(handlers::blood_type_color),
        )
        .route(
            "/presentation/priorities/:label/color",
            get(handlers::priority_color),
        )
        .route(
            "/donors",
            get(handlers::list_donors).post(handlers::register_donor),
        )
        .route("/donors/:id", get(handlers::get_donor))
        .route(
            "/donors/:id/donations",
            get(handlers::list_donor_donations).post(handlers::record_donation),
        )
        .route("/donations", get(handlers::list_donations))
        .route("/donations/:id", get(handlers::get_donation))
        .route(
            "/inventory",
            get(handlers::list_inventory).post(handlers::add_unit),
        )
        .route("/inventory/summary", get(handlers::stock_summary))
        .route(
            "/inventory/discard-expired",
            post(handlers::discard_expired),
        )
        .route(
            "/requests",
            get(handlers::list_requests).post(handlers::create_request),
        )
        .route("/requests/:id", get(handlers::get_request))
        .route(
            "/requests/:id/compatible-units",
            get(handlers::compatible_units),
        )
        .route("/requests/:id/reserve", post(handlers::reserve_unit))
        .route("/requests/:id/issue", post(handlers::issue_unit))
        .route("/requests/:id/cancel", post(handlers::cancel_request))
        .route(
            "/requests/:id/transfusions",
            get(handlers::list_request_transfusions),
        )
        .route(
            "/transfusions",
            get(handlers::list_transfusions).post(handlers::record_transfusion),
        )
        .route("/transfusions/:id", get(handlers::get_transfusion))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
