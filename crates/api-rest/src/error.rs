use api_shared::ErrorRes;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bloodbank_core::BloodBankError;

/// Error returned by handlers; renders as a JSON `ErrorRes` with a mapped status code.
#[derive(Debug)]
pub struct ApiError(pub BloodBankError);

impl From<BloodBankError> for ApiError {
    fn from(err: BloodBankError) -> Self {
        Self(err)
    }
}

impl From<bloodbank_types::TypeError> for ApiError {
    fn from(err: bloodbank_types::TypeError) -> Self {
        Self(BloodBankError::Type(err))
    }
}

impl From<bloodbank_types::TextError> for ApiError {
    fn from(err: bloodbank_types::TextError) -> Self {
        Self(BloodBankError::Text(err))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BloodBankError::InvalidInput(_)
            | BloodBankError::Type(_)
            | BloodBankError::Text(_) => StatusCode::BAD_REQUEST,
            BloodBankError::NotFound { .. } => StatusCode::NOT_FOUND,
            BloodBankError::DonorIneligible { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            e if e.is_conflict() => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {:?}", self.0);
            "Internal error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(ErrorRes { error: message })).into_response()
    }
}
