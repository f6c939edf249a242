//! HTTP mapping of hub errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{hub::HubError, infrastructure::dto::http::ErrorResponseDto};

impl HubError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HubError::UpgradeFailed(_) | HubError::InvalidSessionId(_) => StatusCode::BAD_REQUEST,
            HubError::NotFound(_) => StatusCode::NOT_FOUND,
            HubError::DeliveryFailed { .. } => StatusCode::BAD_GATEWAY,
            HubError::Rejected(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponseDto {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
