//! Unified API error handling
//!
//! Every endpoint returns `Result<T, ApiError>` so failures share one body format.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::service::{EnvironmentError, FacilityError, GeocodeError};

/// Standard error response format
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always "error"
    pub status: String,
    /// Error type/code
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Unique request ID for tracing
    pub request_id: String,
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Location or resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Bad request / validation error (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Upstream returned something unusable (502)
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Feature not configured or upstream has no data (503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::ExternalService(_) => "external_service_error",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_type = self.error_type();

        tracing::error!(
            error_type = error_type,
            status = status.as_u16(),
            message = %self,
            "API error"
        );

        HttpResponse::build(status).json(ErrorResponse {
            status: "error".to_string(),
            error: error_type.to_string(),
            message: self.to_string(),
            request_id: Uuid::new_v4().to_string(),
        })
    }
}

// ============================================================================
// From conversions for service errors
// ============================================================================

impl From<GeocodeError> for ApiError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NotFound(_) => ApiError::NotFound(err.to_string()),
            GeocodeError::HttpError(e) => ApiError::ExternalService(e.to_string()),
            GeocodeError::ParseError(msg) => ApiError::ExternalService(msg),
        }
    }
}

impl From<FacilityError> for ApiError {
    fn from(err: FacilityError) -> Self {
        match err {
            FacilityError::Geocode(e) => e.into(),
        }
    }
}

impl From<EnvironmentError> for ApiError {
    fn from(err: EnvironmentError) -> Self {
        match err {
            EnvironmentError::Geocode(e) => e.into(),
            EnvironmentError::HttpError(e) => ApiError::ExternalService(e.to_string()),
            EnvironmentError::ParseError(msg) => ApiError::ExternalService(msg),
            EnvironmentError::MissingApiKey | EnvironmentError::NoData(_) => {
                ApiError::ServiceUnavailable(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let not_found: ApiError = GeocodeError::NotFound("Atlantis".to_string()).into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "Could not find coordinates for: Atlantis");

        let no_key: ApiError = EnvironmentError::MissingApiKey.into();
        assert_eq!(no_key.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let bad_upstream: ApiError = EnvironmentError::ParseError("bad json".to_string()).into();
        assert_eq!(bad_upstream.status_code(), StatusCode::BAD_GATEWAY);

        let facility: ApiError =
            FacilityError::Geocode(GeocodeError::NotFound("Atlantis".to_string())).into();
        assert_eq!(facility.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_body() {
        let response = ApiError::BadRequest("location is required".to_string()).error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
