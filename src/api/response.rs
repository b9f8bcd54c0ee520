//! Response types for the allocation engine API.
//!
//! This module defines the error response structures and error handling
//! for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server is accepting requests.
    pub status: String,
    /// Crate version of the running engine.
    pub version: String,
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl ApiErrorResponse {
    fn bad_request(code: &str, message: String, details: &str) -> Self {
        ApiErrorResponse {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::with_details(code, message, details),
        }
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            },
            EngineError::ConfigParseError { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    message,
                ),
            },
            EngineError::InvalidReading { .. } => Self::bad_request(
                "INVALID_READING",
                message,
                "Check the start and end readings of the room's meter",
            ),
            EngineError::DuplicateReading { .. } => Self::bad_request(
                "DUPLICATE_READING",
                message,
                "Submit exactly one reading per room",
            ),
            EngineError::MissingReading { .. } => Self::bad_request(
                "MISSING_READING",
                message,
                "Every registered room needs a reading for the period",
            ),
            EngineError::OverconsumedMeter { .. } => Self::bad_request(
                "OVERCONSUMED_METER",
                message,
                "Room meters recorded more than the house was billed for; recheck the readings",
            ),
            EngineError::ZeroElectricityTotal => Self::bad_request(
                "ZERO_ELECTRICITY_TOTAL",
                message,
                "The period's electricity total must be greater than zero",
            ),
            EngineError::EmptyRoomSet => Self::bad_request(
                "EMPTY_ROOM_SET",
                message,
                "Supply at least one meter reading",
            ),
            EngineError::InvalidBillingPeriod { .. } => Self::bad_request(
                "INVALID_BILLING_PERIOD",
                message,
                "The period's month and totals must be valid",
            ),
            EngineError::DuplicateRoom { .. } => Self::bad_request(
                "DUPLICATE_ROOM",
                message,
                "Room ids must be unique",
            ),
            EngineError::CalculationError { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            },
        }
    }
}
