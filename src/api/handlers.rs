//! HTTP request handlers for the allocation engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{allocate_fingerprinted, input_fingerprint};

use super::cache::ResultCache;
use super::request::{CalculationRequest, RoomEntry};
use super::response::{ApiError, ApiErrorResponse, HealthResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/electric/calculate", post(calculate_handler))
        .route("/api/room/list", get(room_list_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

/// Handler for POST /api/electric/calculate.
///
/// Accepts a billing period with meter readings and laundry usage and
/// returns the per-room allocation.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing allocation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    warn!(
                        correlation_id = %correlation_id,
                        error = %body_text,
                        "JSON data error"
                    );
                    ApiError::validation_error(body_text)
                }
                JsonRejection::JsonSyntaxError(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        error = %err,
                        "JSON syntax error"
                    );
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            return json_response(StatusCode::BAD_REQUEST, error);
        }
    };

    let config = state.config();
    let (input, registry) = match request.into_parts(config.registry()) {
        Ok(parts) => parts,
        Err(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "Invalid room list");
            return error_response(err.into());
        }
    };
    let options = config.options();

    let fingerprint = input_fingerprint(&input, &registry, &options);
    let key = ResultCache::key(input.period.month, &fingerprint);
    if let Some(cached) = state.cache().get(&key) {
        info!(
            correlation_id = %correlation_id,
            month = %input.period.month,
            "Returning cached allocation"
        );
        return json_response(StatusCode::OK, cached.as_ref());
    }

    let start_time = Instant::now();
    match allocate_fingerprinted(&input, &registry, &options, fingerprint) {
        Ok(result) => {
            let duration = start_time.elapsed();
            info!(
                correlation_id = %correlation_id,
                month = %result.month,
                rooms = result.rooms.len(),
                total_money = result.total_money,
                shared_electricity = result.shared_electricity,
                warnings = result.audit_trace.warnings.len(),
                duration_us = duration.as_micros(),
                "Allocation completed successfully"
            );
            let result = Arc::new(result);
            state.cache().insert(key, Arc::clone(&result));
            json_response(StatusCode::OK, result.as_ref())
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Allocation failed"
            );
            error_response(err.into())
        }
    }
}

/// Handler for GET /api/room/list.
///
/// Returns the configured room registry in id order.
async fn room_list_handler(State(state): State<AppState>) -> Response {
    let rooms: Vec<RoomEntry> = state.config().registry().rooms().map(Into::into).collect();
    json_response(StatusCode::OK, rooms)
}

/// Handler for GET /health.
async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    )
}
