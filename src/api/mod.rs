//! HTTP API module for the allocation engine.
//!
//! This module provides the REST API endpoints for allocating a billing
//! period's electricity cost, listing the registered rooms, and health checks.

mod cache;
mod handlers;
mod request;
mod response;
mod state;

pub use cache::ResultCache;
pub use handlers::create_router;
pub use request::{CalculationRequest, RoomEntry};
pub use response::{ApiError, ApiErrorResponse, HealthResponse};
pub use state::AppState;
