//! Error types for the allocation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that aborts an allocation run or configuration load.

use thiserror::Error;

use crate::models::RoomId;

/// The main error type for the allocation engine.
///
/// Every error is fatal to the current invocation. The engine never retries
/// and never returns a partial allocation; the caller corrects the input and
/// tries again.
///
/// # Example
///
/// ```
/// use allocation_engine::error::EngineError;
///
/// let error = EngineError::MissingReading { room_id: 3 };
/// assert_eq!(error.to_string(), "Missing meter reading for room 3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A meter reading is physically impossible.
    #[error("Invalid meter reading for room {room_id}: {message}")]
    InvalidReading {
        /// The room the reading belongs to.
        room_id: RoomId,
        /// What made the reading invalid.
        message: String,
    },

    /// More than one reading was supplied for the same room.
    #[error("Duplicate meter reading for room {room_id}")]
    DuplicateReading {
        /// The room with more than one reading.
        room_id: RoomId,
    },

    /// A registered room has no reading for the period.
    #[error("Missing meter reading for room {room_id}")]
    MissingReading {
        /// The registered room without a reading.
        room_id: RoomId,
    },

    /// Summed direct usage exceeds the electricity supplied for the period.
    #[error(
        "Metered usage {direct_total} exceeds the period total of {total_electricity}"
    )]
    OverconsumedMeter {
        /// Sum of direct usage over all participating rooms.
        direct_total: i64,
        /// The electricity total from the invoice.
        total_electricity: i64,
    },

    /// The period's electricity total is zero.
    #[error("Total electricity for the period is zero")]
    ZeroElectricityTotal,

    /// No rooms or readings take part in the allocation.
    #[error("No rooms to allocate")]
    EmptyRoomSet,

    /// A billing period field is out of range or malformed.
    #[error("Invalid billing period field '{field}': {message}")]
    InvalidBillingPeriod {
        /// The offending field.
        field: String,
        /// What made the field invalid.
        message: String,
    },

    /// The room registry lists the same id twice.
    #[error("Duplicate room id {room_id} in registry")]
    DuplicateRoom {
        /// The repeated room id.
        room_id: RoomId,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
