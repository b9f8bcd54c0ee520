//! Meter reading model.
//!
//! This module defines [`MeterReading`], the start and end values of a
//! room's cumulative electricity meter for one billing period.

use serde::{Deserialize, Serialize};

use super::RoomId;
use crate::error::{EngineError, EngineResult};

/// Start and end meter values for one room in one billing period.
///
/// Values are signed so that negative data-entry mistakes reach validation
/// instead of failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterReading {
    /// The room this meter belongs to.
    pub room_id: RoomId,
    /// Cumulative meter units at the start of the period.
    pub start_electric: i64,
    /// Cumulative meter units at the end of the period.
    pub end_electric: i64,
}

impl MeterReading {
    /// Checks that the reading is physically possible.
    ///
    /// # Errors
    ///
    /// Returns `InvalidReading` if either value is negative or if the end
    /// value is not strictly greater than the start value.
    ///
    /// # Example
    ///
    /// ```
    /// use allocation_engine::models::MeterReading;
    ///
    /// let ok = MeterReading { room_id: 1, start_electric: 100, end_electric: 150 };
    /// assert!(ok.validate().is_ok());
    ///
    /// let stalled = MeterReading { room_id: 1, start_electric: 150, end_electric: 150 };
    /// assert!(stalled.validate().is_err());
    /// ```
    pub fn validate(&self) -> EngineResult<()> {
        if self.start_electric < 0 {
            return Err(self.invalid(format!(
                "start reading {} is negative",
                self.start_electric
            )));
        }
        if self.end_electric < 0 {
            return Err(self.invalid(format!(
                "end reading {} is negative",
                self.end_electric
            )));
        }
        if self.end_electric <= self.start_electric {
            return Err(self.invalid(format!(
                "end reading {} is not above start reading {}",
                self.end_electric, self.start_electric
            )));
        }
        Ok(())
    }

    /// Returns the units consumed during the period.
    ///
    /// Only meaningful for a reading that passed [`MeterReading::validate`].
    pub fn usage(&self) -> i64 {
        self.end_electric - self.start_electric
    }

    fn invalid(&self, message: String) -> EngineError {
        EngineError::InvalidReading {
            room_id: self.room_id,
            message,
        }
    }
}
