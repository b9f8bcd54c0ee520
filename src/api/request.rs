//! Request types for the allocation engine API.
//!
//! This module defines the JSON request structures for the
//! `/api/electric/calculate` endpoint and the room entries exchanged with
//! the room list endpoint.

use serde::{Deserialize, Serialize};

use crate::calculation::AllocationInput;
use crate::error::EngineResult;
use crate::models::{
    BillingMonth, BillingPeriod, LaundryCount, LaundryRecord, MeterReading, Room, RoomId,
    RoomRegistry, count_cycles,
};

/// Request body for the `/api/electric/calculate` endpoint.
///
/// Laundry usage may arrive pre-counted (`laundryCounts`), as the raw log
/// (`laundryRecords`, counted for `month`), or both; the two are summed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    /// The billing month (`YYYY-MM` or `MM-YYYY`).
    pub month: BillingMonth,
    /// The invoice amount in minor currency units.
    pub total_money: i64,
    /// Electricity delivered to the house in the period.
    #[serde(alias = "totalElectric")]
    pub total_electricity: i64,
    /// One meter reading per room.
    #[serde(alias = "electrics")]
    pub readings: Vec<MeterReading>,
    /// Wash cycles per room, already counted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub laundry_counts: Vec<LaundryCount>,
    /// Raw laundry log entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub laundry_records: Vec<LaundryRecord>,
    /// Room registry to use instead of the configured one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<Vec<RoomEntry>>,
}

/// A room as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEntry {
    /// The room identifier.
    pub id: RoomId,
    /// The room's display name.
    pub room_name: String,
}

impl From<&Room> for RoomEntry {
    fn from(room: &Room) -> Self {
        RoomEntry {
            id: room.id,
            room_name: room.name.clone(),
        }
    }
}

impl From<RoomEntry> for Room {
    fn from(entry: RoomEntry) -> Self {
        Room {
            id: entry.id,
            name: entry.room_name,
        }
    }
}

impl CalculationRequest {
    /// Splits the request into the engine input and the registry to use.
    ///
    /// `default_registry` is used unless the request carries its own rooms.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateRoom` if the request's room list repeats an id.
    pub fn into_parts(
        self,
        default_registry: &RoomRegistry,
    ) -> EngineResult<(AllocationInput, RoomRegistry)> {
        let registry = match self.rooms {
            Some(rooms) => RoomRegistry::new(rooms.into_iter().map(Into::into).collect())?,
            None => default_registry.clone(),
        };

        let mut laundry_counts = self.laundry_counts;
        laundry_counts.extend(count_cycles(&self.laundry_records, self.month));

        let input = AllocationInput {
            period: BillingPeriod {
                month: self.month,
                total_money: self.total_money,
                total_electricity: self.total_electricity,
            },
            readings: self.readings,
            laundry_counts,
        };

        Ok((input, registry))
    }
}
