//! Laundry record and cycle count models.
//!
//! The laundry log is append-only: one [`LaundryRecord`] per wash cycle.
//! The engine never looks at timestamps; it consumes [`LaundryCount`]s,
//! which [`count_cycles`] derives from the log for a given month.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{BillingMonth, RoomId};

/// One wash cycle recorded for a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaundryRecord {
    /// Record identifier assigned by the laundry store.
    pub id: u64,
    /// The room that ran the cycle.
    pub room_id: RoomId,
    /// When the cycle was recorded.
    pub created_at: NaiveDateTime,
}

/// Number of wash cycles a room ran in one billing month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaundryCount {
    /// The room the cycles belong to.
    pub room_id: RoomId,
    /// Cycles counted in the month.
    pub count: u32,
}

/// Counts wash cycles per room for the given month.
///
/// Records outside the month are ignored. The result is ordered by room id
/// and contains only rooms with at least one cycle.
///
/// # Example
///
/// ```
/// use allocation_engine::models::{count_cycles, BillingMonth, LaundryRecord};
/// use chrono::NaiveDateTime;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let records = vec![
///     LaundryRecord { id: 1, room_id: 2, created_at: at("2025-10-01 08:00:00") },
///     LaundryRecord { id: 2, room_id: 2, created_at: at("2025-10-15 19:30:00") },
///     LaundryRecord { id: 3, room_id: 1, created_at: at("2025-09-30 22:00:00") },
/// ];
///
/// let month: BillingMonth = "2025-10".parse().unwrap();
/// let counts = count_cycles(&records, month);
///
/// assert_eq!(counts.len(), 1);
/// assert_eq!(counts[0].room_id, 2);
/// assert_eq!(counts[0].count, 2);
/// ```
pub fn count_cycles(records: &[LaundryRecord], month: BillingMonth) -> Vec<LaundryCount> {
    let mut counts: BTreeMap<RoomId, u32> = BTreeMap::new();
    for record in records.iter().filter(|r| month.contains(r.created_at)) {
        *counts.entry(record.room_id).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(room_id, count)| LaundryCount { room_id, count })
        .collect()
}

/// Merges count entries by room, summing repeated entries.
///
/// Counts are `u64` so that summing many `u32` entries cannot overflow.
pub fn merge_counts(counts: &[LaundryCount]) -> BTreeMap<RoomId, u64> {
    let mut merged: BTreeMap<RoomId, u64> = BTreeMap::new();
    for entry in counts {
        *merged.entry(entry.room_id).or_default() += u64::from(entry.count);
    }
    merged
}
