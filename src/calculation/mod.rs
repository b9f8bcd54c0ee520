//! Calculation logic for the allocation engine.
//!
//! This module contains the pipeline stages for allocating a billing period:
//! direct usage resolution from meter readings, apportionment of the shared
//! laundry electricity by wash cycles, monetary settlement with a
//! reconciled rounding residual, and the input fingerprint used for caching.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::RoomId;

mod apportionment;
mod engine;
mod fingerprint;
mod settlement;
mod shared_apportioner;
mod usage_resolver;

pub use apportionment::{largest_remainder, round_half_even};
pub use engine::{
    AllocationInput, AllocationOptions, DEFAULT_PRICE_PER_UNIT_SCALE, allocate,
    allocate_fingerprinted,
};
pub use fingerprint::input_fingerprint;
pub use settlement::{Settlement, price_per_unit, settle};
pub use shared_apportioner::{SharedApportionment, apportion_shared_usage};
pub use usage_resolver::{MissingReadingPolicy, UsageResolution, resolve_direct_usage};

/// Renders a per-room map as a JSON object keyed by room id.
pub(crate) fn usage_json<T: Serialize>(map: &BTreeMap<RoomId, T>) -> serde_json::Value {
    map.iter()
        .map(|(id, value)| (id.to_string(), serde_json::json!(value)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}
