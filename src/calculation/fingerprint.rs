//! Input fingerprints.
//!
//! A fingerprint identifies everything that influences an allocation, so a
//! cached result keyed by it can never outlive a corrected meter reading.

use sha2::{Digest, Sha256};

use crate::models::{MeterReading, RoomRegistry, merge_counts};

use super::engine::{AllocationInput, AllocationOptions};

/// Computes a SHA-256 fingerprint of an allocation's inputs.
///
/// The encoding is canonical: readings are sorted, repeated laundry counts
/// are merged and rooms are listed by id, so inputs that describe the same
/// period in a different order share a fingerprint.
///
/// # Example
///
/// ```
/// use allocation_engine::calculation::{input_fingerprint, AllocationInput, AllocationOptions};
/// use allocation_engine::models::{BillingPeriod, MeterReading, RoomRegistry};
///
/// let input = AllocationInput {
///     period: BillingPeriod {
///         month: "2025-10".parse().unwrap(),
///         total_money: 1_000_000,
///         total_electricity: 100,
///     },
///     readings: vec![MeterReading { room_id: 1, start_electric: 0, end_electric: 40 }],
///     laundry_counts: vec![],
/// };
///
/// let fingerprint = input_fingerprint(&input, &RoomRegistry::empty(), &AllocationOptions::default());
/// assert_eq!(fingerprint.len(), 64);
/// ```
pub fn input_fingerprint(
    input: &AllocationInput,
    registry: &RoomRegistry,
    options: &AllocationOptions,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(format!(
        "month={}\ntotal_money={}\ntotal_electricity={}\npolicy={}\nscale={}\n",
        input.period.month,
        input.period.total_money,
        input.period.total_electricity,
        options.missing_reading_policy.as_str(),
        options.price_per_unit_scale
    ));

    let mut readings: Vec<MeterReading> = input.readings.clone();
    readings.sort_by_key(|r| (r.room_id, r.start_electric, r.end_electric));
    for r in &readings {
        hasher.update(format!(
            "reading={}:{}:{}\n",
            r.room_id, r.start_electric, r.end_electric
        ));
    }

    for (room_id, count) in merge_counts(&input.laundry_counts) {
        hasher.update(format!("laundry={}:{}\n", room_id, count));
    }

    for room in registry.rooms() {
        hasher.update(format!("room={}:{:?}\n", room.id, room.name));
    }

    format!("{:x}", hasher.finalize())
}
