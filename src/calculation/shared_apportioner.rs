//! Shared-cost apportionment.
//!
//! Electricity the house was billed for but no room meter recorded is
//! attributed to the communal laundry machines and divided between rooms
//! by the number of wash cycles each ran in the period.

use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, LaundryCount, RoomId, SplitBasis, merge_counts};

use super::apportionment::largest_remainder;
use super::usage_json;

/// The result of apportioning shared usage, including the audit step.
#[derive(Debug, Clone)]
pub struct SharedApportionment {
    /// Electricity not recorded by any participating room meter.
    pub shared_total: i64,
    /// Each participating room's portion of `shared_total`.
    pub shared_usage: BTreeMap<RoomId, i64>,
    /// Laundry cycles per participating room.
    pub cycles: BTreeMap<RoomId, u64>,
    /// Sum of cycles over participating rooms.
    pub cycles_total: u64,
    /// Whether the split followed cycles or was equal.
    pub split_basis: SplitBasis,
    /// Warnings raised while apportioning.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording this stage.
    pub audit_step: AuditStep,
}

/// Distributes the unmetered electricity across participating rooms.
///
/// `shared_total = total_electricity - sum(direct_usage)`. When any cycles
/// were recorded each room receives `shared_total * cycles / cycles_total`;
/// otherwise the total is split equally. Both cases use largest-remainder
/// apportionment so the shares sum to `shared_total` exactly.
///
/// Counts for rooms absent from `direct_usage` are ignored with a warning.
///
/// # Errors
///
/// - `OverconsumedMeter` if direct usage exceeds `total_electricity`
/// - `EmptyRoomSet` if `direct_usage` is empty
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use allocation_engine::calculation::apportion_shared_usage;
/// use allocation_engine::models::{LaundryCount, SplitBasis};
///
/// let direct = BTreeMap::from([(1, 50), (2, 30)]);
/// let counts = vec![
///     LaundryCount { room_id: 1, count: 3 },
///     LaundryCount { room_id: 2, count: 1 },
/// ];
///
/// let result = apportion_shared_usage(100, &direct, &counts, 2).unwrap();
///
/// assert_eq!(result.shared_total, 20);
/// assert_eq!(result.shared_usage[&1], 15);
/// assert_eq!(result.shared_usage[&2], 5);
/// assert_eq!(result.split_basis, SplitBasis::LaundryCycles);
/// ```
pub fn apportion_shared_usage(
    total_electricity: i64,
    direct_usage: &BTreeMap<RoomId, i64>,
    laundry_counts: &[LaundryCount],
    step_number: u32,
) -> EngineResult<SharedApportionment> {
    if direct_usage.is_empty() {
        return Err(EngineError::EmptyRoomSet);
    }

    let direct_sum: i128 = direct_usage.values().map(|usage| i128::from(*usage)).sum();
    let direct_total = i64::try_from(direct_sum).unwrap_or(i64::MAX);

    if direct_sum > i128::from(total_electricity) {
        return Err(EngineError::OverconsumedMeter {
            direct_total,
            total_electricity,
        });
    }
    let shared_total = total_electricity - direct_total;

    let merged = merge_counts(laundry_counts);
    let mut warnings = Vec::new();
    for (room_id, count) in merged.iter().filter(|(id, _)| !direct_usage.contains_key(*id)) {
        if *count > 0 {
            warnings.push(AuditWarning::new(
                "LAUNDRY_WITHOUT_READING",
                format!(
                    "{} laundry cycles for room {} ignored: the room has no reading this period",
                    count, room_id
                ),
                "medium",
            ));
        }
    }

    let cycles: BTreeMap<RoomId, u64> = direct_usage
        .keys()
        .map(|id| (*id, merged.get(id).copied().unwrap_or(0)))
        .collect();
    let cycles_total: u64 = cycles.values().sum();

    let (split_basis, weights): (SplitBasis, Vec<(RoomId, u64)>) = if cycles_total > 0 {
        (
            SplitBasis::LaundryCycles,
            cycles.iter().map(|(id, c)| (*id, *c)).collect(),
        )
    } else {
        (
            SplitBasis::EqualSplit,
            cycles.keys().map(|id| (*id, 1)).collect(),
        )
    };

    let shared_usage: BTreeMap<RoomId, i64> =
        largest_remainder(shared_total, &weights)?.into_iter().collect();

    let reasoning = match split_basis {
        SplitBasis::LaundryCycles => format!(
            "{} total - {} metered = {} shared units, split over {} laundry cycles",
            total_electricity, direct_total, shared_total, cycles_total
        ),
        SplitBasis::EqualSplit => format!(
            "{} total - {} metered = {} shared units, split equally over {} rooms (no laundry cycles recorded)",
            total_electricity,
            direct_total,
            shared_total,
            direct_usage.len()
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "shared_apportionment".to_string(),
        rule_name: "Shared Usage Apportionment".to_string(),
        input: serde_json::json!({
            "total_electricity": total_electricity,
            "direct_total": direct_total,
            "cycles": usage_json(&cycles)
        }),
        output: serde_json::json!({
            "shared_total": shared_total,
            "cycles_total": cycles_total,
            "split_basis": split_basis,
            "shared_usage": usage_json(&shared_usage)
        }),
        reasoning,
    };

    Ok(SharedApportionment {
        shared_total,
        shared_usage,
        cycles,
        cycles_total,
        split_basis,
        warnings,
        audit_step,
    })
}
