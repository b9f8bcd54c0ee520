//! Direct usage resolution.
//!
//! This module turns a period's meter readings into each room's directly
//! metered consumption and applies the missing-reading policy to registered
//! rooms that have no reading.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, MeterReading, RoomId, RoomRegistry};

use super::usage_json;

/// What to do with a registered room that has no reading for the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReadingPolicy {
    /// Abort the allocation with `MissingReading`.
    #[default]
    Reject,
    /// Leave the room out of direct usage and shared-cost apportionment.
    Exclude,
    /// Include the room with zero direct usage.
    TreatAsZero,
}

impl MissingReadingPolicy {
    /// Returns the configuration name of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingReadingPolicy::Reject => "reject",
            MissingReadingPolicy::Exclude => "exclude",
            MissingReadingPolicy::TreatAsZero => "treat_as_zero",
        }
    }
}

/// The result of resolving direct usage, including the audit step.
#[derive(Debug, Clone)]
pub struct UsageResolution {
    /// Direct usage per participating room.
    pub direct_usage: BTreeMap<RoomId, i64>,
    /// Sum of direct usage over participating rooms.
    pub direct_total: i64,
    /// Registered rooms left out under the `Exclude` policy.
    pub excluded_rooms: Vec<RoomId>,
    /// Warnings raised while resolving.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording this stage.
    pub audit_step: AuditStep,
}

/// Computes `end - start` for every reading and reconciles against the registry.
///
/// # Arguments
///
/// * `readings` - One reading per room for the period
/// * `registry` - Registered rooms; an empty registry skips the missing-reading check
/// * `policy` - How registered rooms without a reading are handled
/// * `step_number` - The step number for audit trail sequencing
///
/// # Errors
///
/// - `InvalidReading` for a negative or non-increasing reading
/// - `DuplicateReading` if a room has more than one reading
/// - `MissingReading` for a registered room without a reading under `Reject`
/// - `EmptyRoomSet` if no room takes part
///
/// # Example
///
/// ```
/// use allocation_engine::calculation::{resolve_direct_usage, MissingReadingPolicy};
/// use allocation_engine::models::{MeterReading, RoomRegistry};
///
/// let readings = vec![
///     MeterReading { room_id: 1, start_electric: 100, end_electric: 150 },
///     MeterReading { room_id: 2, start_electric: 200, end_electric: 230 },
/// ];
///
/// let result = resolve_direct_usage(
///     &readings,
///     &RoomRegistry::empty(),
///     MissingReadingPolicy::Reject,
///     1,
/// )
/// .unwrap();
///
/// assert_eq!(result.direct_usage[&1], 50);
/// assert_eq!(result.direct_usage[&2], 30);
/// assert_eq!(result.direct_total, 80);
/// ```
pub fn resolve_direct_usage(
    readings: &[MeterReading],
    registry: &RoomRegistry,
    policy: MissingReadingPolicy,
    step_number: u32,
) -> EngineResult<UsageResolution> {
    let mut direct_usage: BTreeMap<RoomId, i64> = BTreeMap::new();
    let mut warnings = Vec::new();

    for reading in readings {
        reading.validate()?;
        if direct_usage.insert(reading.room_id, reading.usage()).is_some() {
            return Err(EngineError::DuplicateReading {
                room_id: reading.room_id,
            });
        }
    }

    if !registry.is_empty() {
        for room_id in direct_usage.keys().filter(|id| !registry.contains(**id)) {
            warnings.push(AuditWarning::new(
                "UNREGISTERED_ROOM",
                format!("Reading for room {} which is not in the room registry", room_id),
                "low",
            ));
        }
    }

    let mut excluded_rooms = Vec::new();
    let missing: Vec<RoomId> = registry
        .ids()
        .filter(|id| !direct_usage.contains_key(id))
        .collect();

    for room_id in missing {
        match policy {
            MissingReadingPolicy::Reject => {
                return Err(EngineError::MissingReading { room_id });
            }
            MissingReadingPolicy::Exclude => {
                excluded_rooms.push(room_id);
                warnings.push(AuditWarning::new(
                    "ROOM_EXCLUDED",
                    format!(
                        "Room {} has no reading and is excluded from this period",
                        room_id
                    ),
                    "medium",
                ));
            }
            MissingReadingPolicy::TreatAsZero => {
                direct_usage.insert(room_id, 0);
                warnings.push(AuditWarning::new(
                    "READING_ASSUMED_ZERO",
                    format!("Room {} has no reading; direct usage assumed to be 0", room_id),
                    "medium",
                ));
            }
        }
    }

    if direct_usage.is_empty() {
        return Err(EngineError::EmptyRoomSet);
    }

    // Usage is non-negative, so a saturated total still exceeds any bill.
    let direct_total = direct_usage
        .values()
        .fold(0i64, |acc, usage| acc.saturating_add(*usage));

    let audit_step = AuditStep {
        step_number,
        rule_id: "direct_usage".to_string(),
        rule_name: "Direct Usage Resolution".to_string(),
        input: serde_json::json!({
            "readings": readings.len(),
            "registered_rooms": registry.len(),
            "missing_reading_policy": policy.as_str()
        }),
        output: serde_json::json!({
            "direct_usage": usage_json(&direct_usage),
            "direct_total": direct_total,
            "excluded_rooms": excluded_rooms
        }),
        reasoning: format!(
            "{} rooms metered for {} units in total{}",
            direct_usage.len(),
            direct_total,
            if excluded_rooms.is_empty() {
                String::new()
            } else {
                format!(", {} excluded without a reading", excluded_rooms.len())
            }
        ),
    };

    Ok(UsageResolution {
        direct_usage,
        direct_total,
        excluded_rooms,
        warnings,
        audit_step,
    })
}
