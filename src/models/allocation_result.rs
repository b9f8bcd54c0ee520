//! Allocation result models.
//!
//! This module contains the [`AllocationResult`] type and its associated
//! structures capturing every output of one engine run: per-room usage and
//! money, period totals, and the audit trace explaining each stage.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BillingMonth, RoomId};

/// How the shared electricity was divided between rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitBasis {
    /// Weighted by laundry cycles run in the month.
    LaundryCycles,
    /// Split equally because no cycles were recorded.
    EqualSplit,
}

/// One room's share of the period's electricity and money.
///
/// # Example
///
/// ```
/// use allocation_engine::models::RoomAllocation;
///
/// let room = RoomAllocation {
///     room_id: 1,
///     room_name: "Room 101".to_string(),
///     laundry_cycles: 3,
///     direct_usage: 50,
///     shared_usage: 15,
///     total_usage: 65,
///     total_money: 650_000,
/// };
/// assert_eq!(room.direct_usage + room.shared_usage, room.total_usage);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAllocation {
    /// The room this line belongs to.
    pub room_id: RoomId,
    /// Display name from the room registry.
    pub room_name: String,
    /// Laundry cycles counted for the room in the month.
    pub laundry_cycles: u64,
    /// Electricity measured by the room's own meter.
    pub direct_usage: i64,
    /// The room's portion of the unmetered shared electricity.
    pub shared_usage: i64,
    /// Direct plus shared usage.
    pub total_usage: i64,
    /// Amount owed, in minor currency units.
    pub total_money: i64,
}

/// A single step in the audit trace recording one pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// Machine identifier of the rule applied.
    pub rule_id: String,
    /// Human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during allocation.
///
/// Warnings flag input that was accepted but deserves a second look, such
/// as an excluded room or laundry cycles for a room without a reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level ("low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(code: &str, message: impl Into<String>, severity: &str) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity: severity.to_string(),
        }
    }
}

/// The complete audit trace for an allocation.
///
/// Contains no timestamps or durations so identical inputs always produce
/// identical traces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTrace {
    /// The sequence of pipeline steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during allocation.
    pub warnings: Vec<AuditWarning>,
}

/// The complete, immutable result of one allocation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    /// The billing month allocated.
    pub month: BillingMonth,
    /// Invoice money divided by invoice electricity, for display.
    pub price_per_unit: Decimal,
    /// Invoice money total, in minor currency units.
    pub total_money: i64,
    /// Invoice electricity total.
    pub total_electricity: i64,
    /// Electricity not measured by any room meter.
    pub shared_electricity: i64,
    /// Money attributable to the shared electricity (informational).
    pub shared_money: i64,
    /// How shared electricity was divided.
    pub split_basis: SplitBasis,
    /// SHA-256 fingerprint of the inputs, usable as a cache key.
    pub input_fingerprint: String,
    /// Per-room lines ordered by room id.
    pub rooms: Vec<RoomAllocation>,
    /// Stage-by-stage explanation of the result.
    pub audit_trace: AuditTrace,
}

impl AllocationResult {
    /// Looks up the line for a room.
    pub fn room(&self, room_id: RoomId) -> Option<&RoomAllocation> {
        self.rooms.iter().find(|r| r.room_id == room_id)
    }

    /// Sums `total_usage` over all rooms.
    pub fn allocated_electricity(&self) -> i64 {
        self.rooms.iter().map(|r| r.total_usage).sum()
    }

    /// Sums `total_money` over all rooms.
    pub fn allocated_money(&self) -> i64 {
        self.rooms.iter().map(|r| r.total_money).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample_result() -> AllocationResult {
        AllocationResult {
            month: "2025-10".parse().unwrap(),
            price_per_unit: Decimal::from_str("3500").unwrap(),
            total_money: 350_000,
            total_electricity: 100,
            shared_electricity: 20,
            shared_money: 70_000,
            split_basis: SplitBasis::LaundryCycles,
            input_fingerprint: "abc123".to_string(),
            rooms: vec![
                RoomAllocation {
                    room_id: 1,
                    room_name: "A".to_string(),
                    laundry_cycles: 3,
                    direct_usage: 50,
                    shared_usage: 15,
                    total_usage: 65,
                    total_money: 227_500,
                },
                RoomAllocation {
                    room_id: 2,
                    room_name: "B".to_string(),
                    laundry_cycles: 1,
                    direct_usage: 30,
                    shared_usage: 5,
                    total_usage: 35,
                    total_money: 122_500,
                },
            ],
            audit_trace: AuditTrace::default(),
        }
    }

    #[test]
    fn test_totals_helpers() {
        let result = sample_result();
        assert_eq!(result.allocated_electricity(), 100);
        assert_eq!(result.allocated_money(), 350_000);
        assert_eq!(result.room(2).map(|r| r.total_usage), Some(35));
        assert!(result.room(3).is_none());
    }

    #[test]
    fn test_serializes_camel_case_fields() {
        let json = serde_json::to_value(sample_result()).unwrap();

        assert_eq!(json["month"], "2025-10");
        assert_eq!(json["pricePerUnit"], "3500");
        assert_eq!(json["sharedElectricity"], 20);
        assert_eq!(json["splitBasis"], "laundry_cycles");
        assert_eq!(json["rooms"][0]["roomName"], "A");
        assert_eq!(json["rooms"][0]["sharedUsage"], 15);
        assert_eq!(json["rooms"][1]["totalMoney"], 122_500);
    }

    #[test]
    fn test_round_trips_through_json() {
        let result = sample_result();
        let json = serde_json::to_string(&result).unwrap();
        let parsed: AllocationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[test]
    fn test_warning_constructor() {
        let warning = AuditWarning::new("ROOM_EXCLUDED", "room 4 has no reading", "medium");
        assert_eq!(warning.code, "ROOM_EXCLUDED");
        assert_eq!(warning.severity, "medium");
    }
}
