//! The allocation pipeline.
//!
//! `Validate -> Resolve -> Apportion -> Settle`. Each stage is a pure
//! function of its inputs and the first failure aborts the whole run, so a
//! partial [`AllocationResult`] is never produced.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AllocationResult, AuditStep, AuditTrace, BillingPeriod, LaundryCount, MeterReading,
    RoomAllocation, RoomId, RoomRegistry,
};

use super::fingerprint::input_fingerprint;
use super::settlement::{price_per_unit, settle};
use super::shared_apportioner::apportion_shared_usage;
use super::usage_resolver::{MissingReadingPolicy, resolve_direct_usage};

/// Decimal places used for the reported price per unit unless configured.
pub const DEFAULT_PRICE_PER_UNIT_SCALE: u32 = 4;

/// Everything the engine needs to allocate one billing period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationInput {
    /// Invoice totals for the period.
    pub period: BillingPeriod,
    /// One meter reading per room.
    pub readings: Vec<MeterReading>,
    /// Laundry cycles per room, pre-counted for the period.
    pub laundry_counts: Vec<LaundryCount>,
}

/// Tunable behaviour of an allocation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationOptions {
    /// How registered rooms without a reading are handled.
    pub missing_reading_policy: MissingReadingPolicy,
    /// Decimal places of the reported price per unit.
    pub price_per_unit_scale: u32,
}

impl Default for AllocationOptions {
    fn default() -> Self {
        Self {
            missing_reading_policy: MissingReadingPolicy::default(),
            price_per_unit_scale: DEFAULT_PRICE_PER_UNIT_SCALE,
        }
    }
}

/// Allocates a period's electricity and money across rooms.
///
/// # Arguments
///
/// * `input` - Invoice totals, meter readings and laundry counts
/// * `registry` - Room registry used for labels and the missing-reading check
/// * `options` - Missing-reading policy and price display scale
///
/// # Errors
///
/// Any [`EngineError`] raised by validation or by one of the stages. No
/// partial result is returned.
///
/// # Example
///
/// ```
/// use allocation_engine::calculation::{allocate, AllocationInput, AllocationOptions};
/// use allocation_engine::models::{BillingPeriod, LaundryCount, MeterReading, RoomRegistry};
///
/// let input = AllocationInput {
///     period: BillingPeriod {
///         month: "2025-10".parse().unwrap(),
///         total_money: 350_000,
///         total_electricity: 100,
///     },
///     readings: vec![
///         MeterReading { room_id: 1, start_electric: 100, end_electric: 150 },
///         MeterReading { room_id: 2, start_electric: 200, end_electric: 230 },
///     ],
///     laundry_counts: vec![
///         LaundryCount { room_id: 1, count: 3 },
///         LaundryCount { room_id: 2, count: 1 },
///     ],
/// };
///
/// let result = allocate(&input, &RoomRegistry::empty(), &AllocationOptions::default()).unwrap();
///
/// assert_eq!(result.room(1).unwrap().total_usage, 65);
/// assert_eq!(result.room(2).unwrap().total_usage, 35);
/// assert_eq!(result.allocated_money(), 350_000);
/// ```
pub fn allocate(
    input: &AllocationInput,
    registry: &RoomRegistry,
    options: &AllocationOptions,
) -> EngineResult<AllocationResult> {
    allocate_fingerprinted(input, registry, options, input_fingerprint(input, registry, options))
}

/// Same as [`allocate`], with the input fingerprint already computed.
///
/// `fingerprint` is copied into the result as-is; callers that key a cache
/// on [`input_fingerprint`] pass that value to avoid hashing twice.
pub fn allocate_fingerprinted(
    input: &AllocationInput,
    registry: &RoomRegistry,
    options: &AllocationOptions,
    fingerprint: String,
) -> EngineResult<AllocationResult> {
    let period = &input.period;
    period.validate()?;

    debug!(
        month = %period.month,
        readings = input.readings.len(),
        laundry_counts = input.laundry_counts.len(),
        policy = options.missing_reading_policy.as_str(),
        "Starting allocation"
    );

    let resolution = resolve_direct_usage(
        &input.readings,
        registry,
        options.missing_reading_policy,
        1,
    )?;

    let apportionment = apportion_shared_usage(
        period.total_electricity,
        &resolution.direct_usage,
        &input.laundry_counts,
        2,
    )?;

    let total_usage: BTreeMap<RoomId, i64> = resolution
        .direct_usage
        .iter()
        .map(|(room_id, direct)| {
            let shared = apportionment.shared_usage.get(room_id).copied().unwrap_or(0);
            (*room_id, direct + shared)
        })
        .collect();

    let settlement = settle(
        period.total_money,
        period.total_electricity,
        &total_usage,
        apportionment.shared_total,
        3,
    )?;

    let rooms: Vec<RoomAllocation> = total_usage
        .iter()
        .map(|(room_id, total)| RoomAllocation {
            room_id: *room_id,
            room_name: registry.name_of(*room_id),
            laundry_cycles: apportionment.cycles.get(room_id).copied().unwrap_or(0),
            direct_usage: resolution.direct_usage[room_id],
            shared_usage: apportionment.shared_usage.get(room_id).copied().unwrap_or(0),
            total_usage: *total,
            total_money: settlement.money.get(room_id).copied().unwrap_or(0),
        })
        .collect();

    let conservation_step = check_conservation(period, &rooms, 4)?;

    let price = price_per_unit(
        period.total_money,
        period.total_electricity,
        options.price_per_unit_scale,
    )?;

    debug!(
        month = %period.month,
        rooms = rooms.len(),
        shared_electricity = apportionment.shared_total,
        residual = settlement.residual,
        "Allocation completed"
    );

    let mut warnings = resolution.warnings;
    warnings.extend(apportionment.warnings);
    warnings.extend(settlement.warnings);

    Ok(AllocationResult {
        month: period.month,
        price_per_unit: price,
        total_money: period.total_money,
        total_electricity: period.total_electricity,
        shared_electricity: apportionment.shared_total,
        shared_money: settlement.shared_money,
        split_basis: apportionment.split_basis,
        input_fingerprint: fingerprint,
        rooms,
        audit_trace: AuditTrace {
            steps: vec![
                resolution.audit_step,
                apportionment.audit_step,
                settlement.audit_step,
                conservation_step,
            ],
            warnings,
        },
    })
}

/// Verifies that the allocated electricity and money match the invoice.
fn check_conservation(
    period: &BillingPeriod,
    rooms: &[RoomAllocation],
    step_number: u32,
) -> EngineResult<AuditStep> {
    let electricity: i64 = rooms.iter().map(|r| r.total_usage).sum();
    let money: i64 = rooms.iter().map(|r| r.total_money).sum();

    if electricity != period.total_electricity || money != period.total_money {
        return Err(EngineError::CalculationError {
            message: format!(
                "allocation does not reconcile: {} of {} units, {} of {} money",
                electricity, period.total_electricity, money, period.total_money
            ),
        });
    }

    Ok(AuditStep {
        step_number,
        rule_id: "conservation_check".to_string(),
        rule_name: "Conservation Check".to_string(),
        input: serde_json::json!({
            "total_electricity": period.total_electricity,
            "total_money": period.total_money
        }),
        output: serde_json::json!({
            "allocated_electricity": electricity,
            "allocated_money": money
        }),
        reasoning: format!(
            "{} rooms account for all {} units and all {} of the bill",
            rooms.len(),
            electricity,
            money
        ),
    })
}
