//! Monetary settlement.
//!
//! Converts each room's total usage into money. Every raw share is the exact
//! rational `total_money * total_usage / total_electricity`, rounded once to
//! the currency's minor unit; the rounding residual is then folded back in
//! so the per-room amounts add up to the bill.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, RoomId};

use super::apportionment::round_half_even;
use super::usage_json;

/// The result of settling money per room, including the audit step.
#[derive(Debug, Clone)]
pub struct Settlement {
    /// Amount owed per room, in minor currency units.
    pub money: BTreeMap<RoomId, i64>,
    /// Minor units added (positive) or removed (negative) after rounding.
    pub residual: i64,
    /// Money attributable to the shared electricity (informational).
    pub shared_money: i64,
    /// Warnings raised while settling.
    pub warnings: Vec<AuditWarning>,
    /// The audit step recording this stage.
    pub audit_step: AuditStep,
}

/// Settles the bill across rooms in proportion to their total usage.
///
/// Each share is rounded half-to-even. The residual (`total_money` minus the
/// rounded sum) goes to the room with the largest `total_usage`, ties to the
/// lower room id. A negative residual that would take that room below zero
/// spills over to the next room in the same order.
///
/// # Arguments
///
/// * `total_money` - The bill, in minor currency units
/// * `total_electricity` - The electricity total the usage adds up to
/// * `total_usage` - Direct plus shared usage per room
/// * `shared_total` - Shared electricity, used for the informational `shared_money`
/// * `step_number` - The step number for audit trail sequencing
///
/// # Errors
///
/// - `ZeroElectricityTotal` if `total_electricity` is zero
/// - `InvalidBillingPeriod` if either total is out of range
/// - `EmptyRoomSet` if `total_usage` is empty
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use allocation_engine::calculation::settle;
///
/// let usage = BTreeMap::from([(1, 1), (2, 1), (3, 1)]);
/// let settlement = settle(1000, 3, &usage, 0, 3).unwrap();
///
/// // 333.33 each rounds to 333; the missing unit goes to room 1.
/// assert_eq!(settlement.money[&1], 334);
/// assert_eq!(settlement.money[&2], 333);
/// assert_eq!(settlement.money[&3], 333);
/// assert_eq!(settlement.residual, 1);
/// ```
pub fn settle(
    total_money: i64,
    total_electricity: i64,
    total_usage: &BTreeMap<RoomId, i64>,
    shared_total: i64,
    step_number: u32,
) -> EngineResult<Settlement> {
    if total_electricity == 0 {
        return Err(EngineError::ZeroElectricityTotal);
    }
    if total_electricity < 0 {
        return Err(EngineError::InvalidBillingPeriod {
            field: "totalElectricity".to_string(),
            message: format!("{} must be greater than zero", total_electricity),
        });
    }
    if total_money <= 0 {
        return Err(EngineError::InvalidBillingPeriod {
            field: "totalMoney".to_string(),
            message: format!("{} must be greater than zero", total_money),
        });
    }
    if total_usage.is_empty() {
        return Err(EngineError::EmptyRoomSet);
    }

    let denominator = i128::from(total_electricity);
    let mut rounded: BTreeMap<RoomId, i128> = BTreeMap::new();
    for (room_id, usage) in total_usage {
        let numerator = i128::from(total_money) * i128::from(*usage);
        rounded.insert(*room_id, round_half_even(numerator, denominator));
    }

    let rounded_sum: i128 = rounded.values().sum();
    let residual = i128::from(total_money) - rounded_sum;

    // Largest usage first, lower room id on ties.
    let mut order: Vec<RoomId> = total_usage.keys().copied().collect();
    order.sort_by_key(|id| (Reverse(total_usage[id]), *id));

    let mut warnings = Vec::new();
    let mut adjusted_rooms = Vec::new();
    if residual > 0 {
        if let Some(amount) = rounded.get_mut(&order[0]) {
            *amount += residual;
        }
        adjusted_rooms.push(order[0]);
    } else if residual < 0 {
        let mut outstanding = -residual;
        for room_id in &order {
            if outstanding == 0 {
                break;
            }
            if let Some(amount) = rounded.get_mut(room_id) {
                let taken = outstanding.min(*amount);
                if taken > 0 {
                    *amount -= taken;
                    outstanding -= taken;
                    adjusted_rooms.push(*room_id);
                }
            }
        }
        if outstanding != 0 {
            return Err(EngineError::CalculationError {
                message: format!("rounding residual of {} could not be reconciled", residual),
            });
        }
        if adjusted_rooms.len() > 1 {
            warnings.push(AuditWarning::new(
                "RESIDUAL_SPILLED",
                format!(
                    "Rounding residual of {} spread over rooms {:?} to keep every amount non-negative",
                    residual, adjusted_rooms
                ),
                "low",
            ));
        }
    }

    let money = rounded
        .into_iter()
        .map(|(room_id, amount)| {
            i64::try_from(amount)
                .map(|amount| (room_id, amount))
                .map_err(|_| EngineError::CalculationError {
                    message: format!("settled amount for room {} out of range", room_id),
                })
        })
        .collect::<EngineResult<BTreeMap<RoomId, i64>>>()?;

    let shared_money = i64::try_from(round_half_even(
        i128::from(total_money) * i128::from(shared_total.max(0)),
        denominator,
    ))
    .map_err(|_| EngineError::CalculationError {
        message: "shared money out of range".to_string(),
    })?;

    let residual = residual as i64;

    let audit_step = AuditStep {
        step_number,
        rule_id: "settlement".to_string(),
        rule_name: "Monetary Settlement".to_string(),
        input: serde_json::json!({
            "total_money": total_money,
            "total_electricity": total_electricity,
            "total_usage": usage_json(total_usage),
            "rounding": "half_even"
        }),
        output: serde_json::json!({
            "money": usage_json(&money),
            "residual": residual,
            "residual_rooms": adjusted_rooms,
            "shared_money": shared_money
        }),
        reasoning: if residual == 0 {
            format!(
                "{} split over {} units by usage; rounded shares already sum to the bill",
                total_money, total_electricity
            )
        } else {
            format!(
                "{} split over {} units by usage; rounding residual of {} applied to room {}",
                total_money, total_electricity, residual, order[0]
            )
        },
    };

    Ok(Settlement {
        money,
        residual,
        shared_money,
        warnings,
        audit_step,
    })
}

/// Computes the price of one unit of electricity for display.
///
/// The exact quotient is rounded half-to-even to `scale` decimal places.
///
/// # Example
///
/// ```
/// use allocation_engine::calculation::price_per_unit;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let price = price_per_unit(1000, 3, 4).unwrap();
/// assert_eq!(price, Decimal::from_str("333.3333").unwrap());
/// ```
pub fn price_per_unit(total_money: i64, total_electricity: i64, scale: u32) -> EngineResult<Decimal> {
    if total_electricity == 0 {
        return Err(EngineError::ZeroElectricityTotal);
    }

    Decimal::from(total_money)
        .checked_div(Decimal::from(total_electricity))
        .map(|price| price.round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven))
        .ok_or_else(|| EngineError::CalculationError {
            message: format!(
                "price per unit {} / {} could not be represented",
                total_money, total_electricity
            ),
        })
}
