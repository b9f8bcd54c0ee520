//! Exact integer apportionment primitives.
//!
//! Everything here works on integers widened to `i128`, so proportional
//! splits and rounding never accumulate floating-point error.

use std::cmp::Reverse;

use crate::error::{EngineError, EngineResult};
use crate::models::RoomId;

/// Splits `total` units across rooms in proportion to their weights.
///
/// Uses the largest-remainder method: every room first receives the floor
/// of its exact quota, then the units left over go one each to the rooms
/// with the largest fractional remainders. Ties go to the lower room id.
/// The returned amounts always sum to `total` and keep the input order.
///
/// # Errors
///
/// - `EmptyRoomSet` if `weights` is empty
/// - `CalculationError` if `total` is negative, the weights sum to zero, or
///   an intermediate product overflows
///
/// # Example
///
/// ```
/// use allocation_engine::calculation::largest_remainder;
///
/// // 10 units split 1:1:1 -> quotas 3.33 each, one leftover unit to room 1.
/// let split = largest_remainder(10, &[(1, 1), (2, 1), (3, 1)]).unwrap();
/// assert_eq!(split, vec![(1, 4), (2, 3), (3, 3)]);
/// ```
pub fn largest_remainder(total: i64, weights: &[(RoomId, u64)]) -> EngineResult<Vec<(RoomId, i64)>> {
    if weights.is_empty() {
        return Err(EngineError::EmptyRoomSet);
    }
    if total < 0 {
        return Err(EngineError::CalculationError {
            message: format!("cannot apportion a negative total of {}", total),
        });
    }

    let weight_sum: i128 = weights.iter().map(|(_, w)| i128::from(*w)).sum();
    if weight_sum == 0 {
        return Err(EngineError::CalculationError {
            message: "cannot apportion with all weights zero".to_string(),
        });
    }

    let mut quotas = Vec::with_capacity(weights.len());
    for (index, (room_id, weight)) in weights.iter().enumerate() {
        let product = i128::from(total)
            .checked_mul(i128::from(*weight))
            .ok_or_else(|| EngineError::CalculationError {
                message: format!("apportionment overflow for room {}", room_id),
            })?;
        quotas.push((index, *room_id, product / weight_sum, product % weight_sum));
    }

    let floors: i128 = quotas.iter().map(|(_, _, floor, _)| floor).sum();
    let leftover = i128::from(total) - floors;

    let mut order: Vec<usize> = (0..quotas.len()).collect();
    order.sort_by_key(|&i| (Reverse(quotas[i].3), quotas[i].1));

    let mut amounts: Vec<i128> = quotas.iter().map(|(_, _, floor, _)| *floor).collect();
    for &i in order.iter().take(leftover as usize) {
        amounts[i] += 1;
    }

    quotas
        .iter()
        .map(|(index, room_id, _, _)| {
            i64::try_from(amounts[*index])
                .map(|amount| (*room_id, amount))
                .map_err(|_| EngineError::CalculationError {
                    message: format!("apportioned amount for room {} out of range", room_id),
                })
        })
        .collect()
}

/// Divides with round-half-to-even, for a non-negative numerator and a
/// positive denominator.
///
/// # Example
///
/// ```
/// use allocation_engine::calculation::round_half_even;
///
/// assert_eq!(round_half_even(5, 2), 2);  // 2.5 -> 2
/// assert_eq!(round_half_even(7, 2), 4);  // 3.5 -> 4
/// assert_eq!(round_half_even(10, 3), 3); // 3.33 -> 3
/// assert_eq!(round_half_even(20, 3), 7); // 6.67 -> 7
/// ```
pub fn round_half_even(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let twice_remainder = 2 * (numerator % denominator);

    if twice_remainder > denominator || (twice_remainder == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}
