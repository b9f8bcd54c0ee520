//! Billing month and billing period models.
//!
//! This module contains the [`BillingMonth`] key used to select laundry
//! records and label results, and the [`BillingPeriod`] carrying the invoice
//! totals an allocation must reconcile to.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A calendar month identifying one utility invoice cycle.
///
/// Parses both `YYYY-MM` and `MM-YYYY`; always renders as `YYYY-MM`.
///
/// # Example
///
/// ```
/// use allocation_engine::models::BillingMonth;
///
/// let a: BillingMonth = "2025-10".parse().unwrap();
/// let b: BillingMonth = "10-2025".parse().unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "2025-10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BillingMonth {
    year: i32,
    month: u32,
}

impl BillingMonth {
    /// Creates a billing month, validating the month number.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Self { year, month })
            .ok_or_else(|| EngineError::InvalidBillingPeriod {
                field: "month".to_string(),
                message: format!("{}-{} is not a valid calendar month", year, month),
            })
    }

    /// Returns the calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the month number (1-12).
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Checks whether a timestamp falls within this month.
    ///
    /// # Example
    ///
    /// ```
    /// use allocation_engine::models::BillingMonth;
    /// use chrono::NaiveDateTime;
    ///
    /// let month: BillingMonth = "2025-10".parse().unwrap();
    /// let inside = NaiveDateTime::parse_from_str("2025-10-31 23:59:59", "%Y-%m-%d %H:%M:%S").unwrap();
    /// let outside = NaiveDateTime::parse_from_str("2025-11-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    ///
    /// assert!(month.contains(inside));
    /// assert!(!month.contains(outside));
    /// ```
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        timestamp.year() == self.year && timestamp.month() == self.month
    }
}

impl FromStr for BillingMonth {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidBillingPeriod {
            field: "month".to_string(),
            message: format!("'{}' is not in YYYY-MM or MM-YYYY format", s),
        };

        let (first, second) = s.trim().split_once('-').ok_or_else(invalid)?;
        let (year, month) = match (first.len(), second.len()) {
            (4, 1..=2) => (first, second),
            (1..=2, 4) => (second, first),
            _ => return Err(invalid()),
        };

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for BillingMonth {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BillingMonth> for String {
    fn from(month: BillingMonth) -> Self {
        month.to_string()
    }
}

impl fmt::Display for BillingMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// The invoice totals for one billing month.
///
/// `total_money` is in minor currency units and `total_electricity` in meter
/// units. Both are the ground truth the allocation reconciles to exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingPeriod {
    /// The month the invoice covers.
    pub month: BillingMonth,
    /// Total amount billed, in minor currency units.
    pub total_money: i64,
    /// Total electricity supplied for the whole house.
    pub total_electricity: i64,
}

impl BillingPeriod {
    /// Validates the invoice totals.
    ///
    /// # Errors
    ///
    /// - `ZeroElectricityTotal` if the electricity total is zero
    /// - `InvalidBillingPeriod` if either total is negative or the money
    ///   total is zero
    pub fn validate(&self) -> EngineResult<()> {
        if self.total_electricity == 0 {
            return Err(EngineError::ZeroElectricityTotal);
        }
        if self.total_electricity < 0 {
            return Err(EngineError::InvalidBillingPeriod {
                field: "totalElectricity".to_string(),
                message: format!("{} must be greater than zero", self.total_electricity),
            });
        }
        if self.total_money <= 0 {
            return Err(EngineError::InvalidBillingPeriod {
                field: "totalMoney".to_string(),
                message: format!("{} must be greater than zero", self.total_money),
            });
        }
        Ok(())
    }
}
