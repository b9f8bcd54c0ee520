//! Core data models for the allocation engine.
//!
//! This module contains all the domain models used throughout the engine.

mod allocation_result;
mod billing_period;
mod laundry;
mod meter_reading;
mod room;

pub use allocation_result::{
    AllocationResult, AuditStep, AuditTrace, AuditWarning, RoomAllocation, SplitBasis,
};
pub use billing_period::{BillingMonth, BillingPeriod};
pub use laundry::{LaundryCount, LaundryRecord, count_cycles, merge_counts};
pub use meter_reading::MeterReading;
pub use room::{Room, RoomId, RoomRegistry};
