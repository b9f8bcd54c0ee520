//! Electricity cost allocation engine for shared housing.
//!
//! This crate splits a monthly electricity invoice across rooms: each room
//! pays for its own metered usage plus a share of the unmetered communal
//! laundry usage, weighted by the wash cycles it ran. All quantities are
//! integers, shares are apportioned exactly, and every run carries an audit
//! trace explaining how the amounts were reached.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
