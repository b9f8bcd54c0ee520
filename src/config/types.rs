//! Configuration types for the allocation engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use serde::Deserialize;

use crate::calculation::{DEFAULT_PRICE_PER_UNIT_SCALE, MissingReadingPolicy};
use crate::models::Room;

/// Metadata about the deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineMetadata {
    /// Short identifier of the house or property (e.g., "house-01").
    pub code: String,
    /// The human-readable name of the property.
    pub name: String,
    /// Currency of `totalMoney`, expressed in minor units.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "VND".to_string()
}

/// Settlement behaviour.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SettlementSettings {
    /// How registered rooms without a reading are handled.
    #[serde(default)]
    pub missing_reading_policy: MissingReadingPolicy,
    /// Decimal places of the reported price per unit.
    #[serde(default = "default_scale")]
    pub price_per_unit_scale: u32,
}

fn default_scale() -> u32 {
    DEFAULT_PRICE_PER_UNIT_SCALE
}

impl Default for SettlementSettings {
    fn default() -> Self {
        Self {
            missing_reading_policy: MissingReadingPolicy::default(),
            price_per_unit_scale: DEFAULT_PRICE_PER_UNIT_SCALE,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Log filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

/// Result cache settings.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheSettings {
    /// Maximum number of cached allocation results; 0 disables caching.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    64
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

/// Engine configuration file structure (`engine.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Deployment metadata.
    pub engine: EngineMetadata,
    /// Settlement behaviour.
    #[serde(default)]
    pub settlement: SettlementSettings,
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSettings,
    /// Result cache settings.
    #[serde(default)]
    pub cache: CacheSettings,
}

/// Room registry file structure (`rooms.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct RoomsConfig {
    /// The registered rooms.
    #[serde(default)]
    pub rooms: Vec<Room>,
}
