//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! settings and the room registry from YAML files.

use std::fs;
use std::path::Path;

use crate::calculation::AllocationOptions;
use crate::error::{EngineError, EngineResult};
use crate::models::RoomRegistry;

use super::types::{
    CacheSettings, EngineConfig, EngineMetadata, RoomsConfig, ServerSettings, SettlementSettings,
};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml   # Metadata, settlement, server and cache settings
/// └── rooms.yaml    # The room registry
/// ```
///
/// # Example
///
/// ```no_run
/// use allocation_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
///
/// println!("Property: {}", loader.metadata().name);
/// for room in loader.registry().rooms() {
///     println!("{} -> {}", room.id, room.name);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
    registry: RoomRegistry,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/default")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Either file is missing (`ConfigNotFound`)
    /// - Either file contains invalid YAML (`ConfigParseError`)
    /// - The registry lists a room id twice (`DuplicateRoom`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let config = Self::load_yaml::<EngineConfig>(&path.join("engine.yaml"))?;
        let rooms = Self::load_yaml::<RoomsConfig>(&path.join("rooms.yaml"))?;
        let registry = RoomRegistry::new(rooms.rooms)?;

        Ok(Self { config, registry })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the deployment metadata.
    pub fn metadata(&self) -> &EngineMetadata {
        &self.config.engine
    }

    /// Returns the settlement settings.
    pub fn settlement(&self) -> &SettlementSettings {
        &self.config.settlement
    }

    /// Returns the server settings.
    pub fn server(&self) -> &ServerSettings {
        &self.config.server
    }

    /// Returns the cache settings.
    pub fn cache(&self) -> &CacheSettings {
        &self.config.cache
    }

    /// Returns the configured room registry.
    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Returns the allocation options derived from the settlement settings.
    pub fn options(&self) -> AllocationOptions {
        AllocationOptions {
            missing_reading_policy: self.config.settlement.missing_reading_policy,
            price_per_unit_scale: self.config.settlement.price_per_unit_scale,
        }
    }
}
