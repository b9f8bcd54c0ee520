//! Configuration loading and management for the allocation engine.
//!
//! This module provides functionality to load the engine configuration from
//! YAML files, including settlement settings, server settings and the room
//! registry.
//!
//! # Example
//!
//! ```no_run
//! use allocation_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Loaded property: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CacheSettings, EngineConfig, EngineMetadata, RoomsConfig, ServerSettings, SettlementSettings,
};
