//! Application state for the allocation engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;

use super::cache::ResultCache;

/// Shared application state.
///
/// Contains the loaded configuration and the result cache shared by all
/// request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The loaded engine configuration.
    config: Arc<ConfigLoader>,
    /// Results of previous allocations.
    cache: Arc<ResultCache>,
}

impl AppState {
    /// Creates a new application state with the given configuration loader.
    ///
    /// The cache is sized from the loader's cache settings.
    pub fn new(config: ConfigLoader) -> Self {
        let capacity = config.cache().capacity;
        Self::with_cache_capacity(config, capacity)
    }

    /// Creates a new application state with an explicit cache capacity.
    pub fn with_cache_capacity(config: ConfigLoader, capacity: usize) -> Self {
        Self {
            config: Arc::new(config),
            cache: Arc::new(ResultCache::new(capacity)),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the result cache.
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }
}
