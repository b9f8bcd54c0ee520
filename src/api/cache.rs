//! Bounded result cache.
//!
//! Allocation results are keyed by `month:fingerprint`. The fingerprint
//! covers every input, so a corrected reading yields a new key instead of
//! a stale hit. Eviction is first-in first-out.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{AllocationResult, BillingMonth};

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, Arc<AllocationResult>>,
    order: VecDeque<String>,
}

/// A FIFO cache of allocation results shared between handlers.
#[derive(Debug)]
pub struct ResultCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

impl ResultCache {
    /// Creates a cache holding at most `capacity` results. Zero disables it.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    /// Builds the cache key for a month and input fingerprint.
    pub fn key(month: BillingMonth, fingerprint: &str) -> String {
        format!("{}:{}", month, fingerprint)
    }

    /// Returns the cached result for `key`, if any.
    pub fn get(&self, key: &str) -> Option<Arc<AllocationResult>> {
        self.lock().entries.get(key).cloned()
    }

    /// Stores a result, evicting the oldest entries beyond capacity.
    pub fn insert(&self, key: String, result: Arc<AllocationResult>) {
        if self.capacity == 0 {
            return;
        }

        let mut inner = self.lock();
        if inner.entries.insert(key.clone(), result).is_none() {
            inner.order.push_back(key);
        }
        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }
    }

    /// Returns the number of cached results.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Every critical section leaves both maps consistent; poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
