//! Content-addressed descriptor cache.
//!
//! Keys combine the SHA-256 of the image content with every extraction
//! parameter, so a hit always returns exactly what a fresh extraction would.

use crate::config::{ExtractorConfig, ResampleFilter};
use crate::descriptor::Descriptor;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    content_hash: [u8; 32],
    grid_size: u32,
    canonical_size: u32,
    max_colors: usize,
    filter: ResampleFilter,
}

impl CacheKey {
    /// Key for content extracted with `config`
    #[must_use]
    pub const fn new(content_hash: [u8; 32], config: &ExtractorConfig) -> Self {
        Self {
            content_hash,
            grid_size: config.grid_size,
            canonical_size: config.canonical_size,
            max_colors: config.max_colors_per_cell,
            filter: config.filter,
        }
    }
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache
    pub hits: u64,
    /// Lookups that missed
    pub misses: u64,
    /// Descriptors currently stored
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups that hit (0.0 when there were none)
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct Entries {
    map: HashMap<CacheKey, Arc<Descriptor>>,
    order: VecDeque<CacheKey>,
}

/// Bounded descriptor cache with first-in first-out eviction
#[derive(Debug)]
pub struct DescriptorCache {
    capacity: usize,
    entries: RwLock<Entries>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DescriptorCache {
    /// Create a cache holding at most `capacity` descriptors
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(Entries::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Maximum stored descriptors
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Look up a descriptor
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Descriptor>> {
        let found = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .map
            .get(key)
            .cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store a descriptor, evicting the oldest entry when full
    pub fn insert(&self, key: CacheKey, descriptor: Arc<Descriptor>) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.map.insert(key, descriptor).is_some() {
            return;
        }
        entries.order.push_back(key);
        while entries.map.len() > self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.map.remove(&oldest);
        }
    }

    /// Number of stored descriptors
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .map
            .len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and reset counters
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.map.clear();
        entries.order.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Current counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
