//! Bounded LRU memo of verdicts keyed by lower-cased text.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;

use crate::domain::Verdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Front of the map is the least recently used entry.
#[derive(Debug)]
pub struct VerdictCache {
    entries: Mutex<IndexMap<String, Verdict>>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl VerdictCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(IndexMap::with_capacity(capacity.min(1024))),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn key(content: &str) -> String {
        content.to_lowercase()
    }

    pub fn get(&self, content: &str) -> Option<Verdict> {
        let key = Self::key(content);
        let mut entries = self.entries.lock();
        match entries.shift_remove(&key) {
            Some(verdict) => {
                entries.insert(key, verdict);
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(verdict)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Unconditional overwrite; evicts from the front when full.
    pub fn put(&self, content: &str, verdict: Verdict) {
        let key = Self::key(content);
        let mut entries = self.entries.lock();
        entries.shift_remove(&key);
        while entries.len() >= self.capacity {
            entries.shift_remove_index(0);
        }
        entries.insert(key, verdict);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
