//! In-memory store. Used in tests and by the runner without `--db`.

use super::{check_quota, entry_size, KvStore};
use crate::error::{SimError, SimResult};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries:  BTreeMap<String, String>,
    capacity: usize,
    /// Keys whose writes are refused, for exercising failure paths.
    denied:   BTreeSet<String>,
}

impl MemoryKv {
    pub fn new(capacity: usize) -> Self {
        Self { entries: BTreeMap::new(), capacity, denied: BTreeSet::new() }
    }

    /// Refuse every future write to `key` as if the quota were exhausted.
    pub fn deny_writes(&mut self, key: &str) {
        self.denied.insert(key.to_string());
    }

    pub fn allow_writes(&mut self, key: &str) {
        self.denied.remove(key);
    }

    fn used(&self) -> usize {
        self.entries.iter().map(|(k, v)| entry_size(k, v)).sum()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> SimResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> SimResult<()> {
        if self.denied.contains(key) {
            return Err(SimError::StorageQuota {
                key:       key.to_string(),
                needed:    entry_size(key, value),
                available: 0,
            });
        }
        let existing = self.entries.get(key).map(|v| entry_size(key, v));
        check_quota(key, value, self.used(), existing, self.capacity)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> SimResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> SimResult<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn capacity_bytes(&self) -> usize {
        self.capacity
    }

    fn used_bytes(&self) -> SimResult<usize> {
        Ok(self.used())
    }
}
