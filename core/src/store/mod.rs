//! Storage medium: a bounded key/value string store.
//!
//! RULE: Only the save manager talks to a store.
//! The engine and tick code never read or write storage directly.

mod memory;
mod sqlite;

pub use memory::MemoryKv;
pub use sqlite::SqliteKv;

use crate::error::{SimError, SimResult};

pub trait KvStore {
    fn get(&self, key: &str) -> SimResult<Option<String>>;

    /// Insert or replace. Fails with `StorageQuota` when the write would
    /// take the store past its capacity; the old value is kept.
    fn set(&mut self, key: &str, value: &str) -> SimResult<()>;

    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> SimResult<()>;

    fn keys(&self) -> SimResult<Vec<String>>;

    fn capacity_bytes(&self) -> usize;

    fn used_bytes(&self) -> SimResult<usize>;
}

/// Bytes an entry counts against the quota.
pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// Shared quota check for `set` implementations.
pub(crate) fn check_quota(
    key: &str,
    value: &str,
    used: usize,
    existing: Option<usize>,
    capacity: usize,
) -> SimResult<()> {
    let needed = entry_size(key, value);
    let available = capacity.saturating_sub(used.saturating_sub(existing.unwrap_or(0)));
    if needed > available {
        return Err(SimError::StorageQuota {
            key: key.to_string(),
            needed,
            available,
        });
    }
    Ok(())
}
