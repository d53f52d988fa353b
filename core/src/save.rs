//! Save slot management.
//!
//! RULES:
//!   - SaveManager exclusively owns the slot index and slot records.
//!   - Every id in the index has a record.
//!   - Writes: record first, then index. A failed index write rolls the
//!     record back.
//!   - Removals: index first, then record. An interrupted removal can
//!     leave an orphaned record (swept by `reconcile`) but never an index
//!     entry pointing at nothing.

use crate::{
    error::{SimError, SimResult},
    migration,
    record::{SaveMetadata, SaveRecord, SlotSummary, StorageUsage, CURRENT_FORMAT_VERSION},
    snapshot::GameState,
    store::KvStore,
    token,
    types::TimestampMs,
};

pub const SAVE_KEY_PREFIX: &str = "hive-mind-save-";
pub const SAVE_SLOTS_KEY: &str = "hive-mind-save-slots";
pub const SESSION_KEY: &str = "hive-mind-game-state";
pub const QUICK_SAVE_PREFIX: &str = "Quick Save";

pub fn record_key(id: &str) -> String {
    format!("{SAVE_KEY_PREFIX}{id}")
}

/// Result of `reconcile`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub dropped_index_entries: Vec<String>,
    pub removed_orphans:       Vec<String>,
    pub index_rebuilt:         bool,
}

pub struct SaveManager<S: KvStore> {
    store:     S,
    max_slots: usize,
}

impl<S: KvStore> SaveManager<S> {
    pub fn new(store: S, max_slots: usize) -> Self {
        Self { store, max_slots: max_slots.max(1) }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    // ── Index ──────────────────────────────────────────────────

    /// All slots, most recent first.
    pub fn list_slots(&self) -> SimResult<Vec<SlotSummary>> {
        let Some(raw) = self.store.get(SAVE_SLOTS_KEY)? else {
            return Ok(Vec::new());
        };
        let mut slots: Vec<SlotSummary> = serde_json::from_str(&raw).map_err(|e| {
            log::error!("save index is unreadable: {e}");
            SimError::corrupt(format!("save index: {e}"))
        })?;
        sort_recent_first(&mut slots);
        Ok(slots)
    }

    fn write_index(&mut self, slots: &[SlotSummary]) -> SimResult<()> {
        let json = serde_json::to_string(slots)?;
        self.store.set(SAVE_SLOTS_KEY, &json)
    }

    // ── Save / load ────────────────────────────────────────────

    /// Snapshot `state` into a new slot. Evicts the oldest slots past the
    /// maximum.
    pub fn save(
        &mut self,
        state: &GameState,
        name: Option<&str>,
        now: TimestampMs,
    ) -> SimResult<SlotSummary> {
        let record = SaveRecord {
            id:             format!("save-{}", uuid::Uuid::new_v4()),
            name:           name
                .map(str::to_string)
                .unwrap_or_else(|| format!("Auto Save {}", display_time(now))),
            timestamp:      now,
            format_version: CURRENT_FORMAT_VERSION.to_string(),
            play_time_ms:   state.settings.total_playtime_ms,
            state:          *state,
        };
        self.insert(record)
    }

    pub fn quick_save(&mut self, state: &GameState, now: TimestampMs) -> SimResult<SlotSummary> {
        let name = format!("{QUICK_SAVE_PREFIX} {}", display_time(now));
        self.save(state, Some(&name), now)
    }

    pub fn latest_quick_save(&self) -> SimResult<Option<SlotSummary>> {
        Ok(self
            .list_slots()?
            .into_iter()
            .find(|s| s.name.starts_with(QUICK_SAVE_PREFIX)))
    }

    fn insert(&mut self, record: SaveRecord) -> SimResult<SlotSummary> {
        let mut slots = self.list_slots()?;
        let key = record_key(&record.id);
        let json = serde_json::to_string(&record)?;
        self.store.set(&key, &json)?;

        let summary = record.summary();
        slots.insert(0, summary.clone());
        sort_recent_first(&mut slots);
        let evicted = if slots.len() > self.max_slots {
            slots.split_off(self.max_slots)
        } else {
            Vec::new()
        };

        if let Err(e) = self.write_index(&slots) {
            log::error!("index write failed for {}, rolling back record: {e}", summary.id);
            if let Err(undo) = self.store.remove(&key) {
                log::warn!("rollback of {key} failed, left as orphan: {undo}");
            }
            return Err(e);
        }

        for slot in &evicted {
            log::info!("evicting save slot {} ({})", slot.id, slot.name);
            if let Err(e) = self.store.remove(&record_key(&slot.id)) {
                log::warn!("evicted record {} not removed: {e}", slot.id);
            }
        }

        log::info!("saved slot {} '{}' at {}", summary.id, summary.name, summary.timestamp);
        Ok(summary)
    }

    /// Full record for `id`, migrated to the current format.
    pub fn load_record(&self, id: &str) -> SimResult<SaveRecord> {
        let raw = self
            .store
            .get(&record_key(id))?
            .ok_or_else(|| SimError::not_found(id))?;
        let value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
            log::error!("save record {id} is unreadable: {e}");
            SimError::corrupt(format!("record {id}: {e}"))
        })?;
        migration::migrate_record(value)
    }

    pub fn load(&self, id: &str) -> SimResult<GameState> {
        let record = self.load_record(id)?;
        log::info!("loaded slot {id} '{}'", record.name);
        Ok(record.state)
    }

    // ── Rename / delete ────────────────────────────────────────

    pub fn rename(&mut self, id: &str, new_name: &str) -> SimResult<SlotSummary> {
        let key = record_key(id);
        let original = self.store.get(&key)?.ok_or_else(|| SimError::not_found(id))?;
        let mut slots = self.list_slots()?;

        let mut record = self.load_record(id)?;
        record.name = new_name.to_string();
        self.store.set(&key, &serde_json::to_string(&record)?)?;

        for slot in slots.iter_mut().filter(|s| s.id == id) {
            slot.name = new_name.to_string();
        }
        if let Err(e) = self.write_index(&slots) {
            log::error!("index write failed renaming {id}, restoring record: {e}");
            self.store.set(&key, &original)?;
            return Err(e);
        }
        Ok(record.summary())
    }

    pub fn delete(&mut self, id: &str) -> SimResult<()> {
        let key = record_key(id);
        let mut slots = self.list_slots()?;
        let indexed = slots.iter().any(|s| s.id == id);
        if !indexed && self.store.get(&key)?.is_none() {
            return Err(SimError::not_found(id));
        }
        if indexed {
            slots.retain(|s| s.id != id);
            self.write_index(&slots)?;
        }
        self.store.remove(&key)?;
        log::info!("deleted slot {id}");
        Ok(())
    }

    // ── Export / import ────────────────────────────────────────

    pub fn export(&self, id: &str) -> SimResult<String> {
        let record = self.load_record(id)?;
        token::encode(&record)
    }

    /// Import a token as a brand-new slot. The original id is never
    /// reused.
    pub fn import(
        &mut self,
        encoded: &str,
        name: Option<&str>,
        now: TimestampMs,
    ) -> SimResult<SlotSummary> {
        let raw = token::decode(encoded)?;
        let mut record = migration::migrate_record(raw)?;
        let original_id = std::mem::replace(
            &mut record.id,
            format!("import-{}", uuid::Uuid::new_v4()),
        );
        record.name = name
            .map(str::to_string)
            .unwrap_or_else(|| format!("Imported: {}", record.name));
        record.timestamp = now;
        log::info!("importing {original_id} as {}", record.id);
        self.insert(record)
    }

    // ── Session state ──────────────────────────────────────────

    /// Persist the live session so the next process start can resume it.
    pub fn store_session(&mut self, state: &GameState) -> SimResult<()> {
        let json = serde_json::to_string(state)?;
        self.store.set(SESSION_KEY, &json)
    }

    pub fn load_session(&self) -> SimResult<Option<GameState>> {
        let Some(raw) = self.store.get(SESSION_KEY)? else {
            return Ok(None);
        };
        let state: GameState = serde_json::from_str(&raw)
            .map_err(|e| SimError::corrupt(format!("session state: {e}")))?;
        state.validate().map_err(SimError::corrupt)?;
        Ok(Some(state))
    }

    // ── Housekeeping ───────────────────────────────────────────

    pub fn metadata(state: &GameState) -> SaveMetadata {
        SaveMetadata::of(state)
    }

    pub fn storage_usage(&self) -> SimResult<StorageUsage> {
        let used = self.store.used_bytes()?;
        let available = self.store.capacity_bytes();
        let percentage = if available == 0 {
            100.0
        } else {
            used as f64 / available as f64 * 100.0
        };
        Ok(StorageUsage { used, available, percentage })
    }

    /// Remove every slot and the index. The session state is kept.
    pub fn clear_all(&mut self) -> SimResult<usize> {
        let ids: Vec<String> = self
            .store
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(SAVE_KEY_PREFIX) && k != SAVE_SLOTS_KEY)
            .collect();
        self.store.remove(SAVE_SLOTS_KEY)?;
        for key in &ids {
            self.store.remove(key)?;
        }
        log::info!("cleared {} save records", ids.len());
        Ok(ids.len())
    }

    /// Bring index and records back in line after an interrupted write:
    /// drop index entries without a record, remove records the index does
    /// not know. An unreadable index is rebuilt from the summary fields of
    /// the stored records; nothing is migrated and no record the rebuild
    /// could not read is removed.
    pub fn reconcile(&mut self) -> SimResult<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let record_ids: Vec<String> = self
            .store
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(SAVE_KEY_PREFIX) && k != SAVE_SLOTS_KEY)
            .map(|k| k[SAVE_KEY_PREFIX.len()..].to_string())
            .collect();

        // Records a rebuild could not summarize stay in storage untouched.
        let mut unreadable = Vec::new();
        let mut slots = match self.list_slots() {
            Ok(slots) => slots,
            Err(SimError::CorruptData { .. }) => {
                report.index_rebuilt = true;
                let mut rebuilt = Vec::new();
                for id in &record_ids {
                    match self.raw_summary(id) {
                        Ok(summary) => rebuilt.push(summary),
                        Err(e) => {
                            log::warn!("record {id} left out of rebuilt index: {e}");
                            unreadable.push(id.clone());
                        }
                    }
                }
                rebuilt
            }
            Err(e) => return Err(e),
        };

        let before = slots.len();
        slots.retain(|s| {
            let keep = record_ids.contains(&s.id);
            if !keep {
                report.dropped_index_entries.push(s.id.clone());
            }
            keep
        });
        sort_recent_first(&mut slots);
        let overflow = if slots.len() > self.max_slots {
            slots.split_off(self.max_slots)
        } else {
            Vec::new()
        };
        if report.index_rebuilt || slots.len() != before || !overflow.is_empty() {
            self.write_index(&slots)?;
        }

        for id in &record_ids {
            if !slots.iter().any(|s| &s.id == id) && !unreadable.contains(id) {
                self.store.remove(&record_key(id))?;
                report.removed_orphans.push(id.clone());
            }
        }
        if report != ReconcileReport::default() {
            log::warn!("save storage reconciled: {report:?}");
        }
        Ok(report)
    }

    /// Index entry read straight from a stored record, without migrating
    /// it. Records from other format versions keep their slot.
    fn raw_summary(&self, id: &str) -> SimResult<SlotSummary> {
        let raw = self
            .store
            .get(&record_key(id))?
            .ok_or_else(|| SimError::not_found(id))?;
        let summary: SlotSummary = serde_json::from_str(&raw)
            .map_err(|e| SimError::corrupt(format!("record {id}: {e}")))?;
        if summary.id != id {
            return Err(SimError::corrupt(format!("record {id} carries id {}", summary.id)));
        }
        Ok(summary)
    }
}

/// Most recent first; equal timestamps keep their existing order.
fn sort_recent_first(slots: &mut [SlotSummary]) {
    slots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

fn display_time(now: TimestampMs) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(now)
        .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| now.to_string())
}
