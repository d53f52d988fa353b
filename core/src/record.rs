//! Persisted record shapes.

use crate::{
    snapshot::GameState,
    types::{DurationMs, SlotId, TimestampMs},
};
use serde::{Deserialize, Serialize};

/// Format version stamped on every record written by this build.
pub const CURRENT_FORMAT_VERSION: &str = "1.0.0";

/// One save slot as stored under its own key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    pub id:             SlotId,
    pub name:           String,
    pub timestamp:      TimestampMs,
    pub format_version: String,
    pub play_time_ms:   DurationMs,
    pub state:          GameState,
}

impl SaveRecord {
    pub fn summary(&self) -> SlotSummary {
        SlotSummary {
            id:             self.id.clone(),
            name:           self.name.clone(),
            timestamp:      self.timestamp,
            format_version: self.format_version.clone(),
            play_time_ms:   self.play_time_ms,
        }
    }
}

/// Index entry. The index holds summaries only; the state lives in the
/// per-slot record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SlotSummary {
    pub id:             SlotId,
    pub name:           String,
    pub timestamp:      TimestampMs,
    pub format_version: String,
    pub play_time_ms:   DurationMs,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SaveMetadata {
    pub hive_name:        String,
    pub level:            u64,
    pub total_units:      u64,
    pub evolution_points: f64,
}

impl SaveMetadata {
    pub fn of(state: &GameState) -> Self {
        Self {
            hive_name:        "The Hive".to_string(),
            level:            state.evolution.level(),
            total_units:      state.units.total(),
            evolution_points: state.evolution.points,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StorageUsage {
    pub used:       usize,
    pub available:  usize,
    pub percentage: f64,
}
