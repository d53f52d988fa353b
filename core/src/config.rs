use crate::types::{DurationMs, MS_PER_HOUR, MS_PER_MINUTE};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TickConfig {
    /// Wall-clock cadence of the live scheduler.
    pub interval_ms: DurationMs,
    /// Coefficient on `ln(total_units + 1)` for evolution point accrual.
    pub evolution_rate: f64,
    /// How often the running session is written back to storage.
    pub autosave_interval_ms: DurationMs,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval_ms:          1_000,
            evolution_rate:       0.1,
            autosave_interval_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OfflineConfig {
    /// Gaps at or below this are treated as a reload, not time away.
    pub min_gap_ms: DurationMs,
    /// Catch-up never covers more than this.
    pub max_gap_ms: DurationMs,
    /// Fraction of live production earned while away.
    pub efficiency: f64,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            min_gap_ms: 5 * MS_PER_MINUTE,
            max_gap_ms: 24 * MS_PER_HOUR,
            efficiency: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SaveConfig {
    pub max_slots: usize,
    /// Byte budget of the file-backed store.
    pub storage_capacity_bytes: usize,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            max_slots:              5,
            storage_capacity_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotificationConfig {
    pub default_duration_ms:  DurationMs,
    pub welcome_back_ms:      DurationMs,
    pub evolution_unlocked_ms: DurationMs,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            default_duration_ms:   5_000,
            welcome_back_ms:       8_000,
            evolution_unlocked_ms: 6_000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub tick:          TickConfig,
    pub offline:       OfflineConfig,
    pub saves:         SaveConfig,
    pub notifications: NotificationConfig,
}

impl GameConfig {
    /// Load from a JSON file. Missing sections fall back to defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: GameConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.check()?;
        Ok(config)
    }

    /// Config for unit tests: defaults, plus a small in-memory quota.
    pub fn default_test() -> Self {
        let mut config = Self::default();
        config.saves.storage_capacity_bytes = 256 * 1024;
        config
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.tick.interval_ms == 0 {
            anyhow::bail!("tick.interval_ms must be positive");
        }
        if self.offline.min_gap_ms > self.offline.max_gap_ms {
            anyhow::bail!("offline.min_gap_ms exceeds offline.max_gap_ms");
        }
        if !(0.0..=1.0).contains(&self.offline.efficiency) {
            anyhow::bail!("offline.efficiency must be within [0, 1]");
        }
        if self.saves.max_slots == 0 {
            anyhow::bail!("saves.max_slots must be at least 1");
        }
        Ok(())
    }
}
