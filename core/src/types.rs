//! Shared primitive types used across the entire simulation.

/// Wall-clock milliseconds since the Unix epoch.
pub type TimestampMs = i64;

/// A duration in milliseconds.
pub type DurationMs = u64;

/// A stable, unique identifier for a save slot.
pub type SlotId = String;

pub const MS_PER_SECOND: f64 = 1_000.0;
pub const MS_PER_MINUTE: DurationMs = 60 * 1_000;
pub const MS_PER_HOUR: DurationMs = 60 * MS_PER_MINUTE;
