//! Save format migration.
//!
//! Versions are `major.minor.patch`. Records sharing the current major
//! version load as-is. An older major walks the step table one major at a
//! time; a missing step, a newer major or an unparsable version is a
//! `Migration` error. Migration never writes: the stored record stays
//! intact so a later build can retry.

use crate::{
    error::{SimError, SimResult},
    record::{SaveRecord, CURRENT_FORMAT_VERSION},
};
use serde_json::Value;

/// Upgrade a raw record from `major` to `major + 1`.
type MigrationStep = fn(Value) -> SimResult<Value>;

/// `(from_major, step)`. Empty while the format has only had one major.
const STEPS: &[(u64, MigrationStep)] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FormatVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl FormatVersion {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.trim().split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        let patch = parts.next().map_or(Some(0), |p| p.parse().ok())?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { major, minor, patch })
    }

    pub fn current() -> Self {
        // CURRENT_FORMAT_VERSION is a literal checked by the tests below.
        Self::parse(CURRENT_FORMAT_VERSION).unwrap_or(Self { major: 1, minor: 0, patch: 0 })
    }
}

/// Bring a raw stored record up to the current schema and decode it.
pub fn migrate_record(raw: Value) -> SimResult<SaveRecord> {
    let version = raw
        .get("formatVersion")
        .and_then(Value::as_str)
        .ok_or_else(|| SimError::corrupt("record has no formatVersion"))?
        .to_string();

    let raw = if version == CURRENT_FORMAT_VERSION {
        raw
    } else {
        log::warn!("save format {version} differs from {CURRENT_FORMAT_VERSION}, migrating");
        upgrade(&version, raw)?
    };

    let mut record: SaveRecord = serde_json::from_value(raw)
        .map_err(|e| SimError::corrupt(format!("record shape: {e}")))?;
    record.state.validate().map_err(SimError::corrupt)?;
    record.format_version = CURRENT_FORMAT_VERSION.to_string();
    Ok(record)
}

fn upgrade(version: &str, mut raw: Value) -> SimResult<Value> {
    let no_path = || SimError::Migration {
        from: version.to_string(),
        to:   CURRENT_FORMAT_VERSION.to_string(),
    };
    let from = FormatVersion::parse(version).ok_or_else(no_path)?;
    let current = FormatVersion::current();
    if from.major > current.major {
        return Err(no_path());
    }

    let mut major = from.major;
    while major < current.major {
        let (_, step) = STEPS
            .iter()
            .find(|(m, _)| *m == major)
            .ok_or_else(no_path)?;
        raw = step(raw)?;
        major += 1;
    }
    // Same major: minor and patch changes are additive, identity transform.
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_version_literal_parses() {
        assert!(FormatVersion::parse(CURRENT_FORMAT_VERSION).is_some());
    }

    #[test]
    fn parse_versions() {
        assert_eq!(
            FormatVersion::parse("1.2.3"),
            Some(FormatVersion { major: 1, minor: 2, patch: 3 })
        );
        assert_eq!(
            FormatVersion::parse("2"),
            Some(FormatVersion { major: 2, minor: 0, patch: 0 })
        );
        assert_eq!(FormatVersion::parse("one.two"), None);
        assert_eq!(FormatVersion::parse("1.2.3.4"), None);
    }

    #[test]
    fn older_major_without_step_fails() {
        let err = upgrade("0.9.0", Value::Null).unwrap_err();
        assert!(matches!(err, SimError::Migration { .. }));
    }

    #[test]
    fn same_major_is_identity() {
        let raw = serde_json::json!({ "x": 1 });
        assert_eq!(upgrade("1.4.0", raw.clone()).unwrap(), raw);
    }
}
