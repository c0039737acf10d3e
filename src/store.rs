//! Lifetime statistics and their on-disk store.
//!
//! The record is a small pretty-printed JSON object. Loading never fails:
//! a missing or unreadable file yields the zero record, and fields absent
//! from older files take their defaults.

use crate::session::SessionSnapshot;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Cumulative statistics across every completed session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifetimeRecord {
    pub total_scroll_up: u64,
    pub total_scroll_down: u64,
    /// Scroll ticks in either direction, not button presses.
    pub total_clicks: u64,
    pub total_sessions: u64,
    pub total_time_seconds: f64,
    #[serde(with = "timestamp_serde")]
    pub first_session: Option<DateTime<Local>>,
    #[serde(with = "timestamp_serde")]
    pub last_session: Option<DateTime<Local>>,
    /// Keys this version does not know about, written back untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LifetimeRecord {
    /// Fold a finished session into the lifetime totals.
    pub fn fold_session(
        &mut self,
        session: SessionSnapshot,
        elapsed_secs: f64,
        now: DateTime<Local>,
    ) {
        self.total_scroll_up += session.up;
        self.total_scroll_down += session.down;
        self.total_clicks += session.total();
        self.total_sessions += 1;
        self.total_time_seconds += elapsed_secs.max(0.0);
        if self.first_session.is_none() {
            self.first_session = Some(now);
        }
        self.last_session = Some(now);
    }

    /// Whether `total_clicks` matches the per-direction totals.
    pub fn is_consistent(&self) -> bool {
        self.total_clicks == self.total_scroll_up + self.total_scroll_down
    }
}

/// File-backed store for the [`LifetimeRecord`].
#[derive(Debug, Clone)]
pub struct StatsStore {
    path: PathBuf,
}

impl StatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record, falling back to defaults on any failure.
    pub fn load(&self) -> LifetimeRecord {
        match self.try_load() {
            Ok(Some(record)) => {
                if !record.is_consistent() {
                    tracing::warn!(
                        "total_clicks ({}) does not match up + down in {}",
                        record.total_clicks,
                        self.path.display()
                    );
                }
                record
            }
            Ok(None) => {
                tracing::debug!("No stats file at {}, starting fresh", self.path.display());
                LifetimeRecord::default()
            }
            Err(e) => {
                tracing::warn!("Ignoring unreadable stats file: {e}");
                LifetimeRecord::default()
            }
        }
    }

    /// Load the record, reporting why it could not be read.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn try_load(&self) -> Result<Option<LifetimeRecord>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(self.path.clone(), e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Parse(self.path.clone(), e))
    }

    /// Replace the file with `record`.
    ///
    /// The JSON is written to a sibling temp file first and renamed over the
    /// target, so a failed write leaves the previous record in place.
    pub fn save(&self, record: &LifetimeRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(parent.to_path_buf(), e))?;
        }

        let json = serde_json::to_string_pretty(record).map_err(StoreError::Serialize)?;

        let tmp = self.temp_path();
        std::fs::write(&tmp, json).map_err(|e| StoreError::Io(tmp.clone(), e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            StoreError::Io(self.path.clone(), e)
        })?;

        tracing::debug!("Saved lifetime stats to {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Stats store errors.
#[derive(Debug)]
pub enum StoreError {
    Io(PathBuf, io::Error),
    Parse(PathBuf, serde_json::Error),
    Serialize(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(path, e) => write!(f, "IO error on {}: {e}", path.display()),
            StoreError::Parse(path, e) => write!(f, "Parse error in {}: {e}", path.display()),
            StoreError::Serialize(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(_, e) => Some(e),
            StoreError::Parse(_, e) | StoreError::Serialize(e) => Some(e),
        }
    }
}

/// Serde support for optional local timestamps.
///
/// Writes RFC 3339. Reads RFC 3339 as well as ISO-8601 without an offset,
/// which is taken as local time. A timestamp that cannot be parsed reads as
/// `None` instead of discarding the whole record.
mod timestamp_serde {
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Local>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_some(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Local>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| {
            let parsed = parse(&s);
            if parsed.is_none() {
                tracing::warn!("Dropping unrecognised timestamp {s:?}");
            }
            parsed
        }))
    }

    pub(super) fn parse(s: &str) -> Option<DateTime<Local>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Some(ts.with_timezone(&Local));
        }
        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
        Local.from_local_datetime(&naive).earliest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 30, 0).unwrap()
    }

    fn store_in(dir: &TempDir) -> StatsStore {
        StatsStore::new(dir.path().join("scroll_data.json"))
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let record = store_in(&dir).load();

        assert_eq!(record, LifetimeRecord::default());
        assert_eq!(record.total_sessions, 0);
        assert!(record.first_session.is_none());
        assert!(record.last_session.is_none());
    }

    #[test]
    fn test_corrupt_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.load(), LifetimeRecord::default());
        assert!(matches!(store.try_load(), Err(StoreError::Parse(_, _))));
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let record = LifetimeRecord {
            total_scroll_up: 41,
            total_scroll_down: 17,
            total_clicks: 58,
            total_sessions: 3,
            total_time_seconds: 3841.1984362351004,
            first_session: Some(fixed_time()),
            last_session: Some(fixed_time() + Duration::milliseconds(86_400_123)),
            ..Default::default()
        };

        store.save(&record).unwrap();
        assert_eq!(store.load(), record);
    }

    #[test]
    fn test_round_trip_preserves_elapsed_times_exactly() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        // Elapsed times as a monotonic clock reports them: whole seconds plus
        // nanoseconds, summed over several sessions.
        let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        let mut record = LifetimeRecord::default();
        for i in 0..2_000 {
            let secs = next() % 20_000;
            let nanos = (next() % 1_000_000_000) as u32;
            let elapsed = std::time::Duration::new(secs, nanos).as_secs_f64();
            record.fold_session(SessionSnapshot::new(i, 1), elapsed, fixed_time());

            let json = serde_json::to_string_pretty(&record).unwrap();
            let parsed: LifetimeRecord = serde_json::from_str(&json).unwrap();
            assert_eq!(
                parsed.total_time_seconds.to_bits(),
                record.total_time_seconds.to_bits(),
                "total_time_seconds {} changed after {} sessions",
                record.total_time_seconds,
                i + 1
            );

            if i % 250 == 0 {
                store.save(&record).unwrap();
                assert_eq!(store.load(), record);
            }
        }

        for seconds in [0.1 + 0.2, 1e-9, 86_399.999_999_999, 3841.1984362351004] {
            let record = LifetimeRecord {
                total_time_seconds: seconds,
                ..Default::default()
            };
            store.save(&record).unwrap();
            assert_eq!(store.load().total_time_seconds.to_bits(), seconds.to_bits());
        }
    }

    #[test]
    fn test_round_trip_null_timestamps() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let record = LifetimeRecord::default();

        store.save(&record).unwrap();
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\"first_session\": null"));
        assert_eq!(store.load(), record);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{ "total_scroll_up": 5, "total_scroll_down": 2, "total_clicks": 7 }"#,
        )
        .unwrap();

        let record = store.load();
        assert_eq!(record.total_scroll_up, 5);
        assert_eq!(record.total_scroll_down, 2);
        assert_eq!(record.total_clicks, 7);
        assert_eq!(record.total_sessions, 0);
        assert_eq!(record.total_time_seconds, 0.0);
        assert!(record.first_session.is_none());
        assert!(record.last_session.is_none());
    }

    #[test]
    fn test_unknown_keys_are_preserved() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{ "total_sessions": 2, "theme": "dark" }"#).unwrap();

        let record = store.load();
        assert_eq!(record.total_sessions, 2);
        store.save(&record).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw["total_sessions"], 2);
    }

    #[test]
    fn test_offset_less_timestamps_load_as_local() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{ "first_session": "2024-03-09T14:30:00.250000", "last_session": "2024-03-09T14:30:00" }"#,
        )
        .unwrap();

        let record = store.load();
        assert_eq!(
            record.first_session,
            Some(fixed_time() + Duration::milliseconds(250))
        );
        assert_eq!(record.last_session, Some(fixed_time()));
    }

    #[test]
    fn test_bad_timestamp_keeps_counters() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"{ "total_scroll_up": 9, "first_session": "yesterday" }"#,
        )
        .unwrap();

        let record = store.load();
        assert_eq!(record.total_scroll_up, 9);
        assert!(record.first_session.is_none());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = StatsStore::new(dir.path().join("nested").join("stats.json"));

        store.save(&LifetimeRecord::default()).unwrap();
        assert!(store.path().exists());
        assert!(!dir.path().join("nested").join("stats.json.tmp").exists());
    }

    #[test]
    fn test_fold_first_session() {
        let mut record = LifetimeRecord::default();
        let now = fixed_time();

        record.fold_session(SessionSnapshot::new(7, 3), 120.0, now);

        assert_eq!(record.total_scroll_up, 7);
        assert_eq!(record.total_scroll_down, 3);
        assert_eq!(record.total_clicks, 10);
        assert_eq!(record.total_sessions, 1);
        assert_eq!(record.total_time_seconds, 120.0);
        assert_eq!(record.first_session, Some(now));
        assert_eq!(record.last_session, Some(now));
        assert!(record.is_consistent());
    }

    #[test]
    fn test_fold_zero_session() {
        let first = fixed_time();
        let mut record = LifetimeRecord::default();
        record.fold_session(SessionSnapshot::new(4, 1), 60.0, first);
        let before = record.clone();

        let later = first + Duration::hours(2);
        record.fold_session(SessionSnapshot::default(), 0.0, later);

        assert_eq!(record.total_scroll_up, before.total_scroll_up);
        assert_eq!(record.total_scroll_down, before.total_scroll_down);
        assert_eq!(record.total_clicks, before.total_clicks);
        assert_eq!(record.total_time_seconds, before.total_time_seconds);
        assert_eq!(record.total_sessions, before.total_sessions + 1);
        assert_eq!(record.first_session, Some(first));
        assert_eq!(record.last_session, Some(later));
    }

    #[test]
    fn test_timestamp_parse_accepts_rfc3339() {
        let ts = timestamp_serde::parse("2024-03-09T14:30:00+00:00").unwrap();
        assert_eq!(ts.timestamp(), 1_709_994_600);
        assert!(timestamp_serde::parse("not a time").is_none());
    }
}
