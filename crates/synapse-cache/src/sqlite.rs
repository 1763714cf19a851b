use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use synapse_models::cache_schema::CACHE_TABLE_DDL;
use synapse_models::CacheEntry;
use tracing::info;

use crate::error::CacheError;

/// SQLite persistence for result-cache snapshots.
///
/// Timestamps are stored as fixed-width RFC 3339 UTC strings so they compare
/// correctly as text.
pub struct SnapshotStore {
    conn: Connection,
}

fn to_db_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn from_db_timestamp(key: &str, raw: &str) -> Result<DateTime<Utc>, CacheError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| CacheError::CorruptRow {
            key: key.to_string(),
            reason: format!("bad timestamp {raw:?}: {e}"),
        })
}

impl SnapshotStore {
    /// Open (or create) a snapshot database at `path`.
    pub fn open(path: &str) -> Result<Self, CacheError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(CACHE_TABLE_DDL)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, CacheError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CACHE_TABLE_DDL)?;
        Ok(Self { conn })
    }

    /// Replace the stored snapshot with `entries`. Returns rows written.
    pub fn save(&mut self, entries: &[CacheEntry]) -> Result<usize, CacheError> {
        let updated_at = to_db_timestamp(Utc::now());
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM cache_entries", [])?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO cache_entries \
                 (key, value_json, expires_at, last_accessed_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for entry in entries {
                stmt.execute(rusqlite::params![
                    entry.key,
                    entry.value_json,
                    entry.expires_at.map(to_db_timestamp),
                    to_db_timestamp(entry.last_accessed_at),
                    updated_at,
                ])?;
            }
        }
        tx.commit()?;
        info!(rows = entries.len(), "Saved cache snapshot");
        Ok(entries.len())
    }

    /// Load every entry that has not expired yet.
    pub fn load(&self) -> Result<Vec<CacheEntry>, CacheError> {
        let now = to_db_timestamp(Utc::now());
        let mut stmt = self.conn.prepare_cached(
            "SELECT key, value_json, expires_at, last_accessed_at \
             FROM cache_entries WHERE expires_at IS NULL OR expires_at > ?1 \
             ORDER BY key",
        )?;

        let rows = stmt
            .query_map(rusqlite::params![now], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let entries = rows
            .into_iter()
            .map(|(key, value_json, expires_at, last_accessed_at)| {
                let expires_at = expires_at
                    .map(|raw| from_db_timestamp(&key, &raw))
                    .transpose()?;
                let last_accessed_at = from_db_timestamp(&key, &last_accessed_at)?;
                Ok(CacheEntry {
                    key,
                    value_json,
                    expires_at,
                    last_accessed_at,
                })
            })
            .collect::<Result<Vec<_>, CacheError>>()?;

        info!(rows = entries.len(), "Loaded cache snapshot");
        Ok(entries)
    }

    /// Number of stored rows, expired ones included.
    pub fn count(&self) -> Result<usize, CacheError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cache_entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_entry(key: &str, ttl_seconds: Option<i64>) -> CacheEntry {
        let now = Utc::now();
        CacheEntry {
            key: key.to_string(),
            value_json: r#"{"approach": "standard"}"#.to_string(),
            expires_at: ttl_seconds.map(|s| now + Duration::seconds(s)),
            last_accessed_at: now,
        }
    }

    #[test]
    fn save_and_load() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        let written = store
            .save(&[make_entry("scenario:a", Some(300)), make_entry("scenario:b", None)])
            .unwrap();
        assert_eq!(written, 2);

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].key, "scenario:a");
        assert!(loaded[0].expires_at.is_some());
        assert!(loaded[1].expires_at.is_none());
    }

    #[test]
    fn expired_rows_are_skipped() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        store
            .save(&[make_entry("stale", Some(-60)), make_entry("fresh", Some(60))])
            .unwrap();

        assert_eq!(store.count().unwrap(), 2);
        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].key, "fresh");
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let mut store = SnapshotStore::open_in_memory().unwrap();
        store.save(&[make_entry("old", None)]).unwrap();
        store.save(&[make_entry("new", None)]).unwrap();

        let keys: Vec<String> = store.load().unwrap().into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["new".to_string()]);
    }

    #[test]
    fn corrupt_timestamp_is_reported() {
        let store = SnapshotStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO cache_entries (key, value_json, expires_at, last_accessed_at, updated_at) \
                 VALUES ('bad', '1', NULL, 'yesterday', 'yesterday')",
                [],
            )
            .unwrap();

        assert!(matches!(store.load(), Err(CacheError::CorruptRow { .. })));
    }
}
