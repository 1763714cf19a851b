use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Table used to persist result-cache entries between runs.
///
/// ```sql
/// CREATE TABLE IF NOT EXISTS cache_entries (
///     key               TEXT PRIMARY KEY,
///     value_json        TEXT NOT NULL,
///     expires_at        TEXT,
///     last_accessed_at  TEXT NOT NULL,
///     updated_at        TEXT NOT NULL
/// );
///
/// CREATE INDEX IF NOT EXISTS idx_cache_expires ON cache_entries(expires_at);
/// ```
///
/// A NULL `expires_at` means the entry never expires.
pub const CACHE_TABLE_DDL: &str = "\
CREATE TABLE IF NOT EXISTS cache_entries (
    key               TEXT PRIMARY KEY,
    value_json        TEXT NOT NULL,
    expires_at        TEXT,
    last_accessed_at  TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cache_expires ON cache_entries(expires_at);
";

/// Prefix of the shadow entry that stores a key's tags.
pub const TAG_KEY_PREFIX: &str = "tags:";

/// Key pattern conventions for the result cache.
///
/// - Resolved solutions: `scenario:{scenario_id}`
/// - Tag shadow entries: `tags:{key}`
/// - Predictor output: `prediction:{prediction_id}`
/// - Signal readings (hot cache): `signal:{kind}:{subject}`
pub mod key_patterns {
    use super::TAG_KEY_PREFIX;

    pub fn scenario(scenario_id: &str) -> String {
        format!("scenario:{scenario_id}")
    }

    pub fn tags(key: &str) -> String {
        format!("{TAG_KEY_PREFIX}{key}")
    }

    pub fn prediction(prediction_id: &str) -> String {
        format!("prediction:{prediction_id}")
    }

    pub fn signal(kind: &str, subject: &str) -> String {
        format!("signal:{kind}:{subject}")
    }

    pub fn is_tag_key(key: &str) -> bool {
        key.starts_with(TAG_KEY_PREFIX)
    }
}

/// A single result-cache entry. `value_json` is the serialized value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub value_json: String,
    /// `None` means the entry never expires.
    pub expires_at: Option<DateTime<Utc>>,
    pub last_accessed_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now > expires_at,
            None => false,
        }
    }
}
