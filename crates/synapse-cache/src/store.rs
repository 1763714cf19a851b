use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use synapse_models::cache_schema::key_patterns;
use synapse_models::CacheEntry;
use tracing::debug;

use crate::error::CacheError;
use crate::pattern::GlobPattern;

/// Lifetime counters. They only ever grow; `clear` does not reset them.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    /// Entries evicted lazily because they were observed past their expiry.
    pub expirations: u64,
}

impl CacheStats {
    pub fn hit_rate_percent(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64 * 100.0
        }
    }
}

/// Point-in-time view of the cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheInfo {
    /// Live value entries, excluding tag shadow entries.
    pub size: usize,
    /// Every live key, including tag shadow entries.
    pub total_keys: usize,
    #[serde(flatten)]
    pub stats: CacheStats,
    pub hit_rate_percent: f64,
    /// Rough estimate from key and value lengths.
    pub memory_usage_mb: f64,
    pub uptime_seconds: u64,
}

/// Result of [`ResultCache::ttl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlStatus {
    /// Whole seconds left before the entry expires.
    Remaining(u64),
    NoExpiry,
    NotFound,
}

/// Deadline for an entry written at `now`. Non-positive TTLs and deadlines
/// past chrono's range both mean no expiry.
fn deadline(now: DateTime<Utc>, ttl_seconds: i64) -> Option<DateTime<Utc>> {
    if ttl_seconds <= 0 {
        return None;
    }
    Duration::try_seconds(ttl_seconds).and_then(|ttl| now.checked_add_signed(ttl))
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

impl CacheState {
    /// Returns the live entry for `key`, evicting it first if it has expired.
    fn live_entry(&mut self, key: &str, now: DateTime<Utc>) -> Option<&mut CacheEntry> {
        let expired = self.entries.get(key)?.is_expired_at(now);
        if expired {
            self.entries.remove(key);
            self.stats.expirations += 1;
            debug!(key, "Evicted expired cache entry");
            return None;
        }
        self.entries.get_mut(key)
    }

    fn evict_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let evicted = before - self.entries.len();
        self.stats.expirations += evicted as u64;
        evicted
    }

    fn insert(
        &mut self,
        key: &str,
        value_json: String,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                key: key.to_string(),
                value_json,
                expires_at,
                last_accessed_at: now,
            },
        );
        self.stats.sets += 1;
    }

    fn tags_of(&mut self, key: &str, now: DateTime<Utc>) -> Vec<String> {
        let tag_key = key_patterns::tags(key);
        self.live_entry(&tag_key, now)
            .and_then(|entry| serde_json::from_str(&entry.value_json).ok())
            .unwrap_or_default()
    }

    /// Live value keys whose tag shadow entry contains `tag`. O(n) in cache size.
    fn keys_tagged(&mut self, tag: &str, now: DateTime<Utc>) -> Vec<String> {
        self.evict_expired(now);
        let mut candidates: Vec<String> = self
            .entries
            .keys()
            .filter(|key| !key_patterns::is_tag_key(key))
            .cloned()
            .collect();
        candidates.sort();
        candidates
            .into_iter()
            .filter(|key| self.tags_of(key, now).iter().any(|t| t == tag))
            .collect()
    }
}

/// In-process TTL-keyed store of serialized results.
///
/// Expiry is lazy: an entry past its deadline is removed by the next access
/// that observes it. `purge_expired` runs the same eviction under the same
/// lock for callers that want to bound memory.
///
/// All state sits behind one `Mutex`, which is never held across an await.
pub struct ResultCache {
    state: Mutex<CacheState>,
    started_at: Instant,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultCache {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            started_at: Instant::now(),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, CacheState>, CacheError> {
        self.state
            .lock()
            .map_err(|e| CacheError::Unavailable(format!("result cache mutex poisoned: {e}")))
    }

    /// Store `value` under `key`, replacing any existing entry.
    /// `ttl_seconds <= 0` means the entry never expires.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: i64,
    ) -> Result<(), CacheError> {
        let value_json = serde_json::to_string(value)?;
        self.set_json(key, value_json, ttl_seconds)
    }

    pub fn set_json(&self, key: &str, value_json: String, ttl_seconds: i64) -> Result<(), CacheError> {
        let now = Utc::now();
        let expires_at = deadline(now, ttl_seconds);
        let mut state = self.state()?;
        state.insert(key, value_json, expires_at, now);
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.get_json(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Raw JSON for `key`. Counts a hit or a miss and refreshes the entry's
    /// last access time.
    pub fn get_json(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Utc::now();
        let mut state = self.state()?;
        let value = state.live_entry(key, now).map(|entry| {
            entry.last_accessed_at = now;
            entry.value_json.clone()
        });
        if value.is_some() {
            state.stats.hits += 1;
        } else {
            state.stats.misses += 1;
        }
        Ok(value)
    }

    /// Remove `key` and its tag shadow entry. Returns whether `key` existed.
    pub fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut state = self.state()?;
        let removed = state.entries.remove(key).is_some();
        state.entries.remove(&key_patterns::tags(key));
        if removed {
            state.stats.deletes += 1;
        }
        Ok(removed)
    }

    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut state = self.state()?;
        Ok(state.live_entry(key, Utc::now()).is_some())
    }

    /// Reset the TTL of a live entry. `ttl_seconds <= 0` removes the expiry.
    pub fn expire(&self, key: &str, ttl_seconds: i64) -> Result<bool, CacheError> {
        let now = Utc::now();
        let expires_at = deadline(now, ttl_seconds);
        let mut state = self.state()?;
        match state.live_entry(key, now) {
            Some(entry) => {
                entry.expires_at = expires_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn ttl(&self, key: &str) -> Result<TtlStatus, CacheError> {
        let now = Utc::now();
        let mut state = self.state()?;
        let status = match state.live_entry(key, now) {
            None => TtlStatus::NotFound,
            Some(CacheEntry {
                expires_at: None, ..
            }) => TtlStatus::NoExpiry,
            Some(CacheEntry {
                expires_at: Some(expires_at),
                ..
            }) => TtlStatus::Remaining((*expires_at - now).num_seconds().max(0) as u64),
        };
        Ok(status)
    }

    /// Drop every entry. Statistics are kept.
    pub fn clear(&self) -> Result<(), CacheError> {
        let mut state = self.state()?;
        let dropped = state.entries.len();
        state.entries.clear();
        debug!(dropped, "Cleared result cache");
        Ok(())
    }

    /// Live keys matching a glob pattern (`*`, `?`), sorted.
    pub fn keys(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        let glob = GlobPattern::new(pattern)?;
        let mut state = self.state()?;
        state.evict_expired(Utc::now());
        let mut keys: Vec<String> = state
            .entries
            .keys()
            .filter(|key| glob.matches(key))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Number of live entries, tag shadow entries included.
    pub fn size(&self) -> Result<usize, CacheError> {
        let mut state = self.state()?;
        state.evict_expired(Utc::now());
        Ok(state.entries.len())
    }

    pub fn info(&self) -> Result<CacheInfo, CacheError> {
        let mut state = self.state()?;
        state.evict_expired(Utc::now());

        let bytes: usize = state
            .entries
            .values()
            .map(|entry| entry.key.len() + entry.value_json.len())
            .sum();
        let size = state
            .entries
            .keys()
            .filter(|key| !key_patterns::is_tag_key(key))
            .count();

        Ok(CacheInfo {
            size,
            total_keys: state.entries.len(),
            stats: state.stats,
            hit_rate_percent: state.stats.hit_rate_percent(),
            memory_usage_mb: bytes as f64 / (1024.0 * 1024.0),
            uptime_seconds: self.started_at.elapsed().as_secs(),
        })
    }

    pub fn stats(&self) -> Result<CacheStats, CacheError> {
        Ok(self.state()?.stats)
    }

    /// Store `value` and a `tags:{key}` shadow entry listing `tags`, both with
    /// the same TTL.
    pub fn set_with_tags<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        tags: &[&str],
        ttl_seconds: i64,
    ) -> Result<(), CacheError> {
        let value_json = serde_json::to_string(value)?;
        let tags_json = serde_json::to_string(tags)?;
        let now = Utc::now();
        let expires_at = deadline(now, ttl_seconds);
        let mut state = self.state()?;
        state.insert(key, value_json, expires_at, now);
        state.insert(&key_patterns::tags(key), tags_json, expires_at, now);
        Ok(())
    }

    /// Values whose tags contain `tag`, ordered by key.
    ///
    /// Scans every key. Does not count hits or misses.
    pub fn get_by_tag<T: DeserializeOwned>(&self, tag: &str) -> Result<Vec<(String, T)>, CacheError> {
        let now = Utc::now();
        let mut state = self.state()?;
        let keys = state.keys_tagged(tag, now);

        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(entry) = state.entries.get(&key) {
                let value = serde_json::from_str(&entry.value_json)?;
                values.push((key, value));
            }
        }
        Ok(values)
    }

    /// Remove every value tagged with `tag` along with its shadow entry.
    /// Returns how many values were removed.
    pub fn delete_by_tag(&self, tag: &str) -> Result<usize, CacheError> {
        let now = Utc::now();
        let mut state = self.state()?;
        let keys = state.keys_tagged(tag, now);
        for key in &keys {
            state.entries.remove(key);
            state.entries.remove(&key_patterns::tags(key));
            state.stats.deletes += 1;
        }
        Ok(keys.len())
    }

    /// Evict every expired entry now. Returns how many were evicted.
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let mut state = self.state()?;
        Ok(state.evict_expired(Utc::now()))
    }

    /// Copies of all live entries, sorted by key.
    pub fn export_entries(&self) -> Result<Vec<CacheEntry>, CacheError> {
        let mut state = self.state()?;
        state.evict_expired(Utc::now());
        let mut entries: Vec<CacheEntry> = state.entries.values().cloned().collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    /// Load previously exported entries, skipping any that have expired since.
    /// Statistics are not touched. Returns how many entries were loaded.
    pub fn restore(&self, entries: Vec<CacheEntry>) -> Result<usize, CacheError> {
        let now = Utc::now();
        let mut state = self.state()?;
        let mut restored = 0;
        for entry in entries {
            if entry.is_expired_at(now) {
                continue;
            }
            state.entries.insert(entry.key.clone(), entry);
            restored += 1;
        }
        Ok(restored)
    }
}
