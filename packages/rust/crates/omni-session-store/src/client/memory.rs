use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::time::Duration;

use async_trait::async_trait;
use globset::{GlobBuilder, GlobMatcher};
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{KeyExpiry, KeyValueClient, ScanPage};
use crate::error::{Result, SessionStoreError};

#[derive(Debug)]
struct MemoryEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: BTreeMap<String, MemoryEntry>,
    /// Open scan cursors, each mapped to the last key it examined.
    cursors: HashMap<u64, String>,
    last_cursor: u64,
}

impl MemoryState {
    fn park_cursor(&mut self, resume_after: String) -> u64 {
        self.last_cursor = self.last_cursor.checked_add(1).unwrap_or(1);
        self.cursors.insert(self.last_cursor, resume_after);
        self.last_cursor
    }
}

/// In-process key-value client (single process only).
///
/// Mirrors the Redis behavior the session store relies on: SET drops any
/// TTL, a non-positive TTL deletes the key, expired keys vanish on access,
/// and SCAN walks the keyspace in key order, `count` keys per page, filtering
/// by glob pattern. A cursor resumes after the last key it examined, so a key
/// present for the whole walk is returned even when other keys are removed
/// between pages. Cursors are single-use; an unknown cursor ends the walk.
#[derive(Debug, Default)]
pub struct MemoryKeyValueClient {
    state: Mutex<MemoryState>,
}

impl MemoryKeyValueClient {
    /// Create an empty client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys that have not expired.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let state = self.state.lock().await;
        state
            .entries
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Whether every key is missing or expired.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remaining TTL of `key`; `None` when missing or without expiry.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        let state = self.state.lock().await;
        state
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .and_then(|entry| entry.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Drop every key.
    pub async fn flush(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        state.cursors.clear();
    }
}

fn ttl_duration(ttl: KeyExpiry) -> Option<Duration> {
    match ttl {
        KeyExpiry::Seconds(seconds) => u64::try_from(seconds)
            .ok()
            .filter(|value| *value > 0)
            .map(Duration::from_secs),
        KeyExpiry::Milliseconds(millis) => u64::try_from(millis)
            .ok()
            .filter(|value| *value > 0)
            .map(Duration::from_millis),
    }
}

fn compile_pattern(pattern: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(pattern)
        .literal_separator(false)
        .backslash_escape(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|error| SessionStoreError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: error.to_string(),
        })
}

#[async_trait]
impl KeyValueClient for MemoryKeyValueClient {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        if let Some(entry) = state.entries.get(key)
            && entry.is_live(now)
        {
            return Ok(Some(entry.value.clone()));
        }
        state.entries.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut state = self.state.lock().await;
        state.entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_vec(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: KeyExpiry) -> Result<()> {
        let now = Instant::now();
        let mut state = self.state.lock().await;
        let live = state.entries.get(key).is_some_and(|entry| entry.is_live(now));
        match ttl_duration(ttl) {
            Some(duration) if live => {
                if let Some(entry) = state.entries.get_mut(key) {
                    entry.expires_at = Some(now + duration);
                }
            }
            _ => {
                state.entries.remove(key);
            }
        }
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.state.lock().await.entries.remove(key);
        Ok(())
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> Result<ScanPage> {
        let matcher = compile_pattern(pattern)?;
        let now = Instant::now();
        let mut state = self.state.lock().await;
        let resume_after = if cursor == 0 {
            None
        } else {
            let Some(key) = state.cursors.remove(&cursor) else {
                return Ok(ScanPage::default());
            };
            Some(key)
        };
        let lower = resume_after
            .as_deref()
            .map_or(Bound::Unbounded, Bound::Excluded);

        let mut keys = Vec::new();
        let mut expired = Vec::new();
        let mut last_examined = None;
        let mut window = state.entries.range::<str, _>((lower, Bound::Unbounded));
        for (key, entry) in window.by_ref().take(count.max(1)) {
            if !entry.is_live(now) {
                expired.push(key.clone());
            } else if matcher.is_match(key.as_str()) {
                keys.push(key.clone());
            }
            last_examined = Some(key.clone());
        }
        let exhausted = window.next().is_none();

        for key in &expired {
            state.entries.remove(key);
        }
        let cursor = match last_examined {
            Some(key) if !exhausted => state.park_cursor(key),
            _ => 0,
        };
        Ok(ScanPage { cursor, keys })
    }
}
