use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Resource;

use super::SlotStorage;

const MS_PER_MINUTE: i64 = 60_000;

/// A cached collection and when it was fetched.
///
/// Stored as `{"data": [...], "ts": <epoch ms>}`. Entries written by older
/// front ends as a bare array have no timestamp and are never fresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<R> {
    pub data: Vec<R>,
    #[serde(default)]
    pub ts: Option<i64>,
}

impl<R> CacheEntry<R> {
    pub fn new(data: Vec<R>, fetched_at_ms: i64) -> Self {
        Self {
            data,
            ts: Some(fetched_at_ms),
        }
    }

    fn legacy(data: Vec<R>) -> Self {
        Self { data, ts: None }
    }

    pub fn age_ms(&self, now_ms: i64) -> Option<i64> {
        self.ts.map(|ts| now_ms - ts)
    }

    /// Fresh while strictly younger than `ttl`.
    pub fn is_fresh(&self, now_ms: i64, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        match self.age_ms(now_ms) {
            Some(age) => age < ttl_ms,
            None => false,
        }
    }

    pub fn age_display(&self, now_ms: i64) -> String {
        let Some(age) = self.age_ms(now_ms) else {
            return "unknown".to_string();
        };
        let minutes = age / MS_PER_MINUTE;
        if minutes < 1 {
            // Also covers clock skew (negative age)
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            let remaining_mins = minutes % 60;
            if remaining_mins >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            let remaining_hours = (minutes % 1440) / 60;
            if remaining_hours >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredShape<R> {
    Entry(CacheEntry<R>),
    Legacy(Vec<R>),
}

/// One collection's cache slot in a shared storage backend.
pub struct DurableSlot<R> {
    storage: Arc<dyn SlotStorage>,
    key: String,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for DurableSlot<R> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            key: self.key.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Resource> DurableSlot<R> {
    /// Slot under the record type's standard key
    pub fn new(storage: Arc<dyn SlotStorage>) -> Self {
        Self::with_key(storage, R::KIND.cache_key())
    }

    pub fn with_key(storage: Arc<dyn SlotStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            _record: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the entry. Missing, unreadable, and malformed values all read
    /// as `None`; nothing is modified.
    pub fn read(&self) -> Option<CacheEntry<R>> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(key = %self.key, error = %e, "Failed to read cache slot");
                return None;
            }
        };

        match serde_json::from_str::<StoredShape<R>>(&raw) {
            Ok(StoredShape::Entry(entry)) => Some(entry),
            Ok(StoredShape::Legacy(data)) => {
                debug!(key = %self.key, count = data.len(), "Cache slot holds a bare array");
                Some(CacheEntry::legacy(data))
            }
            Err(e) => {
                debug!(key = %self.key, error = %e, "Ignoring malformed cache slot");
                None
            }
        }
    }

    pub fn write(&self, entry: &CacheEntry<R>) -> Result<()> {
        let contents = serde_json::to_string(entry)
            .with_context(|| format!("Failed to serialize cache entry: {}", self.key))?;
        self.storage.set(&self.key, &contents)
    }
}

// ============================================================================
// Tests
// ============================================================================
