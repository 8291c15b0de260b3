//! Process-local page cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{CachedPage, PageCache, PageCacheError, PageCacheKey};

/// Entry count at which writes start evicting.
pub const DEFAULT_MAX_ENTRIES: usize = 300;

/// Fraction (1/n) of live entries dropped when the cache is full.
const CULL_FREQUENCY: usize = 3;

struct Entry {
    page: CachedPage,
    expires_at: DateTime<Utc>,
}

/// Mutex-guarded map of rendered pages.
///
/// Expired entries are treated as absent on read. A write that finds the map
/// full first sweeps expired entries, then culls the third of the remaining
/// entries closest to expiry, so the map never holds more than
/// `max_entries` pages.
pub struct InMemoryPageCache {
    entries: Mutex<HashMap<PageCacheKey, Entry>>,
    clock: Arc<dyn Clock>,
    max_entries: usize,
}

impl InMemoryPageCache {
    /// Empty cache reading time from `clock`, bounded by
    /// [`DEFAULT_MAX_ENTRIES`].
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_max_entries(clock, DEFAULT_MAX_ENTRIES)
    }

    /// Empty cache holding at most `max_entries` pages (at least one).
    pub fn with_max_entries(clock: Arc<dyn Clock>, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            max_entries: max_entries.max(1),
        }
    }

    /// Number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<PageCacheKey, Entry>>, PageCacheError> {
        self.entries
            .lock()
            .map_err(|_| PageCacheError::backend("page cache mutex poisoned"))
    }

    fn make_room(&self, entries: &mut HashMap<PageCacheKey, Entry>, now: DateTime<Utc>) {
        entries.retain(|_, entry| entry.expires_at > now);
        if entries.len() < self.max_entries {
            return;
        }

        let mut by_expiry: Vec<(DateTime<Utc>, PageCacheKey)> = entries
            .iter()
            .map(|(key, entry)| (entry.expires_at, key.clone()))
            .collect();
        by_expiry.sort_unstable_by_key(|(expires_at, _)| *expires_at);
        let overflow = entries.len().saturating_add(1).saturating_sub(self.max_entries);
        let cull = entries
            .len()
            .checked_div(CULL_FREQUENCY)
            .unwrap_or_default()
            .max(overflow);
        for (_, key) in by_expiry.into_iter().take(cull) {
            entries.remove(&key);
        }
        debug!(culled = cull, remaining = entries.len(), "page cache culled");
    }
}

#[async_trait]
impl PageCache for InMemoryPageCache {
    async fn get(&self, key: &PageCacheKey) -> Result<Option<CachedPage>, PageCacheError> {
        let now = self.clock.utc();
        let mut entries = self.lock()?;
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.page.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        key: &PageCacheKey,
        page: &CachedPage,
        ttl: Duration,
    ) -> Result<(), PageCacheError> {
        let lifetime = TimeDelta::from_std(ttl)
            .map_err(|err| PageCacheError::backend(format!("invalid ttl: {err}")))?;
        let now = self.clock.utc();
        let expires_at = now + lifetime;
        let mut entries = self.lock()?;
        if !entries.contains_key(key) && entries.len() >= self.max_entries {
            self.make_room(&mut entries, now);
        }
        entries.insert(
            key.clone(),
            Entry {
                page: page.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn flush(&self, prefix: &str) -> Result<(), PageCacheError> {
        self.lock()?.retain(|key, _| key.prefix() != prefix);
        Ok(())
    }
}
