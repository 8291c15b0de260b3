//! Time-bounded caching of rendered pages.
//!
//! Entries live for [`PAGE_CACHE_TTL`] and are otherwise only removed by an
//! explicit [`PageCacheService::flush`]. Writes elsewhere in the system never
//! invalidate them. A failing backend degrades to rendering every request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::Error;
use super::ports::{CachedPage, PageCache, PageCacheKey};

/// Namespace of cached home feed pages.
pub const INDEX_PAGE_PREFIX: &str = "index_page";

/// Lifetime of a cached page.
pub const PAGE_CACHE_TTL: Duration = Duration::from_secs(20);

/// Wraps a [`PageCache`] with the read-through policy used by handlers.
#[derive(Clone)]
pub struct PageCacheService {
    cache: Arc<dyn PageCache>,
    prefix: String,
    ttl: Duration,
}

impl PageCacheService {
    /// Cache pages under [`INDEX_PAGE_PREFIX`] for [`PAGE_CACHE_TTL`].
    pub fn new(cache: Arc<dyn PageCache>) -> Self {
        Self::with_policy(cache, INDEX_PAGE_PREFIX, PAGE_CACHE_TTL)
    }

    /// Cache pages under `prefix` for `ttl`.
    pub fn with_policy(cache: Arc<dyn PageCache>, prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
            ttl,
        }
    }

    /// Lifetime applied to new entries.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached page for `target`, rendering and storing it on a
    /// miss.
    ///
    /// Render errors are returned and nothing is cached.
    pub async fn get_or_render<F, Fut>(&self, target: &str, render: F) -> Result<CachedPage, Error>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<CachedPage, Error>> + Send,
    {
        let key = PageCacheKey::new(self.prefix.as_str(), target)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        match self.cache.get(&key).await {
            Ok(Some(page)) => {
                debug!(%key, "page cache hit");
                return Ok(page);
            }
            Ok(None) => debug!(%key, "page cache miss"),
            Err(err) => warn!(%key, error = %err, "page cache read failed; rendering uncached"),
        }

        let page = render().await?;
        if let Err(err) = self.cache.put(&key, &page, self.ttl).await {
            warn!(%key, error = %err, "page cache write failed");
        }
        Ok(page)
    }

    /// Drop every cached page in this namespace.
    pub async fn flush(&self) -> Result<(), Error> {
        self.cache
            .flush(self.prefix.as_str())
            .await
            .map_err(|err| Error::service_unavailable(err.to_string()))?;
        debug!(prefix = %self.prefix, "page cache flushed");
        Ok(())
    }
}
