//! Port interface for caching rendered pages.
use std::time::Duration;

use async_trait::async_trait;

use super::{PageCacheKey, define_port_error};

define_port_error! {
    /// Errors surfaced by the page cache adapter.
    pub enum PageCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "page cache backend failure: {message}",
    }
}

/// Rendered response body as stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage(Vec<u8>);

impl CachedPage {
    /// Wrap a rendered body.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self(body.into())
    }

    /// Body bytes.
    pub fn body(&self) -> &[u8] {
        &self.0
    }

    /// Take the body bytes.
    pub fn into_body(self) -> Vec<u8> {
        self.0
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageCache: Send + Sync {
    /// Read a live entry for `key`. Expired entries read as absent.
    async fn get(&self, key: &PageCacheKey) -> Result<Option<CachedPage>, PageCacheError>;

    /// Store `page` under `key` for `ttl`.
    async fn put(
        &self,
        key: &PageCacheKey,
        page: &CachedPage,
        ttl: Duration,
    ) -> Result<(), PageCacheError>;

    /// Drop every entry whose key has `prefix`.
    async fn flush(&self, prefix: &str) -> Result<(), PageCacheError>;
}
