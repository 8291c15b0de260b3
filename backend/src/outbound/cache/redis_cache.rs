//! Redis-backed page cache.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use tracing::debug;

use crate::domain::ports::{CachedPage, PageCache, PageCacheError, PageCacheKey};

/// Namespace for every key this adapter writes.
const KEY_NAMESPACE: &str = "blog:page";

/// `COUNT` hint for each `SCAN` step during a flush.
const SCAN_BATCH: usize = 100;

/// Page cache stored in Redis with server-side expiry.
#[derive(Clone)]
pub struct RedisPageCache {
    connection: ConnectionManager,
}

impl RedisPageCache {
    /// Connect to the Redis server at `url`.
    pub async fn connect(url: &str) -> Result<Self, PageCacheError> {
        let client = Client::open(url).map_err(map_redis_error)?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(map_redis_error)?;
        Ok(Self { connection })
    }
}

fn map_redis_error(err: RedisError) -> PageCacheError {
    debug!(error = %err, "redis command failed");
    PageCacheError::backend(err.to_string())
}

fn storage_key(key: &PageCacheKey) -> String {
    format!("{KEY_NAMESPACE}:{}:{}", key.prefix(), key.target())
}

/// `SCAN MATCH` pattern covering every entry under `prefix`.
fn flush_pattern(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for ch in prefix.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    format!("{KEY_NAMESPACE}:{escaped}:*")
}

#[async_trait]
impl PageCache for RedisPageCache {
    async fn get(&self, key: &PageCacheKey) -> Result<Option<CachedPage>, PageCacheError> {
        let mut conn = self.connection.clone();
        let body = conn
            .get::<_, Option<Vec<u8>>>(storage_key(key))
            .await
            .map_err(map_redis_error)?;
        Ok(body.map(CachedPage::new))
    }

    async fn put(
        &self,
        key: &PageCacheKey,
        page: &CachedPage,
        ttl: Duration,
    ) -> Result<(), PageCacheError> {
        let mut conn = self.connection.clone();
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(storage_key(key), page.body(), seconds)
            .await
            .map_err(map_redis_error)
    }

    /// Walks the namespace with cursor-based `SCAN` and deletes each batch as
    /// it arrives, so the server is never blocked by a full keyspace walk.
    async fn flush(&self, prefix: &str) -> Result<(), PageCacheError> {
        let mut conn = self.connection.clone();
        let pattern = flush_pattern(prefix);
        let mut cursor: u64 = 0;
        let mut deleted: usize = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .cursor_arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(map_redis_error)?;
            if !keys.is_empty() {
                deleted = deleted.saturating_add(keys.len());
                conn.del::<_, ()>(keys).await.map_err(map_redis_error)?;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        debug!(deleted, prefix, "flushed cached pages");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn storage_key_is_namespaced() {
        let key = PageCacheKey::new("index_page", "/?page=2").expect("key");
        assert_eq!(storage_key(&key), "blog:page:index_page:/?page=2");
    }

    #[rstest]
    #[case("index_page", "blog:page:index_page:*")]
    #[case("odd*[prefix]", "blog:page:odd\\*\\[prefix\\]:*")]
    fn flush_pattern_escapes_glob_characters(#[case] prefix: &str, #[case] expected: &str) {
        assert_eq!(flush_pattern(prefix), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn connect_rejects_malformed_url() {
        let Err(err) = RedisPageCache::connect("not a url").await else {
            panic!("malformed url accepted");
        };
        assert!(matches!(err, PageCacheError::Backend { .. }));
    }
}
