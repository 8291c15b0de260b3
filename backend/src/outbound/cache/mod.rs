//! Page cache adapters.
//!
//! - [`InMemoryPageCache`]: bounded process-local map with clock-driven expiry, used
//!   when no Redis URL is configured and in tests.
//! - [`RedisPageCache`]: shared cache backed by a Redis connection manager;
//!   expiry is delegated to Redis via `SETEX` and flushes walk the prefix with
//!   `SCAN`.

mod memory;
mod redis_cache;

pub use memory::{DEFAULT_MAX_ENTRIES, InMemoryPageCache};
pub use redis_cache::RedisPageCache;
