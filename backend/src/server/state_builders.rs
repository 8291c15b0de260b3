//! Selection of outbound adapters for the HTTP state.
//!
//! PostgreSQL and Redis are used when configured. Otherwise entities live in
//! an [`InMemoryStore`] and pages in an [`InMemoryPageCache`].

use std::path::Path;
use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use blog::domain::ports::{
    CommentRepository, FollowRepository, GroupRepository, LoginService, PageCache, PostRepository,
    UserRepository,
};
use blog::inbound::http::state::{HttpState, HttpStatePorts};
use blog::outbound::cache::{InMemoryPageCache, RedisPageCache};
use blog::outbound::media::CapStdImageStorage;
use blog::outbound::memory::InMemoryStore;
use blog::outbound::persistence::{
    DbPool, DieselCommentRepository, DieselFollowRepository, DieselGroupRepository,
    DieselLoginService, DieselPostRepository, DieselUserRepository,
};

use super::ServerConfig;

const DEMO_USERNAME: &str = "demo";
const DEMO_PASSWORD: &str = "demo";

/// Entity store ports, all backed by the same storage.
struct StorePorts {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    follows: Arc<dyn FollowRepository>,
    login: Arc<dyn LoginService>,
}

fn diesel_ports(pool: &DbPool) -> StorePorts {
    StorePorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        groups: Arc::new(DieselGroupRepository::new(pool.clone())),
        posts: Arc::new(DieselPostRepository::new(pool.clone())),
        comments: Arc::new(DieselCommentRepository::new(pool.clone())),
        follows: Arc::new(DieselFollowRepository::new(pool.clone())),
        login: Arc::new(DieselLoginService::new(pool.clone())),
    }
}

fn in_memory_ports() -> StorePorts {
    let store = Arc::new(InMemoryStore::new());
    match store.register_user(DEMO_USERNAME, DEMO_PASSWORD) {
        Ok(_) => warn!(
            username = DEMO_USERNAME,
            "no database configured; entities are kept in memory with a demo login"
        ),
        Err(err) => warn!(error = %err, "failed to seed demo user"),
    }
    StorePorts {
        users: store.clone(),
        groups: store.clone(),
        posts: store.clone(),
        comments: store.clone(),
        follows: store.clone(),
        login: store,
    }
}

async fn page_cache(redis_url: Option<&str>, clock: Arc<dyn Clock>) -> Arc<dyn PageCache> {
    let Some(url) = redis_url else {
        return Arc::new(InMemoryPageCache::new(clock));
    };
    match RedisPageCache::connect(url).await {
        Ok(cache) => {
            info!("page cache backed by redis");
            Arc::new(cache)
        }
        Err(err) => {
            warn!(error = %err, "redis unavailable; caching pages in-process");
            Arc::new(InMemoryPageCache::new(clock))
        }
    }
}

fn image_storage(media_root: &Path) -> std::io::Result<CapStdImageStorage> {
    CapStdImageStorage::open(media_root).map_err(|err| {
        std::io::Error::other(format!(
            "failed to open media root {}: {err}",
            media_root.display()
        ))
    })
}

/// Build the handler state for `config`.
///
/// # Errors
/// Returns [`std::io::Error`] when the media root cannot be opened.
pub(super) async fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let store = match &config.db_pool {
        Some(pool) => diesel_ports(pool),
        None => in_memory_ports(),
    };
    let images = image_storage(&config.media_root)?;
    let page_cache = page_cache(config.redis_url.as_deref(), clock.clone()).await;

    Ok(HttpState::from(HttpStatePorts {
        users: store.users,
        groups: store.groups,
        posts: store.posts,
        comments: store.comments,
        follows: store.follows,
        login: store.login,
        images: Arc::new(images),
        page_cache,
        clock,
    }))
}
