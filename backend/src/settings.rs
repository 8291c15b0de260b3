//! Process settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `BLOG_*` environment variables and config
//! files, in that order of precedence.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: SocketAddr =
    SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), 8080);
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_RUN_MIGRATIONS: bool = true;

/// Settings for the blog server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BLOG")]
pub struct BlogSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. Without one the server keeps everything in memory.
    pub database_url: Option<String>,
    /// Redis URL for the page cache. Without one pages are cached in-process.
    pub redis_url: Option<String>,
    /// Directory holding uploaded images.
    pub media_root: Option<PathBuf>,
    /// Apply pending migrations at start-up. Defaults to on.
    pub run_migrations: Option<bool>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
}

impl BlogSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn media_root(&self) -> &Path {
        self.media_root
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_MEDIA_ROOT))
    }

    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(DEFAULT_RUN_MIGRATIONS)
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "BLOG_BIND_ADDR",
        "BLOG_DATABASE_URL",
        "BLOG_REDIS_URL",
        "BLOG_MEDIA_ROOT",
        "BLOG_RUN_MIGRATIONS",
        "BLOG_DB_MAX_CONNECTIONS",
    ];

    fn load_from_empty_args() -> BlogSettings {
        BlogSettings::load_from_iter([OsString::from("blog")]).expect("settings should load")
    }

    #[rstest]
    fn defaults_select_in_memory_adapters() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), DEFAULT_BIND_ADDR);
        assert!(settings.database_url.is_none());
        assert!(settings.redis_url.is_none());
        assert_eq!(settings.media_root(), Path::new("media"));
        assert!(settings.run_migrations());
        assert_eq!(settings.db_max_connections(), 10);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("BLOG_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "BLOG_DATABASE_URL",
                Some("postgres://blog@localhost/blog".to_owned()),
            ),
            ("BLOG_REDIS_URL", Some("redis://localhost:6379".to_owned())),
            ("BLOG_MEDIA_ROOT", Some("/srv/media".to_owned())),
            ("BLOG_RUN_MIGRATIONS", Some("false".to_owned())),
            ("BLOG_DB_MAX_CONNECTIONS", Some("4".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr(),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://blog@localhost/blog")
        );
        assert_eq!(settings.redis_url.as_deref(), Some("redis://localhost:6379"));
        assert_eq!(settings.media_root(), Path::new("/srv/media"));
        assert!(!settings.run_migrations());
        assert_eq!(settings.db_max_connections(), 4);
    }
}
