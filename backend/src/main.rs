//! Blog server entry-point.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use blog::inbound::http::health::HealthState;
use blog::inbound::http::session_config::{
    BuildMode, key_fingerprint, session_settings_from_env,
};
use blog::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use blog::settings::BlogSettings;
use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = BlogSettings::load_from_iter(std::env::args_os())
        .wrap_err("failed to load settings")?;
    let env = DefaultEnv::new();
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(fingerprint = %key_fingerprint(&session.key), "session key loaded");

    let db_pool = connect_database(&settings).await?;

    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr(),
        settings.media_root().to_path_buf(),
    )
    .with_db_pool(db_pool)
    .with_redis_url(settings.redis_url.clone());
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::prometheus()?));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).await?;
    info!(addr = %settings.bind_addr(), "listening");
    server.await?;
    Ok(())
}

async fn connect_database(settings: &BlogSettings) -> Result<Option<DbPool>> {
    let Some(url) = settings.database_url.as_deref() else {
        return Ok(None);
    };
    if settings.run_migrations() {
        let applied = run_pending_migrations(url)
            .await
            .wrap_err("failed to apply migrations")?;
        info!(applied, "database migrations applied");
    }
    let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.db_max_connections()))
        .await
        .wrap_err("failed to build database pool")?;
    Ok(Some(pool))
}
