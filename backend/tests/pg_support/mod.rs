//! Embedded PostgreSQL databases for the Diesel adapter suites.
//!
//! Every test gets its own database cloned from a template that already has
//! the embedded migrations applied. The template name carries a hash of the
//! `migrations/` directory so schema changes never reuse a stale template.
//!
//! Cluster bootstrap blocks, so tests stay synchronous and drive adapter
//! calls through [`block_on`] rather than running inside `#[tokio::test]`.
//!
//! Set `SKIP_TEST_CLUSTER=1` to skip these suites where the cluster cannot
//! start; otherwise a setup failure fails the test.

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use argon2::Argon2;
use argon2::password_hash::{PasswordHasher, SaltString};
use blog::domain::{User, UserId, Username};
use blog::outbound::persistence::{DbPool, PoolConfig};
use diesel::pg::PgConnection;
use diesel::sql_types::{Text, Uuid as SqlUuid};
use diesel::{Connection, RunQueryDsl};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::test_support::{hash_directory, shared_cluster_handle};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use uuid::Uuid;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const TEMPLATE_NAME_PREFIX: &str = "blog_template";

/// Password given to every seeded user.
pub const SEED_PASSWORD: &str = "correct horse";

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// A migrated database that is dropped with this value.
pub struct TestDatabase {
    database: TemporaryDatabase,
}

impl TestDatabase {
    /// Connection URL of the database.
    pub fn url(&self) -> &str {
        self.database.url()
    }

    /// Small pool over the database.
    pub async fn pool(&self) -> DbPool {
        DbPool::new(PoolConfig::new(self.url()).with_max_size(2))
            .await
            .expect("test database pool")
    }

    /// Insert a user with [`SEED_PASSWORD`] and return it.
    pub fn insert_user(&self, username: &str) -> User {
        let id = Uuid::new_v4();
        let salt = SaltString::generate(rand::thread_rng());
        let hash = Argon2::default()
            .hash_password(SEED_PASSWORD.as_bytes(), &salt)
            .expect("hash password")
            .to_string();
        diesel::sql_query("INSERT INTO users (id, username, password_hash) VALUES ($1, $2, $3)")
            .bind::<SqlUuid, _>(id)
            .bind::<Text, _>(username)
            .bind::<Text, _>(hash)
            .execute(&mut self.connect())
            .expect("insert user");
        User::new(
            UserId::from_uuid(id),
            Username::new(username).expect("valid username"),
        )
    }

    /// Insert a group; look it up through the repository by `slug`.
    pub fn insert_group(&self, title: &str, slug: &str) {
        diesel::sql_query("INSERT INTO groups (title, slug, description) VALUES ($1, $2, '')")
            .bind::<Text, _>(title)
            .bind::<Text, _>(slug)
            .execute(&mut self.connect())
            .expect("insert group");
    }

    fn connect(&self) -> PgConnection {
        PgConnection::establish(self.url()).expect("seed connection")
    }
}

/// Run `future` to completion on a fresh current-thread runtime.
pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime")
        .block_on(future)
}

/// Provision a fresh migrated database, or `None` when skipping is allowed.
pub fn test_database() -> Option<TestDatabase> {
    match provision() {
        Ok(database) => Some(TestDatabase { database }),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn provision() -> Result<TemporaryDatabase, String> {
    let cluster = shared_cluster_handle().map_err(|err| format!("cluster: {err:?}"))?;
    let template = ensure_template_database(cluster)?;
    let name = format!("test_{}", Uuid::new_v4().simple());
    cluster
        .temporary_database_from_template(name.as_str(), template.as_str())
        .map_err(|err| format!("create database from template: {err:?}"))
}

fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, String> {
    let migrations = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let hash = hash_directory(migrations).map_err(|err| format!("hash migrations: {err}"))?;
    let template = format!("{TEMPLATE_NAME_PREFIX}_{}", hash.get(..8).unwrap_or(&hash));

    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());
    let exists = cluster
        .database_exists(template.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(template.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        let url = cluster.connection().database_url(&template);
        let mut conn = PgConnection::establish(&url).map_err(|err| format!("connect: {err}"))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|err| format!("migrate template: {err}"))?;
    }
    Ok(template)
}

fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}
