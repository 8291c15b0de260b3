//! Diesel-backed `LoginService` adapter.
//!
//! Users are provisioned outside this service; it only checks a submitted
//! password against the Argon2 PHC string stored in `users.password_hash`.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::{LoginService, RepositoryError};
use crate::domain::{Error, LoginCredentials, UserId};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::users;

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Authenticates against the `users` table.
#[derive(Clone)]
pub struct DieselLoginService {
    pool: DbPool,
}

impl DieselLoginService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn stored_hash(&self, username: &str) -> Result<Option<(Uuid, String)>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::username.eq(username))
            .select((users::id, users::password_hash))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }
}

/// Check `password` against a PHC-formatted Argon2 hash.
///
/// A malformed stored hash never matches.
fn password_matches(password: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            warn!(error = %err, "stored password hash is malformed");
            false
        }
    }
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Some((id, phc)) = self.stored_hash(credentials.username()).await? else {
            debug!("login for unknown username");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if password_matches(credentials.password(), &phc) {
            Ok(UserId::from_uuid(id))
        } else {
            Err(Error::unauthorized(INVALID_CREDENTIALS))
        }
    }
}
