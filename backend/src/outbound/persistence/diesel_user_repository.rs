//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use tracing::info;

use crate::domain::ports::{RepositoryError, UserRepository};
use crate::domain::{User, UserId, Username};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::models::UserRow;
use super::pool::DbPool;
use super::schema::{comments, follows, posts, users};

/// Diesel-backed user repository.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(*id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }

    async fn delete(&self, id: &UserId) -> Result<bool, RepositoryError> {
        let uuid = *id.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let own_posts = posts::table
                        .filter(posts::author_id.eq(uuid))
                        .select(posts::id);
                    diesel::delete(
                        comments::table.filter(
                            comments::author_id
                                .eq(uuid)
                                .or(comments::post_id.eq_any(own_posts)),
                        ),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(posts::table.filter(posts::author_id.eq(uuid)))
                        .execute(conn)
                        .await?;
                    diesel::delete(
                        follows::table.filter(
                            follows::user_id.eq(uuid).or(follows::author_id.eq(uuid)),
                        ),
                    )
                    .execute(conn)
                    .await?;
                    diesel::delete(users::table.find(uuid)).execute(conn).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        if removed > 0 {
            info!(user = %id, "user deleted");
        }
        Ok(removed > 0)
    }
}
