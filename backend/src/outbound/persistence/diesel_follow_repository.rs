//! PostgreSQL-backed `FollowRepository`.
//!
//! Duplicate edges are absorbed by `ON CONFLICT DO NOTHING` against the
//! `(user_id, author_id)` unique constraint.

use async_trait::async_trait;
use diesel::dsl::{count_star, exists};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{FollowRepository, RepositoryError};
use crate::domain::{FollowEdge, UserId};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::follows;

/// Diesel-backed follow repository.
#[derive(Clone)]
pub struct DieselFollowRepository {
    pool: DbPool,
}

impl DieselFollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for DieselFollowRepository {
    async fn insert(&self, edge: &FollowEdge) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(follows::table)
            .values((
                follows::user_id.eq(*edge.user().as_uuid()),
                follows::author_id.eq(*edge.author().as_uuid()),
            ))
            .on_conflict((follows::user_id, follows::author_id))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted > 0)
    }

    async fn delete(&self, edge: &FollowEdge) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            follows::table
                .filter(follows::user_id.eq(*edge.user().as_uuid()))
                .filter(follows::author_id.eq(*edge.author().as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn exists(&self, edge: &FollowEdge) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            follows::table
                .filter(follows::user_id.eq(*edge.user().as_uuid()))
                .filter(follows::author_id.eq(*edge.author().as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn count_for_user(&self, user: &UserId) -> Result<usize, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = follows::table
            .filter(follows::user_id.eq(*user.as_uuid()))
            .select(count_star())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        usize::try_from(count).map_err(|err| RepositoryError::query(err.to_string()))
    }
}
