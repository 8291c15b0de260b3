//! PostgreSQL-backed `GroupRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use tracing::info;

use crate::domain::ports::{GroupRepository, RepositoryError};
use crate::domain::{Group, GroupId, GroupSlug};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::models::GroupRow;
use super::pool::DbPool;
use super::schema::{groups, posts};

/// Diesel-backed group repository.
#[derive(Clone)]
pub struct DieselGroupRepository {
    pool: DbPool,
}

impl DieselGroupRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for DieselGroupRepository {
    async fn find_by_id(&self, id: GroupId) -> Result<Option<Group>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<GroupRow> = groups::table
            .find(id.get())
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Group::try_from).transpose()
    }

    async fn find_by_slug(&self, slug: &GroupSlug) -> Result<Option<Group>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<GroupRow> = groups::table
            .filter(groups::slug.eq(slug.as_str()))
            .select(GroupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Group::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Group>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<GroupRow> = groups::table
            .order_by((groups::title, groups::id))
            .select(GroupRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(Group::try_from).collect()
    }

    async fn delete(&self, id: GroupId) -> Result<bool, RepositoryError> {
        let raw = id.get();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    diesel::update(posts::table.filter(posts::group_id.eq(raw)))
                        .set(posts::group_id.eq(None::<i64>))
                        .execute(conn)
                        .await?;
                    diesel::delete(groups::table.find(raw)).execute(conn).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        if removed > 0 {
            info!(group = %id, "group deleted");
        }
        Ok(removed > 0)
    }
}
