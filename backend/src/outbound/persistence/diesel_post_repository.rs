//! PostgreSQL-backed `PostRepository`.
//!
//! Listing orders by publication date descending, then by id ascending so
//! posts sharing a timestamp keep their insertion order.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use tracing::{debug, info};

use crate::domain::ports::{NewPost, PostChanges, PostFilter, PostRepository, RepositoryError};
use crate::domain::{ImageRef, Post, PostId};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_helpers::{hydrate_post, hydrate_posts};
use super::models::{NewPostRow, PostRow};
use super::pool::DbPool;
use super::schema::{comments, follows, posts};

/// Diesel-backed post repository.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered(filter: &PostFilter) -> posts::BoxedQuery<'static, Pg> {
    let query = posts::table.into_boxed();
    match *filter {
        PostFilter::All => query,
        PostFilter::Group(group) => query.filter(posts::group_id.eq(group.get())),
        PostFilter::Author(author) => query.filter(posts::author_id.eq(*author.as_uuid())),
        PostFilter::FollowedBy(follower) => query.filter(
            posts::author_id.eq_any(
                follows::table
                    .filter(follows::user_id.eq(*follower.as_uuid()))
                    .select(follows::author_id),
            ),
        ),
    }
}

fn to_i64(value: usize, what: &str) -> Result<i64, RepositoryError> {
    i64::try_from(value).map_err(|_| RepositoryError::query(format!("{what} out of range")))
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn count(&self, filter: &PostFilter) -> Result<usize, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        usize::try_from(count).map_err(|err| RepositoryError::query(err.to_string()))
    }

    async fn list(
        &self,
        filter: &PostFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Post>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PostRow> = filtered(filter)
            .order_by((posts::pub_date.desc(), posts::id.asc()))
            .offset(to_i64(offset, "offset")?)
            .limit(to_i64(limit, "limit")?)
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        debug!(?filter, offset, limit, rows = rows.len(), "posts listed");
        hydrate_posts(&mut conn, rows).await
    }

    async fn find(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PostRow> = posts::table
            .find(id.get())
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        match row {
            Some(row) => hydrate_post(&mut conn, row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn insert(&self, post: &NewPost) -> Result<Post, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: PostRow = diesel::insert_into(posts::table)
            .values(NewPostRow {
                text: post.text.as_str(),
                pub_date: post.pub_date,
                author_id: *post.author.as_uuid(),
                group_id: post.group.map(|group| group.get()),
                image: post.image.as_ref().map(ImageRef::as_str),
            })
            .returning(PostRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        info!(post = row.id, author = %post.author, "post created");
        hydrate_post(&mut conn, row).await
    }

    async fn update(
        &self,
        id: PostId,
        changes: &PostChanges,
    ) -> Result<Option<Post>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let target = posts::table.find(id.get());
        let text = posts::text.eq(changes.text.as_str());
        let group = posts::group_id.eq(changes.group.map(|group| group.get()));
        let updated = match changes.image.as_ref() {
            Some(image) => diesel::update(target)
                .set((text, group, posts::image.eq(Some(image.as_str()))))
                .returning(PostRow::as_returning())
                .get_result(&mut conn)
                .await,
            None => diesel::update(target)
                .set((text, group))
                .returning(PostRow::as_returning())
                .get_result(&mut conn)
                .await,
        }
        .optional()
        .map_err(map_diesel_error)?;

        match updated {
            Some(row) => {
                info!(post = row.id, "post updated");
                hydrate_post(&mut conn, row).await.map(Some)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: PostId) -> Result<bool, RepositoryError> {
        let raw = id.get();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    diesel::delete(comments::table.filter(comments::post_id.eq(raw)))
                        .execute(conn)
                        .await?;
                    diesel::delete(posts::table.find(raw)).execute(conn).await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        if removed > 0 {
            info!(post = raw, "post deleted");
        }
        Ok(removed > 0)
    }
}
