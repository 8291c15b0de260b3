//! PostgreSQL-backed `CommentRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CommentRepository, NewComment, RepositoryError};
use crate::domain::{Comment, PostId};

use super::diesel_basic_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_helpers::hydrate_comments;
use super::models::{CommentRow, NewCommentRow};
use super::pool::DbPool;
use super::schema::comments;

/// Diesel-backed comment repository.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn list_for_post(&self, post: PostId) -> Result<Vec<Comment>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CommentRow> = comments::table
            .filter(comments::post_id.eq(post.get()))
            .order_by((comments::created.asc(), comments::id.asc()))
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        hydrate_comments(&mut conn, rows).await
    }

    async fn insert(&self, comment: &NewComment) -> Result<Comment, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: CommentRow = diesel::insert_into(comments::table)
            .values(NewCommentRow {
                post_id: comment.post.get(),
                author_id: *comment.author.as_uuid(),
                text: comment.text.as_str(),
                created: comment.created,
            })
            .returning(CommentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        hydrate_comments(&mut conn, vec![row])
            .await?
            .pop()
            .ok_or_else(|| RepositoryError::query("comment row vanished during hydration"))
    }
}
