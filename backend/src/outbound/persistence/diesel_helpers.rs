//! Shared loading helpers for the Diesel repositories.
//!
//! Posts and comments are stored with foreign keys only; these helpers load
//! the referenced users and groups in one query each and assemble domain
//! values.

use std::collections::{HashMap, HashSet};

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::RepositoryError;
use crate::domain::{Comment, Group, Post, User};

use super::diesel_basic_error_mapping::map_diesel_error;
use super::models::{CommentRow, GroupRow, PostRow, UserRow, comment_from_row, post_from_row};
use super::schema::{groups, users};

async fn load_users(
    conn: &mut AsyncPgConnection,
    ids: HashSet<Uuid>,
) -> Result<HashMap<Uuid, User>, RepositoryError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<UserRow> = users::table
        .filter(users::id.eq_any(ids.into_iter().collect::<Vec<_>>()))
        .select(UserRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    rows.into_iter()
        .map(|row| {
            let id = row.id;
            User::try_from(row).map(|user| (id, user))
        })
        .collect()
}

async fn load_groups(
    conn: &mut AsyncPgConnection,
    ids: HashSet<i64>,
) -> Result<HashMap<i64, Group>, RepositoryError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<GroupRow> = groups::table
        .filter(groups::id.eq_any(ids.into_iter().collect::<Vec<_>>()))
        .select(GroupRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    rows.into_iter()
        .map(|row| {
            let id = row.id;
            Group::try_from(row).map(|group| (id, group))
        })
        .collect()
}

fn missing_author(id: Uuid) -> RepositoryError {
    RepositoryError::query(format!("author {id} referenced but not found"))
}

/// Attach authors and groups to post rows, preserving row order.
pub(super) async fn hydrate_posts(
    conn: &mut AsyncPgConnection,
    rows: Vec<PostRow>,
) -> Result<Vec<Post>, RepositoryError> {
    let authors = load_users(conn, rows.iter().map(|row| row.author_id).collect()).await?;
    let groups = load_groups(conn, rows.iter().filter_map(|row| row.group_id).collect()).await?;

    rows.into_iter()
        .map(|row| {
            let author = authors
                .get(&row.author_id)
                .cloned()
                .ok_or_else(|| missing_author(row.author_id))?;
            // A group deleted concurrently reads as no group.
            let group = row.group_id.and_then(|id| groups.get(&id)).cloned();
            post_from_row(row, author, group)
        })
        .collect()
}

/// Attach authors to comment rows, preserving row order.
pub(super) async fn hydrate_comments(
    conn: &mut AsyncPgConnection,
    rows: Vec<CommentRow>,
) -> Result<Vec<Comment>, RepositoryError> {
    let authors = load_users(conn, rows.iter().map(|row| row.author_id).collect()).await?;
    rows.into_iter()
        .map(|row| {
            let author = authors
                .get(&row.author_id)
                .cloned()
                .ok_or_else(|| missing_author(row.author_id))?;
            comment_from_row(row, author)
        })
        .collect()
}

/// Hydrate exactly one post row.
pub(super) async fn hydrate_post(
    conn: &mut AsyncPgConnection,
    row: PostRow,
) -> Result<Post, RepositoryError> {
    hydrate_posts(conn, vec![row])
        .await?
        .pop()
        .ok_or_else(|| RepositoryError::query("post row vanished during hydration"))
}
