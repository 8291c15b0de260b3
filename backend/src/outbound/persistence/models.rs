//! Diesel row types and their conversion into domain values.
//!
//! Rows stay internal to the persistence adapter; the domain never sees them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::RepositoryError;
use crate::domain::{
    Comment, CommentId, CommentText, Group, GroupId, GroupSlug, ImageRef, Post, PostId, PostText,
    User, UserId, Username,
};

use super::schema::{comments, groups, posts, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct UserRow {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct GroupRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct PostRow {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
    pub image: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
pub(super) struct NewPostRow<'a> {
    pub text: &'a str,
    pub pub_date: DateTime<Utc>,
    pub author_id: Uuid,
    pub group_id: Option<i64>,
    pub image: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(super) struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub author_id: Uuid,
    pub text: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub(super) struct NewCommentRow<'a> {
    pub post_id: i64,
    pub author_id: Uuid,
    pub text: &'a str,
    pub created: DateTime<Utc>,
}

fn corrupt(what: &str, err: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::query(format!("stored {what} is invalid: {err}"))
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::new(row.username).map_err(|err| corrupt("username", err))?;
        Ok(User::new(UserId::from_uuid(row.id), username))
    }
}

impl TryFrom<GroupRow> for Group {
    type Error = RepositoryError;

    fn try_from(row: GroupRow) -> Result<Self, Self::Error> {
        let slug = GroupSlug::new(row.slug).map_err(|err| corrupt("group slug", err))?;
        Group::new(GroupId::new(row.id), row.title, slug, row.description)
            .map_err(|err| corrupt("group", err))
    }
}

/// Assemble a post from its row and already-converted relations.
pub(super) fn post_from_row(
    row: PostRow,
    author: User,
    group: Option<Group>,
) -> Result<Post, RepositoryError> {
    let text = PostText::new(row.text).map_err(|err| corrupt("post text", err))?;
    let image = row
        .image
        .map(ImageRef::new)
        .transpose()
        .map_err(|err| corrupt("post image", err))?;
    Ok(Post::new(
        PostId::new(row.id),
        text,
        row.pub_date,
        author,
        group,
        image,
    ))
}

/// Assemble a comment from its row and converted author.
pub(super) fn comment_from_row(row: CommentRow, author: User) -> Result<Comment, RepositoryError> {
    let text = CommentText::new(row.text).map_err(|err| corrupt("comment text", err))?;
    Ok(Comment::new(
        CommentId::new(row.id),
        PostId::new(row.post_id),
        text,
        author,
        row.created,
    ))
}
