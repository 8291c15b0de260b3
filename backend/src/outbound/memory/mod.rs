//! In-process entity store.
//!
//! Backs every repository port and the login port with one mutex-guarded
//! state. It is selected when no database URL is configured and drives the
//! integration scenarios. Deletion follows the same cascade rules as the
//! relational schema: removing a user removes their posts, comments and
//! follow edges; removing a group leaves its posts without a group; removing
//! a post removes its comments.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;
use zeroize::Zeroizing;

use crate::domain::ports::{
    CommentRepository, FollowRepository, GroupRepository, LoginService, NewComment, NewPost,
    PostChanges, PostFilter, PostRepository, RepositoryError, UserRepository,
};
use crate::domain::{
    Comment, CommentId, CommentText, Error, FollowEdge, Group, GroupId, GroupSlug, ImageRef,
    LoginCredentials, Post, PostId, PostText, User, UserId, Username,
};

struct UserRecord {
    user: User,
    password: Zeroizing<String>,
}

#[derive(Clone)]
struct PostRecord {
    id: PostId,
    text: PostText,
    pub_date: DateTime<Utc>,
    author: UserId,
    group: Option<GroupId>,
    image: Option<ImageRef>,
}

struct CommentRecord {
    id: CommentId,
    post: PostId,
    author: UserId,
    text: CommentText,
    created: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    users: Vec<UserRecord>,
    groups: BTreeMap<GroupId, Group>,
    /// Insertion order; listing relies on it to break timestamp ties.
    posts: Vec<PostRecord>,
    comments: Vec<CommentRecord>,
    follows: HashSet<FollowEdge>,
    last_group_id: i64,
    last_post_id: i64,
    last_comment_id: i64,
}

impl State {
    fn user(&self, id: &UserId) -> Option<&User> {
        self.users
            .iter()
            .map(|record| &record.user)
            .find(|user| user.id() == id)
    }

    fn matches(&self, post: &PostRecord, filter: &PostFilter) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Group(group) => post.group == Some(*group),
            PostFilter::Author(author) => post.author == *author,
            PostFilter::FollowedBy(user) => self
                .follows
                .contains(&FollowEdge::new(*user, post.author)),
        }
    }

    fn hydrate_post(&self, record: &PostRecord) -> Result<Post, RepositoryError> {
        let author = self.user(&record.author).cloned().ok_or_else(|| {
            RepositoryError::query(format!("post {} has no author row", record.id))
        })?;
        let group = record
            .group
            .and_then(|id| self.groups.get(&id))
            .cloned();
        Ok(Post::new(
            record.id,
            record.text.clone(),
            record.pub_date,
            author,
            group,
            record.image.clone(),
        ))
    }

    fn hydrate_comment(&self, record: &CommentRecord) -> Result<Comment, RepositoryError> {
        let author = self.user(&record.author).cloned().ok_or_else(|| {
            RepositoryError::query(format!("comment {} has no author row", record.id))
        })?;
        Ok(Comment::new(
            record.id,
            record.post,
            record.text.clone(),
            author,
            record.created,
        ))
    }

    fn sorted_posts(&self, filter: &PostFilter) -> Vec<&PostRecord> {
        let mut posts: Vec<&PostRecord> = self
            .posts
            .iter()
            .filter(|post| self.matches(post, filter))
            .collect();
        // Stable sort keeps insertion order among equal timestamps.
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
        posts
    }
}

/// Entity store held in memory.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::query("in-memory store mutex poisoned"))
    }

    /// Add a user who can log in with `password`.
    pub fn register_user(&self, username: &str, password: &str) -> Result<User, Error> {
        let username =
            Username::new(username).map_err(|err| Error::invalid_request(err.to_string()))?;
        let mut state = self.lock()?;
        if state
            .users
            .iter()
            .any(|record| record.user.username() == &username)
        {
            return Err(Error::invalid_request(format!(
                "username {username} is already taken"
            )));
        }
        let user = User::new(UserId::random(), username);
        state.users.push(UserRecord {
            user: user.clone(),
            password: Zeroizing::new(password.to_owned()),
        });
        Ok(user)
    }

    /// Add a group with the next free identifier.
    pub fn insert_group(&self, title: &str, slug: &str, description: &str) -> Result<Group, Error> {
        let slug = GroupSlug::new(slug).map_err(|err| Error::invalid_request(err.to_string()))?;
        let mut state = self.lock()?;
        if state.groups.values().any(|group| group.slug() == &slug) {
            return Err(Error::invalid_request(format!("group {slug} already exists")));
        }
        state.last_group_id += 1;
        let group = Group::new(GroupId::new(state.last_group_id), title, slug, description)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        state.groups.insert(group.id(), group.clone());
        Ok(group)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.lock()?.user(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .lock()?
            .users
            .iter()
            .map(|record| &record.user)
            .find(|user| user.username() == username)
            .cloned())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, RepositoryError> {
        let mut state = self.lock()?;
        let before = state.users.len();
        state.users.retain(|record| record.user.id() != id);
        if state.users.len() == before {
            return Ok(false);
        }
        let removed_posts: HashSet<PostId> = state
            .posts
            .iter()
            .filter(|post| post.author == *id)
            .map(|post| post.id)
            .collect();
        state.posts.retain(|post| post.author != *id);
        state
            .comments
            .retain(|c| c.author != *id && !removed_posts.contains(&c.post));
        state
            .follows
            .retain(|edge| edge.user() != id && edge.author() != id);
        info!(user = %id, posts = removed_posts.len(), "user deleted");
        Ok(true)
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn find_by_id(&self, id: GroupId) -> Result<Option<Group>, RepositoryError> {
        Ok(self.lock()?.groups.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &GroupSlug) -> Result<Option<Group>, RepositoryError> {
        Ok(self
            .lock()?
            .groups
            .values()
            .find(|group| group.slug() == slug)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Group>, RepositoryError> {
        let mut groups: Vec<Group> = self.lock()?.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title().cmp(b.title()));
        Ok(groups)
    }

    async fn delete(&self, id: GroupId) -> Result<bool, RepositoryError> {
        let mut state = self.lock()?;
        if state.groups.remove(&id).is_none() {
            return Ok(false);
        }
        for post in state.posts.iter_mut().filter(|post| post.group == Some(id)) {
            post.group = None;
        }
        info!(group = %id, "group deleted");
        Ok(true)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn count(&self, filter: &PostFilter) -> Result<usize, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .posts
            .iter()
            .filter(|post| state.matches(post, filter))
            .count())
    }

    async fn list(
        &self,
        filter: &PostFilter,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Post>, RepositoryError> {
        let state = self.lock()?;
        state
            .sorted_posts(filter)
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|record| state.hydrate_post(record))
            .collect()
    }

    async fn find(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        let state = self.lock()?;
        state
            .posts
            .iter()
            .find(|post| post.id == id)
            .map(|record| state.hydrate_post(record))
            .transpose()
    }

    async fn insert(&self, post: &NewPost) -> Result<Post, RepositoryError> {
        let mut state = self.lock()?;
        if state.user(&post.author).is_none() {
            return Err(RepositoryError::query(format!(
                "author {} does not exist",
                post.author
            )));
        }
        state.last_post_id += 1;
        let record = PostRecord {
            id: PostId::new(state.last_post_id),
            text: post.text.clone(),
            pub_date: post.pub_date,
            author: post.author,
            group: post.group.filter(|id| state.groups.contains_key(id)),
            image: post.image.clone(),
        };
        let stored = state.hydrate_post(&record)?;
        state.posts.push(record);
        Ok(stored)
    }

    async fn update(
        &self,
        id: PostId,
        changes: &PostChanges,
    ) -> Result<Option<Post>, RepositoryError> {
        let mut state = self.lock()?;
        let group = changes.group.filter(|g| state.groups.contains_key(g));
        let Some(record) = state.posts.iter_mut().find(|post| post.id == id) else {
            return Ok(None);
        };
        record.text = changes.text.clone();
        record.group = group;
        if let Some(image) = &changes.image {
            record.image = Some(image.clone());
        }
        let updated = record.clone();
        state.hydrate_post(&updated).map(Some)
    }

    async fn delete(&self, id: PostId) -> Result<bool, RepositoryError> {
        let mut state = self.lock()?;
        let before = state.posts.len();
        state.posts.retain(|post| post.id != id);
        if state.posts.len() == before {
            return Ok(false);
        }
        state.comments.retain(|comment| comment.post != id);
        info!(post = %id, "post deleted");
        Ok(true)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list_for_post(&self, post: PostId) -> Result<Vec<Comment>, RepositoryError> {
        let state = self.lock()?;
        let mut comments: Vec<&CommentRecord> =
            state.comments.iter().filter(|c| c.post == post).collect();
        comments.sort_by_key(|c| c.created);
        comments
            .into_iter()
            .map(|record| state.hydrate_comment(record))
            .collect()
    }

    async fn insert(&self, comment: &NewComment) -> Result<Comment, RepositoryError> {
        let mut state = self.lock()?;
        if !state.posts.iter().any(|post| post.id == comment.post) {
            return Err(RepositoryError::query(format!(
                "post {} does not exist",
                comment.post
            )));
        }
        state.last_comment_id += 1;
        let record = CommentRecord {
            id: CommentId::new(state.last_comment_id),
            post: comment.post,
            author: comment.author,
            text: comment.text.clone(),
            created: comment.created,
        };
        let stored = state.hydrate_comment(&record)?;
        state.comments.push(record);
        Ok(stored)
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn insert(&self, edge: &FollowEdge) -> Result<bool, RepositoryError> {
        let mut state = self.lock()?;
        if edge.is_self_follow()
            || state.user(edge.user()).is_none()
            || state.user(edge.author()).is_none()
        {
            return Err(RepositoryError::query("follow edge violates constraints"));
        }
        Ok(state.follows.insert(*edge))
    }

    async fn delete(&self, edge: &FollowEdge) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.follows.remove(edge))
    }

    async fn exists(&self, edge: &FollowEdge) -> Result<bool, RepositoryError> {
        Ok(self.lock()?.follows.contains(edge))
    }

    async fn count_for_user(&self, user: &UserId) -> Result<usize, RepositoryError> {
        Ok(self
            .lock()?
            .follows
            .iter()
            .filter(|edge| edge.user() == user)
            .count())
    }
}

#[async_trait]
impl LoginService for InMemoryStore {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let state = self.lock()?;
        state
            .users
            .iter()
            .find(|record| {
                record.user.username().as_str() == credentials.username()
                    && record.password.as_str() == credentials.password()
            })
            .map(|record| *record.user.id())
            .ok_or_else(|| Error::unauthorized("invalid credentials"))
    }
}
