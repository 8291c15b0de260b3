//! Post and comment use-cases.
//!
//! The author of anything created here is the authenticated viewer passed in
//! by the caller. Input structs carry no author field.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use super::forms::{
    CommentInput, FormOutcome, GroupChoice, PostDraft, PostInput, validate_comment, validate_post,
};
use super::ports::{
    CommentRepository, GroupRepository, ImageStorage, ImageStorageError, NewComment, NewPost,
    PostChanges, PostFilter, PostRepository, UserRepository,
};
use super::{Comment, Error, FieldErrors, Group, ImageRef, Post, PostId, UserId, can_edit};

/// Result of an edit submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The post was changed.
    Updated(Post),
    /// The viewer is not the author; nothing changed.
    NotPermitted,
    /// The submission failed validation; nothing changed.
    Invalid(FieldErrors),
}

/// Whether the viewer may open the edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAccess {
    Permitted(Post),
    NotPermitted,
}

/// Everything shown on a post's page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetail {
    pub post: Post,
    /// Oldest first.
    pub comments: Vec<Comment>,
    /// Number of posts by the same author.
    pub author_post_count: usize,
    pub can_edit: bool,
}

/// Post and comment use-cases over the entity store.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
    images: Arc<dyn ImageStorage>,
    clock: Arc<dyn Clock>,
}

impl PostService {
    /// Create the service.
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        groups: Arc<dyn GroupRepository>,
        users: Arc<dyn UserRepository>,
        images: Arc<dyn ImageStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            posts,
            comments,
            groups,
            users,
            images,
            clock,
        }
    }

    /// Groups offered as choices on the post form.
    pub async fn group_choices(&self) -> Result<Vec<Group>, Error> {
        Ok(self.groups.list().await?)
    }

    /// Create a post authored by `viewer`.
    pub async fn create(
        &self,
        viewer: &UserId,
        input: &PostInput,
    ) -> Result<FormOutcome<Post>, Error> {
        let draft = match self.validate(input).await? {
            FormOutcome::Valid(draft) => draft,
            FormOutcome::Invalid(errors) => return Ok(FormOutcome::Invalid(errors)),
        };
        // The viewer must still exist; a stale session is treated as logged out.
        self.users
            .find_by_id(viewer)
            .await?
            .ok_or_else(|| Error::unauthorized("session user no longer exists"))?;

        let image = self.store_image(&draft).await?;
        let inserted = self
            .posts
            .insert(&NewPost {
                text: draft.text,
                pub_date: self.clock.utc(),
                author: *viewer,
                group: draft.group.as_ref().map(Group::id),
                image: image.clone(),
            })
            .await;
        let post = match inserted {
            Ok(post) => post,
            Err(err) => {
                self.discard_image(image.as_ref()).await;
                return Err(err.into());
            }
        };
        info!(post = %post.id(), author = %viewer, "post created");
        Ok(FormOutcome::Valid(post))
    }

    /// Load a post for editing if `viewer` is its author.
    pub async fn edit_access(&self, viewer: &UserId, id: PostId) -> Result<EditAccess, Error> {
        let post = self.find(id).await?;
        if can_edit(&post, Some(viewer)) {
            Ok(EditAccess::Permitted(post))
        } else {
            Ok(EditAccess::NotPermitted)
        }
    }

    /// Apply an edit submitted by `viewer`.
    ///
    /// A submission without a group clears the post's group. A submission
    /// without an image keeps the stored one.
    pub async fn edit(
        &self,
        viewer: &UserId,
        id: PostId,
        input: &PostInput,
    ) -> Result<EditOutcome, Error> {
        let post = self.find(id).await?;
        if !can_edit(&post, Some(viewer)) {
            debug!(post = %id, viewer = %viewer, "edit refused for non-author");
            return Ok(EditOutcome::NotPermitted);
        }
        let draft = match self.validate(input).await? {
            FormOutcome::Valid(draft) => draft,
            FormOutcome::Invalid(errors) => return Ok(EditOutcome::Invalid(errors)),
        };

        let image = self.store_image(&draft).await?;
        let changes = PostChanges {
            text: draft.text,
            group: draft.group.as_ref().map(Group::id),
            image: image.clone(),
        };
        let updated = match self.posts.update(id, &changes).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                self.discard_image(image.as_ref()).await;
                return Err(post_not_found(id));
            }
            Err(err) => {
                self.discard_image(image.as_ref()).await;
                return Err(err.into());
            }
        };
        info!(post = %id, "post edited");
        Ok(EditOutcome::Updated(updated))
    }

    /// Post page contents as seen by `viewer`.
    pub async fn detail(&self, viewer: Option<&UserId>, id: PostId) -> Result<PostDetail, Error> {
        let post = self.find(id).await?;
        let comments = self.comments.list_for_post(id).await?;
        let author_post_count = self
            .posts
            .count(&PostFilter::Author(*post.author().id()))
            .await?;
        let can_edit = can_edit(&post, viewer);
        Ok(PostDetail {
            post,
            comments,
            author_post_count,
            can_edit,
        })
    }

    /// Add a comment by `viewer` to post `id`.
    pub async fn add_comment(
        &self,
        viewer: &UserId,
        id: PostId,
        input: &CommentInput,
    ) -> Result<FormOutcome<Comment>, Error> {
        let post = self.find(id).await?;
        let text = match validate_comment(input) {
            FormOutcome::Valid(text) => text,
            FormOutcome::Invalid(errors) => {
                debug!(post = %id, "comment rejected");
                return Ok(FormOutcome::Invalid(errors));
            }
        };
        let comment = self
            .comments
            .insert(&NewComment {
                post: post.id(),
                author: *viewer,
                text,
                created: self.clock.utc(),
            })
            .await?;
        info!(post = %id, comment = %comment.id(), "comment added");
        Ok(FormOutcome::Valid(comment))
    }

    async fn find(&self, id: PostId) -> Result<Post, Error> {
        self.posts
            .find(id)
            .await?
            .ok_or_else(|| post_not_found(id))
    }

    async fn validate(&self, input: &PostInput) -> Result<FormOutcome<PostDraft>, Error> {
        let choice = match input.group {
            None => GroupChoice::NotSelected,
            Some(id) => match self.groups.find_by_id(id).await? {
                Some(group) => GroupChoice::Found(group),
                None => GroupChoice::Unknown,
            },
        };
        Ok(validate_post(input, choice))
    }

    async fn store_image(&self, draft: &PostDraft) -> Result<Option<ImageRef>, Error> {
        match &draft.image {
            None => Ok(None),
            Some(image) => self
                .images
                .store(image)
                .await
                .map(Some)
                .map_err(map_storage_error),
        }
    }

    /// Remove an upload whose post was never written.
    async fn discard_image(&self, image: Option<&ImageRef>) {
        let Some(image) = image else {
            return;
        };
        if let Err(err) = self.images.remove(image).await {
            warn!(image = %image, error = %err, "failed to remove orphaned upload");
        }
    }
}

fn post_not_found(id: PostId) -> Error {
    Error::not_found(format!("post {id} does not exist")).with_details(json!({ "id": id.get() }))
}

fn map_storage_error(err: ImageStorageError) -> Error {
    Error::internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockCommentRepository, MockGroupRepository, MockImageStorage, MockPostRepository,
        MockUserRepository, RepositoryError,
    };
    use crate::domain::{
        CommentId, CommentText, ErrorCode, GroupId, GroupSlug, ImageUpload, PostText, User,
        Username,
    };
    use chrono::{TimeZone, Utc};
    use mockable::MockClock;
    use mockall::predicate::eq;
    use rstest::{fixture, rstest};

    struct Mocks {
        posts: MockPostRepository,
        comments: MockCommentRepository,
        groups: MockGroupRepository,
        users: MockUserRepository,
        images: MockImageStorage,
    }

    #[fixture]
    fn mocks() -> Mocks {
        Mocks {
            posts: MockPostRepository::new(),
            comments: MockCommentRepository::new(),
            groups: MockGroupRepository::new(),
            users: MockUserRepository::new(),
            images: MockImageStorage::new(),
        }
    }

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("timestamp")
    }

    fn service(mocks: Mocks) -> PostService {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(now);
        PostService::new(
            Arc::new(mocks.posts),
            Arc::new(mocks.comments),
            Arc::new(mocks.groups),
            Arc::new(mocks.users),
            Arc::new(mocks.images),
            Arc::new(clock),
        )
    }

    fn user(name: &str) -> User {
        User::new(UserId::random(), Username::new(name).expect("username"))
    }

    fn group() -> Group {
        Group::new(
            GroupId::new(1),
            "Test group",
            GroupSlug::new("testSlug").expect("slug"),
            "",
        )
        .expect("group")
    }

    fn post(author: &User, group: Option<Group>) -> Post {
        Post::new(
            PostId::new(1),
            PostText::new("Test post").expect("text"),
            now(),
            author.clone(),
            group,
            None,
        )
    }

    #[rstest]
    #[tokio::test]
    async fn create_binds_viewer_as_author(mut mocks: Mocks) {
        let author = user("auth");
        let stored = post(&author, Some(group()));
        let viewer = *author.id();
        let found = author.clone();
        mocks
            .groups
            .expect_find_by_id()
            .with(eq(GroupId::new(1)))
            .return_once(|_| Ok(Some(group())));
        mocks
            .users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(found)));
        mocks
            .posts
            .expect_insert()
            .withf(move |new| {
                new.author == viewer
                    && new.group == Some(GroupId::new(1))
                    && new.pub_date == now()
                    && new.text.as_str() == "Test post"
            })
            .return_once(move |_| Ok(stored));

        let input = PostInput {
            text: "Test post".to_owned(),
            group: Some(GroupId::new(1)),
            image: None,
        };
        let outcome = service(mocks).create(&viewer, &input).await.expect("create");
        assert!(matches!(outcome, FormOutcome::Valid(post) if post.author() == &author));
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_create_stores_nothing(mut mocks: Mocks) {
        mocks.posts.expect_insert().never();
        mocks.images.expect_store().never();
        let outcome = service(mocks)
            .create(&UserId::random(), &PostInput::default())
            .await
            .expect("validation is not an error");
        assert!(matches!(outcome, FormOutcome::Invalid(errors) if !errors.get("text").is_empty()));
    }

    #[rstest]
    #[tokio::test]
    async fn create_stores_uploaded_image(mut mocks: Mocks) {
        let author = user("auth");
        let viewer = *author.id();
        let stored = post(&author, None);
        mocks
            .users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(author)));
        mocks
            .images
            .expect_store()
            .withf(|image| image.file_name() == "small.gif")
            .return_once(|_| Ok(ImageRef::in_post_dir("small.gif").expect("image ref")));
        mocks
            .posts
            .expect_insert()
            .withf(|new| new.image.as_ref().map(ImageRef::as_str) == Some("posts/small.gif"))
            .return_once(move |_| Ok(stored));

        let input = PostInput {
            text: "With image".to_owned(),
            group: None,
            image: Some(ImageUpload {
                file_name: "small.gif".to_owned(),
                content: b"GIF89a\x01\x00\x01\x00".to_vec(),
            }),
        };
        let outcome = service(mocks).create(&viewer, &input).await.expect("create");
        assert!(matches!(outcome, FormOutcome::Valid(_)));
    }

    fn gif_input(text: &str) -> PostInput {
        PostInput {
            text: text.to_owned(),
            group: None,
            image: Some(ImageUpload {
                file_name: "small.gif".to_owned(),
                content: b"GIF89a\x01\x00\x01\x00".to_vec(),
            }),
        }
    }

    fn expect_stored_gif(images: &mut MockImageStorage) {
        images
            .expect_store()
            .return_once(|_| Ok(ImageRef::in_post_dir("small.gif").expect("image ref")));
        images
            .expect_remove()
            .withf(|image| image.as_str() == "posts/small.gif")
            .times(1)
            .return_once(|_| Ok(()));
    }

    #[rstest]
    #[tokio::test]
    async fn failed_insert_removes_the_upload(mut mocks: Mocks) {
        let author = user("auth");
        let viewer = *author.id();
        mocks
            .users
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(author)));
        expect_stored_gif(&mut mocks.images);
        mocks
            .posts
            .expect_insert()
            .return_once(|_| Err(RepositoryError::query("insert failed")));

        let err = service(mocks)
            .create(&viewer, &gif_input("With image"))
            .await
            .expect_err("insert failure surfaces");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_update_removes_the_new_upload(mut mocks: Mocks) {
        let author = user("auth");
        let viewer = *author.id();
        let existing = post(&author, None);
        mocks
            .posts
            .expect_find()
            .return_once(move |_| Ok(Some(existing)));
        expect_stored_gif(&mut mocks.images);
        mocks
            .posts
            .expect_update()
            .return_once(|_, _| Err(RepositoryError::connection("store down")));

        let err = service(mocks)
            .edit(&viewer, PostId::new(1), &gif_input("Changed"))
            .await
            .expect_err("update failure surfaces");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[rstest]
    #[tokio::test]
    async fn non_author_edit_is_silently_refused(mut mocks: Mocks) {
        let author = user("auth");
        let existing = post(&author, Some(group()));
        mocks
            .posts
            .expect_find()
            .return_once(move |_| Ok(Some(existing)));
        mocks.posts.expect_update().never();

        let input = PostInput {
            text: "Changed".to_owned(),
            ..PostInput::default()
        };
        let outcome = service(mocks)
            .edit(&UserId::random(), PostId::new(1), &input)
            .await
            .expect("no error");
        assert_eq!(outcome, EditOutcome::NotPermitted);
    }

    #[rstest]
    #[tokio::test]
    async fn author_edit_without_group_clears_it(mut mocks: Mocks) {
        let author = user("auth");
        let viewer = *author.id();
        let existing = post(&author, Some(group()));
        let updated = Post::new(
            PostId::new(1),
            PostText::new("Changed").expect("text"),
            now(),
            author,
            None,
            None,
        );
        mocks
            .posts
            .expect_find()
            .return_once(move |_| Ok(Some(existing)));
        mocks
            .posts
            .expect_update()
            .withf(|id, changes| {
                *id == PostId::new(1) && changes.group.is_none() && changes.image.is_none()
            })
            .return_once(move |_, _| Ok(Some(updated)));

        let input = PostInput {
            text: "Changed".to_owned(),
            ..PostInput::default()
        };
        let outcome = service(mocks)
            .edit(&viewer, PostId::new(1), &input)
            .await
            .expect("edit");
        assert!(matches!(outcome, EditOutcome::Updated(post) if post.group().is_none()));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_post_is_not_found(mut mocks: Mocks) {
        mocks.posts.expect_find().return_once(|_| Ok(None));
        let err = service(mocks)
            .detail(None, PostId::new(42))
            .await
            .expect_err("missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn detail_flags_author_and_counts_posts(mut mocks: Mocks) {
        let author = user("auth");
        let viewer = *author.id();
        let existing = post(&author, None);
        let comment = Comment::new(
            CommentId::new(1),
            PostId::new(1),
            CommentText::new("Nice").expect("text"),
            user("reader"),
            now(),
        );
        mocks
            .posts
            .expect_find()
            .return_once(move |_| Ok(Some(existing)));
        mocks
            .posts
            .expect_count()
            .with(eq(PostFilter::Author(viewer)))
            .return_once(|_| Ok(3));
        let listed = comment.clone();
        mocks
            .comments
            .expect_list_for_post()
            .return_once(move |_| Ok(vec![listed]));

        let detail = service(mocks)
            .detail(Some(&viewer), PostId::new(1))
            .await
            .expect("detail");
        assert!(detail.can_edit);
        assert_eq!(detail.author_post_count, 3);
        assert_eq!(detail.comments, vec![comment]);
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_comment_is_not_stored(mut mocks: Mocks) {
        let author = user("auth");
        let existing = post(&author, None);
        mocks
            .posts
            .expect_find()
            .return_once(move |_| Ok(Some(existing)));
        mocks.comments.expect_insert().never();

        let outcome = service(mocks)
            .add_comment(&UserId::random(), PostId::new(1), &CommentInput::default())
            .await
            .expect("no error");
        assert!(matches!(outcome, FormOutcome::Invalid(_)));
    }
}
