//! Request bodies for post and comment submissions.
//!
//! Bodies are JSON. Images travel inline as base64 so a submission stays a
//! single document. Fields the client has no say over, such as the author,
//! are not part of these types and are ignored if sent.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    CommentInput, Error, FieldErrors, Group, GroupId, IMAGE_FIELD, ImageUpload, Post, PostInput,
};

/// Inline image upload.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadForm {
    /// Client-side file name; sanitised before storage.
    pub file_name: String,
    /// Standard base64 of the file content.
    pub content_base64: String,
}

/// Body of `POST /create/` and `POST /posts/{id}/edit/`.
///
/// Omitting `group` on edit removes the post from its group.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: Option<i64>,
    #[serde(default)]
    pub image: Option<ImageUploadForm>,
}

impl PostForm {
    /// Decode the inline image and convert into a domain submission.
    pub fn into_input(self) -> Result<PostInput, Error> {
        let image = self
            .image
            .map(|upload| {
                STANDARD
                    .decode(upload.content_base64.as_bytes())
                    .map(|content| ImageUpload {
                        file_name: upload.file_name,
                        content,
                    })
                    .map_err(|err| {
                        Error::invalid_request("image content is not valid base64").with_details(
                            json!({ "field": IMAGE_FIELD, "reason": err.to_string() }),
                        )
                    })
            })
            .transpose()?;
        Ok(PostInput {
            text: self.text,
            group: self.group.map(GroupId::new),
            image,
        })
    }
}

/// Body of `POST /posts/{id}/comment/`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl From<CommentForm> for CommentInput {
    fn from(form: CommentForm) -> Self {
        Self { text: form.text }
    }
}

/// Values shown in a post form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostFormValues {
    pub text: String,
    pub group: Option<i64>,
    /// Currently stored image, when editing.
    pub image: Option<String>,
}

impl PostFormValues {
    fn from_post(post: &Post) -> Self {
        Self {
            text: post.text().as_str().to_owned(),
            group: post.group().map(|group| group.id().get()),
            image: post.image().map(|image| image.as_str().to_owned()),
        }
    }
}

/// A post form as rendered for display or re-display after errors.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostFormView {
    pub is_edit: bool,
    pub post_id: Option<i64>,
    pub values: PostFormValues,
    pub groups: Vec<Group>,
    #[schema(value_type = Object)]
    pub errors: FieldErrors,
}

impl PostFormView {
    /// Empty creation form.
    pub fn blank(groups: Vec<Group>) -> Self {
        Self {
            is_edit: false,
            post_id: None,
            values: PostFormValues::default(),
            groups,
            errors: FieldErrors::new(),
        }
    }

    /// Edit form pre-filled from `post`.
    pub fn for_post(post: &Post, groups: Vec<Group>) -> Self {
        Self {
            is_edit: true,
            post_id: Some(post.id().get()),
            values: PostFormValues::from_post(post),
            groups,
            errors: FieldErrors::new(),
        }
    }

    /// Echo a rejected submission back with its errors.
    pub fn rejected(mut self, submitted: &PostForm, errors: FieldErrors) -> Self {
        self.values.text.clone_from(&submitted.text);
        self.values.group = submitted.group;
        self.errors = errors;
        self
    }
}
