//! Typed form inputs and their validation.
//!
//! Each submission is a plain input struct. Validation is a pure function
//! returning [`FormOutcome::Valid`] with a draft ready for persistence, or
//! [`FormOutcome::Invalid`] with messages keyed by field name. The author of a
//! post or comment is never part of an input; services bind it from the
//! request context.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{
    COMMENT_TEXT_MAX, CommentText, CommentValidationError, Group, GroupId, PostText,
};

/// Field name of the post/comment body.
pub const TEXT_FIELD: &str = "text";
/// Field name of the post group selector.
pub const GROUP_FIELD: &str = "group";
/// Field name of the post image upload.
pub const IMAGE_FIELD: &str = "image";

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";
const EMPTY_FILE: &str = "The submitted file is empty.";
const INVALID_FILE_NAME: &str = "The submitted file name is not valid.";
const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// File extensions accepted for post images.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["gif", "png", "jpg", "jpeg", "webp", "bmp"];

/// Messages keyed by field name, in field-name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// No errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    /// Messages recorded for `field`.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// True when no field has errors.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names of fields with errors.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Result of validating a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome<T> {
    /// Input is acceptable.
    Valid(T),
    /// Input was rejected; nothing may be mutated.
    Invalid(FieldErrors),
}

impl<T> FormOutcome<T> {
    /// Map the valid payload.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FormOutcome<U> {
        match self {
            Self::Valid(value) => FormOutcome::Valid(f(value)),
            Self::Invalid(errors) => FormOutcome::Invalid(errors),
        }
    }

    fn from_parts(value: Option<T>, errors: FieldErrors) -> Self {
        match value {
            Some(value) if errors.is_empty() => Self::Valid(value),
            _ => Self::Invalid(errors),
        }
    }
}

/// Raw uploaded image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Client-supplied file name.
    pub file_name: String,
    /// File content.
    pub content: Vec<u8>,
}

/// Uploaded image that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidImage {
    file_name: String,
    content: Vec<u8>,
}

impl ValidImage {
    /// Sanitised file name (no directories, safe characters only).
    pub fn file_name(&self) -> &str {
        self.file_name.as_str()
    }

    /// File content.
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// Post create/edit submission.
///
/// A missing `group` means "no group": on edit it clears the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostInput {
    /// Body text.
    pub text: String,
    /// Selected group.
    pub group: Option<GroupId>,
    /// Optional new image.
    pub image: Option<ImageUpload>,
}

/// How the group selected in a [`PostInput`] resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupChoice {
    /// No group was selected.
    NotSelected,
    /// The selected group exists.
    Found(Group),
    /// The selected id matches no group.
    Unknown,
}

/// Post fields ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    /// Body text.
    pub text: PostText,
    /// Group to attach, `None` for no group.
    pub group: Option<Group>,
    /// New image to store, if one was uploaded.
    pub image: Option<ValidImage>,
}

/// Validate a post submission.
///
/// # Examples
/// ```
/// use blog::domain::{FormOutcome, GroupChoice, PostInput, validate_post};
///
/// let input = PostInput { text: "  ".into(), ..PostInput::default() };
/// match validate_post(&input, GroupChoice::NotSelected) {
///     FormOutcome::Invalid(errors) => assert_eq!(errors.get("text").len(), 1),
///     FormOutcome::Valid(_) => unreachable!("blank text is rejected"),
/// }
/// ```
pub fn validate_post(input: &PostInput, group: GroupChoice) -> FormOutcome<PostDraft> {
    let mut errors = FieldErrors::new();

    let text = PostText::new(input.text.as_str())
        .map_err(|_| errors.add(TEXT_FIELD, REQUIRED))
        .ok();

    let group = match group {
        GroupChoice::NotSelected => Some(None),
        GroupChoice::Found(group) => Some(Some(group)),
        GroupChoice::Unknown => {
            errors.add(GROUP_FIELD, INVALID_CHOICE);
            None
        }
    };

    let image = match &input.image {
        None => Some(None),
        Some(upload) => match validate_image(upload) {
            Ok(image) => Some(Some(image)),
            Err(message) => {
                errors.add(IMAGE_FIELD, message);
                None
            }
        },
    };

    let draft = match (text, group, image) {
        (Some(text), Some(group), Some(image)) => Some(PostDraft { text, group, image }),
        _ => None,
    };
    FormOutcome::from_parts(draft, errors)
}

/// Comment submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentInput {
    /// Body text.
    pub text: String,
}

/// Validate a comment submission.
pub fn validate_comment(input: &CommentInput) -> FormOutcome<CommentText> {
    let mut errors = FieldErrors::new();
    let text = match CommentText::new(input.text.as_str()) {
        Ok(text) => Some(text),
        Err(CommentValidationError::EmptyText) => {
            errors.add(TEXT_FIELD, REQUIRED);
            None
        }
        Err(CommentValidationError::TooLong { length, .. }) => {
            errors.add(
                TEXT_FIELD,
                format!(
                    "Ensure this value has at most {COMMENT_TEXT_MAX} characters (it has {length})."
                ),
            );
            None
        }
    };
    FormOutcome::from_parts(text, errors)
}

fn validate_image(upload: &ImageUpload) -> Result<ValidImage, String> {
    let file_name = sanitize_file_name(&upload.file_name).ok_or(INVALID_FILE_NAME)?;
    if upload.content.is_empty() {
        return Err(EMPTY_FILE.to_owned());
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(format!(
            "File extension “{extension}” is not allowed. Allowed extensions are: {}.",
            IMAGE_EXTENSIONS.join(", ")
        ));
    }
    if !has_image_signature(&upload.content) {
        return Err(INVALID_IMAGE.to_owned());
    }

    Ok(ValidImage {
        file_name,
        content: upload.content.clone(),
    })
}

/// Reduce a client file name to a safe base name.
///
/// Directory components are dropped, spaces become underscores and any
/// character other than alphanumerics, `-`, `_` and `.` is removed.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    let cleaned: String = base
        .chars()
        .map(|ch| if ch == ' ' { '_' } else { ch })
        .filter(|ch| ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.'))
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|ch| ch == '.') {
        None
    } else {
        Some(cleaned)
    }
}

fn has_image_signature(content: &[u8]) -> bool {
    const SIGNATURES: [&[u8]; 5] = [
        b"GIF87a",
        b"GIF89a",
        b"\x89PNG\r\n\x1a\n",
        b"\xFF\xD8\xFF",
        b"BM",
    ];
    let is_webp = content.get(..4) == Some(b"RIFF") && content.get(8..12) == Some(b"WEBP");
    is_webp || SIGNATURES.iter().any(|sig| content.starts_with(sig))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GroupSlug;
    use rstest::{fixture, rstest};

    const SMALL_GIF: &[u8] = b"\x47\x49\x46\x38\x39\x61\x02\x00\x01\x00\x80\x00\x00\x00\x00\x00\
\xFF\xFF\xFF\x21\xF9\x04\x00\x00\x00\x00\x00\x2C\x00\x00\x00\x00\x02\x00\x01\x00\x00\x02\x02\x0C\
\x0A\x00\x3B";

    #[fixture]
    fn group() -> Group {
        Group::new(
            GroupId::new(1),
            "Test group",
            GroupSlug::new("testSlug").expect("slug"),
            "Test description",
        )
        .expect("group")
    }

    fn post_input(text: &str) -> PostInput {
        PostInput {
            text: text.to_owned(),
            ..PostInput::default()
        }
    }

    fn expect_invalid<T: std::fmt::Debug>(outcome: FormOutcome<T>) -> FieldErrors {
        match outcome {
            FormOutcome::Invalid(errors) => errors,
            FormOutcome::Valid(value) => panic!("expected field errors, got {value:?}"),
        }
    }

    #[rstest]
    fn valid_post_without_group() {
        let outcome = validate_post(&post_input("Check"), GroupChoice::NotSelected);
        let FormOutcome::Valid(draft) = outcome else {
            panic!("expected a valid draft");
        };
        assert_eq!(draft.text.as_str(), "Check");
        assert_eq!(draft.group, None);
        assert_eq!(draft.image, None);
    }

    #[rstest]
    fn valid_post_with_group_and_image(group: Group) {
        let input = PostInput {
            text: "Image post".to_owned(),
            group: Some(group.id()),
            image: Some(ImageUpload {
                file_name: "small.gif".to_owned(),
                content: SMALL_GIF.to_vec(),
            }),
        };
        let FormOutcome::Valid(draft) = validate_post(&input, GroupChoice::Found(group.clone()))
        else {
            panic!("expected a valid draft");
        };
        assert_eq!(draft.group, Some(group));
        assert_eq!(draft.image.as_ref().map(ValidImage::file_name), Some("small.gif"));
    }

    #[rstest]
    fn collects_errors_for_every_field() {
        let input = PostInput {
            text: String::new(),
            group: Some(GroupId::new(99)),
            image: Some(ImageUpload {
                file_name: "notes.txt".to_owned(),
                content: b"hello".to_vec(),
            }),
        };
        let errors = expect_invalid(validate_post(&input, GroupChoice::Unknown));
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec![GROUP_FIELD, IMAGE_FIELD, TEXT_FIELD]
        );
        assert_eq!(errors.get(TEXT_FIELD), [REQUIRED.to_owned()]);
    }

    #[rstest]
    #[case("fake.gif", b"not really a gif".as_slice(), INVALID_IMAGE)]
    #[case("empty.png", b"".as_slice(), EMPTY_FILE)]
    #[case("../", SMALL_GIF, INVALID_FILE_NAME)]
    fn rejects_bad_images(#[case] name: &str, #[case] content: &[u8], #[case] message: &str) {
        let input = PostInput {
            text: "text".to_owned(),
            group: None,
            image: Some(ImageUpload {
                file_name: name.to_owned(),
                content: content.to_vec(),
            }),
        };
        let errors = expect_invalid(validate_post(&input, GroupChoice::NotSelected));
        assert_eq!(errors.get(IMAGE_FIELD), [message.to_owned()]);
    }

    #[rstest]
    #[case("small.gif", Some("small.gif"))]
    #[case("C:\\Users\\me\\my cat.png", Some("my_cat.png"))]
    #[case("../../etc/passwd", Some("passwd"))]
    #[case("我的.jpg", Some("我的.jpg"))]
    #[case("..", None)]
    #[case("   ", None)]
    fn sanitises_file_names(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(sanitize_file_name(raw).as_deref(), expected);
    }

    #[rstest]
    fn comment_within_limit_is_valid() {
        let outcome = validate_comment(&CommentInput {
            text: "Comment".to_owned(),
        });
        assert_eq!(outcome.map(|text| text.as_str().to_owned()), FormOutcome::Valid("Comment".to_owned()));
    }

    #[rstest]
    fn overlong_comment_reports_length() {
        let errors = expect_invalid(validate_comment(&CommentInput {
            text: "x".repeat(300),
        }));
        assert_eq!(
            errors.get(TEXT_FIELD),
            ["Ensure this value has at most 255 characters (it has 300).".to_owned()]
        );
    }

    #[rstest]
    fn blank_comment_is_required() {
        let errors = expect_invalid(validate_comment(&CommentInput::default()));
        assert_eq!(errors.get(TEXT_FIELD), [REQUIRED.to_owned()]);
    }
}
