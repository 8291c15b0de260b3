//! Port interface for storing uploaded post images.
use async_trait::async_trait;

use crate::domain::{ImageRef, ValidImage};

use super::define_port_error;

define_port_error! {
    /// Errors raised while storing an image.
    pub enum ImageStorageError {
        /// The media directory could not be written.
        Io { message: String } => "image storage failed: {message}",
        /// No free file name could be chosen.
        NameExhausted { file_name: String } => "no free name for upload {file_name}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Persist `image` under the post image directory and return its
    /// reference. An existing file is never overwritten.
    async fn store(&self, image: &ValidImage) -> Result<ImageRef, ImageStorageError>;

    /// Delete a stored image. A missing file is not an error.
    async fn remove(&self, image: &ImageRef) -> Result<(), ImageStorageError>;
}
