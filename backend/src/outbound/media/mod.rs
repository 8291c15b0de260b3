//! Filesystem storage for uploaded post images.
//!
//! Files are written below the media root through a capability handle, so a
//! crafted name can never escape it. Existing files are never overwritten: a
//! colliding name gets a random suffix before the extension.

use std::io::{self, Write as _};
use std::path::Path;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use rand::Rng as _;
use rand::distributions::Alphanumeric;
use tracing::{debug, info, warn};

use crate::domain::ports::{ImageStorage, ImageStorageError};
use crate::domain::{ImageRef, POST_IMAGE_DIR, ValidImage};

/// Length of the suffix added to colliding names.
const SUFFIX_LEN: usize = 7;
/// Attempts before giving up on finding a free name.
const MAX_ATTEMPTS: usize = 16;

/// [`ImageStorage`] over a media directory.
pub struct CapStdImageStorage {
    root: Dir,
}

impl CapStdImageStorage {
    /// Open (creating if needed) the media root at `path`.
    pub fn open(path: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let root = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self { root })
    }
}

fn candidate_name(file_name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return file_name.to_owned();
    }
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{suffix}.{ext}"),
        None => format!("{file_name}_{suffix}"),
    }
}

fn write_new(dir: &Dir, file_name: &str, content: &[u8]) -> Result<String, ImageStorageError> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    for attempt in 0..MAX_ATTEMPTS {
        let name = candidate_name(file_name, attempt);
        match dir.open_with(&name, &options) {
            Ok(mut file) => {
                let written = file.write_all(content).and_then(|()| file.sync_all());
                drop(file);
                return match written {
                    Ok(()) => Ok(name),
                    Err(err) => {
                        discard_partial(dir, &name);
                        Err(ImageStorageError::io(err.to_string()))
                    }
                };
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                debug!(name, "image name taken; retrying with suffix");
            }
            Err(err) => return Err(ImageStorageError::io(err.to_string())),
        }
    }
    Err(ImageStorageError::name_exhausted(file_name))
}

fn discard_partial(dir: &Dir, name: &str) {
    if let Err(err) = dir.remove_file(name) {
        warn!(name, error = %err, "failed to remove partial upload");
    }
}

fn remove_existing(dir: &Dir, path: &str) -> Result<(), ImageStorageError> {
    match dir.remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(ImageStorageError::io(err.to_string())),
    }
}

#[async_trait]
impl ImageStorage for CapStdImageStorage {
    async fn store(&self, image: &ValidImage) -> Result<ImageRef, ImageStorageError> {
        let root = self
            .root
            .try_clone()
            .map_err(|err| ImageStorageError::io(err.to_string()))?;
        let file_name = image.file_name().to_owned();
        let content = image.content().to_vec();

        let stored = tokio::task::spawn_blocking(move || {
            root.create_dir_all(POST_IMAGE_DIR)
                .and_then(|()| root.open_dir(POST_IMAGE_DIR))
                .map_err(|err| ImageStorageError::io(err.to_string()))
                .and_then(|dir| write_new(&dir, &file_name, &content))
        })
        .await
        .map_err(|err| ImageStorageError::io(format!("storage task failed: {err}")))??;

        let image_ref =
            ImageRef::in_post_dir(&stored).map_err(|err| ImageStorageError::io(err.to_string()))?;
        info!(image = %image_ref, "image stored");
        Ok(image_ref)
    }

    async fn remove(&self, image: &ImageRef) -> Result<(), ImageStorageError> {
        let root = self
            .root
            .try_clone()
            .map_err(|err| ImageStorageError::io(err.to_string()))?;
        let path = image.as_str().to_owned();
        tokio::task::spawn_blocking(move || remove_existing(&root, &path))
            .await
            .map_err(|err| ImageStorageError::io(format!("storage task failed: {err}")))??;
        debug!(image = %image, "image removed");
        Ok(())
    }
}
