//! On-disk photo storage.
//!
//! Layout under the root:
//! `places/<place_id>/photo_*.jpg` and `trip_places/<trip_place_id>/photo_*.jpg`.
//! Entities store the returned paths in their `photos` lists.

use base64::Engine;
use chrono::Utc;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const PLACES_DIR: &str = "places";
const TRIP_PLACES_DIR: &str = "trip_places";

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid base64 image payload: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("Invalid owner id for photo directory: {0:?}")]
    InvalidOwner(String),
    #[error("Photo is not inside the photo store: {0}")]
    OutsideRoot(PathBuf),
}

/// Entity a photo directory belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoOwner<'a> {
    Place(&'a str),
    TripPlace(&'a str),
}

/// Where an incoming image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Copy an existing file.
    File(PathBuf),
    /// Inline payload, optionally prefixed with a `data:...;base64,` header.
    Base64(String),
}

#[derive(Debug, Clone)]
pub struct PhotoStore {
    root: PathBuf,
}

impl PhotoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for a place's photos, created on demand.
    pub fn ensure_place_dir(&self, place_id: &str) -> Result<PathBuf, PhotoError> {
        self.ensure_dir(PhotoOwner::Place(place_id))
    }

    /// Directory for a trip stop's photos, created on demand.
    pub fn ensure_trip_place_dir(&self, trip_place_id: &str) -> Result<PathBuf, PhotoError> {
        self.ensure_dir(PhotoOwner::TripPlace(trip_place_id))
    }

    fn ensure_dir(&self, owner: PhotoOwner<'_>) -> Result<PathBuf, PhotoError> {
        let (subtree, id) = match owner {
            PhotoOwner::Place(id) => (PLACES_DIR, id),
            PhotoOwner::TripPlace(id) => (TRIP_PLACES_DIR, id),
        };
        if id.is_empty() || id.contains(|c| c == '/' || c == '\\') || id == "." || id == ".." {
            return Err(PhotoError::InvalidOwner(id.to_string()));
        }
        let dir = self.root.join(subtree).join(id);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(dir)
    }

    /// Unique file name: `photo_<unix millis>_<seq>.<ext>`.
    fn generate_photo_name(extension: &str) -> String {
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        format!("photo_{}_{}.{}", Utc::now().timestamp_millis(), seq, extension)
    }

    /// Store an image for `owner` and return its path, ready to append to the
    /// owner's `photos` list.
    pub fn save_image(&self, owner: PhotoOwner<'_>, source: &ImageSource) -> Result<String, PhotoError> {
        let dir = self.ensure_dir(owner)?;

        let dest = match source {
            ImageSource::File(path) => {
                let extension = path
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_else(|| "jpg".to_string());
                let dest = dir.join(Self::generate_photo_name(&extension));
                fs::copy(path, &dest)?;
                dest
            }
            ImageSource::Base64(payload) => {
                let data = match payload.split_once(";base64,") {
                    Some((_, data)) => data,
                    None => payload.as_str(),
                };
                let bytes = base64::engine::general_purpose::STANDARD.decode(data.trim())?;
                let dest = dir.join(Self::generate_photo_name("jpg"));
                fs::write(&dest, bytes)?;
                dest
            }
        };

        debug!(path = %dest.display(), "Saved photo");
        Ok(dest.to_string_lossy().into_owned())
    }

    /// Delete one stored photo. A missing file is not an error; a path outside
    /// the root is refused.
    pub fn remove_photo(&self, path: &str) -> Result<(), PhotoError> {
        let path = Path::new(path);
        if !self.contains(path) {
            return Err(PhotoError::OutsideRoot(path.to_path_buf()));
        }
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
            && !path.components().any(|c| matches!(c, Component::ParentDir))
            && path != self.root
    }

    /// Number of files stored under the root.
    pub fn count_files(&self) -> usize {
        if !self.root.exists() {
            return 0;
        }
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .count()
    }

    /// Remove the whole photo tree. Returns how many files were in it.
    pub fn remove_all(&self) -> io::Result<usize> {
        let count = self.count_files();
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {
                info!(root = %self.root.display(), files = count, "Removed photo storage");
                Ok(count)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => {
                warn!(root = %self.root.display(), "Failed to remove photo storage: {}", e);
                Err(e)
            }
        }
    }
}
