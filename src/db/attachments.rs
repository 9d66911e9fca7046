//! Photos attached to places and route stops.
//!
//! The entity's `photos` list is the source of truth for display order; the
//! files live in the [`PhotoStore`].

use tracing::{debug, warn};

use super::{Database, PlacePatch, Result, TripPlacePatch};
use crate::photos::{ImageSource, PhotoError, PhotoOwner, PhotoStore};

impl Database {
    fn owner_photos(&self, owner: PhotoOwner<'_>) -> Result<Option<Vec<String>>> {
        Ok(match owner {
            PhotoOwner::Place(id) => self.get_place(id)?.map(|p| p.photos),
            PhotoOwner::TripPlace(id) => self.get_trip_place(id)?.map(|tp| tp.photos),
        })
    }

    fn set_owner_photos(&self, owner: PhotoOwner<'_>, photos: Vec<String>) -> Result<()> {
        match owner {
            PhotoOwner::Place(id) => self.update_place(
                id,
                PlacePatch {
                    photos: Some(photos),
                    ..Default::default()
                },
            ),
            PhotoOwner::TripPlace(id) => self.update_trip_place(
                id,
                TripPlacePatch {
                    photos: Some(photos),
                    ..Default::default()
                },
            ),
        }
    }

    /// Store an image and append it to the owner's photo list.
    ///
    /// Returns the stored path, or `None` when the owner does not exist (no
    /// file is written then).
    pub fn attach_photo(
        &self,
        store: &PhotoStore,
        owner: PhotoOwner<'_>,
        source: &ImageSource,
    ) -> Result<Option<String>> {
        let Some(mut photos) = self.owner_photos(owner)? else {
            debug!(?owner, "attach_photo: no such owner");
            return Ok(None);
        };
        let path = store.save_image(owner, source)?;
        photos.push(path.clone());
        self.set_owner_photos(owner, photos)?;
        Ok(Some(path))
    }

    /// Drop the photo at `index` from the owner's list, keeping the rest in
    /// order, then delete its file.
    ///
    /// Returns the removed path, or `None` for an unknown owner or an index
    /// past the end. Paths outside the store are detached but their files are
    /// left alone.
    pub fn detach_photo(
        &self,
        store: &PhotoStore,
        owner: PhotoOwner<'_>,
        index: usize,
    ) -> Result<Option<String>> {
        let Some(mut photos) = self.owner_photos(owner)? else {
            debug!(?owner, "detach_photo: no such owner");
            return Ok(None);
        };
        if index >= photos.len() {
            debug!(?owner, index, "detach_photo: no photo at index");
            return Ok(None);
        }
        let path = photos.remove(index);
        self.set_owner_photos(owner, photos)?;

        match store.remove_photo(&path) {
            Ok(()) => {}
            Err(PhotoError::OutsideRoot(_)) => {
                warn!(path = %path, "Detached photo lives outside the photo store; file kept");
            }
            Err(e) => return Err(e.into()),
        }
        Ok(Some(path))
    }
}
