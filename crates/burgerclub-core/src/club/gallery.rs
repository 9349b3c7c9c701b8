use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use super::{Club, Confirmation};
use crate::api::{insert_as, select_as, BlobStore, Direction, Query, Store, Table};
use crate::error::ClubError;
use crate::models::{GalleryPhoto, NewPhoto};
use crate::utils::sanitize_file_name;

pub const PHOTO_BUCKET: &str = "photos";

pub(super) const RATING_PHOTO_PREFIX: &str = "ratings";
const GALLERY_PHOTO_PREFIX: &str = "gallery";

/// Characters of the burger description used when no caption is given.
const DEFAULT_CAPTION_CHARS: usize = 80;

/// A photo file ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Guess an image content type from the file extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// `<prefix>/<unix millis>_<sanitised file name>`
fn object_path(prefix: &str, file_name: &str, millis: i64) -> String {
    format!("{}/{}_{}", prefix, millis, sanitize_file_name(file_name))
}

impl<S: Store + BlobStore> Club<S> {
    pub(super) async fn upload_object(&self, prefix: &str, photo: PhotoUpload) -> Result<String> {
        let path = object_path(prefix, &photo.file_name, Utc::now().timestamp_millis());
        self.store
            .upload(PHOTO_BUCKET, &path, photo.bytes, &photo.content_type)
            .await
            .with_context(|| format!("Failed to upload {}", photo.file_name))
    }

    /// Newest first.
    pub async fn gallery(&self) -> Result<Vec<GalleryPhoto>> {
        select_as(
            &self.store,
            Table::Gallery,
            &Query::all().order_by("created_at", Direction::Desc),
        )
        .await
        .context("Failed to load gallery")
    }

    /// Upload photos for a burger. Stops at the first failure; photos
    /// already uploaded stay in the gallery.
    pub async fn upload_photos(
        &self,
        item_id: i64,
        files: Vec<PhotoUpload>,
        caption: Option<&str>,
    ) -> Result<Vec<GalleryPhoto>> {
        if files.is_empty() {
            return Err(ClubError::NoPhotos.into());
        }
        let item = self.find_item(item_id).await?;
        let caption = caption
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| item.details.chars().take(DEFAULT_CAPTION_CHARS).collect());

        let mut added = Vec::with_capacity(files.len());
        for photo in files {
            let url = self.upload_object(GALLERY_PHOTO_PREFIX, photo).await?;
            let entry = NewPhoto {
                url,
                restaurant: item.name.clone(),
                caption: caption.clone(),
            };
            let row: GalleryPhoto = insert_as(&self.store, Table::Gallery, &entry)
                .await
                .context("Failed to add photo to gallery")?;
            added.push(row);
        }
        info!(item_id, count = added.len(), "Uploaded gallery photos");
        Ok(added)
    }

    pub async fn delete_photo(&self, photo_id: i64, confirmation: Confirmation) -> Result<()> {
        confirmation.require()?;
        self.store
            .delete(Table::Gallery, "id", &photo_id.to_string())
            .await
            .context("Failed to delete photo")?;
        info!(photo_id, "Deleted photo");
        Ok(())
    }
}
