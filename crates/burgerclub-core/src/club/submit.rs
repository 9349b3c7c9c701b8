use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use super::gallery::{PhotoUpload, RATING_PHOTO_PREFIX};
use super::Club;
use crate::api::{insert_as, select_as, BlobStore, Query, Store, Table};
use crate::error::ClubError;
use crate::models::{
    AttendanceRecord, GalleryPhoto, NewAttendance, NewPhoto, NewRating, Rating, Subscores,
};
use crate::ranking::{load_items, recompute_item, RecomputeOutcome};
use crate::routing::ItemIndex;

/// What a visitor enters on the rating form.
#[derive(Debug, Clone)]
pub struct RatingSubmission {
    pub rater: String,
    pub subscores: Subscores,
    pub photo: Option<PhotoUpload>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub rating: Rating,
    /// Public URL when the optional photo uploaded
    pub photo_url: Option<String>,
    pub attendance_recorded: bool,
    pub recompute: RecomputeOutcome,
}

impl<S: Store + BlobStore> Club<S> {
    /// Record a rating for the burger the form is open for, then recompute
    /// that burger's score and re-rank everything.
    ///
    /// The form row is re-read first so a form closed after the visitor
    /// loaded the page refuses the submission.
    pub async fn submit_rating(&self, submission: RatingSubmission) -> Result<SubmitOutcome> {
        let rater = submission.rater.trim().to_string();
        if rater.is_empty() {
            return Err(ClubError::MissingField("name").into());
        }
        let s = submission.subscores;
        let subscores = Subscores::new(s.toppings, s.bun, s.doneness, s.flavor)?;

        let form = self
            .form_status()
            .await?
            .filter(|f| f.is_open)
            .ok_or(ClubError::FormClosed)?;

        // Rows written before ids were stored only carry the label
        let items = load_items(&self.store).await?;
        let index = ItemIndex::new(&items);
        let label = form.active_item_label.clone().unwrap_or_default();
        let item_id = index
            .resolve(form.active_item_id, &label)
            .ok_or(ClubError::NoActiveItem)?;
        let label = items
            .iter()
            .find(|i| i.id == item_id)
            .map(|i| i.label())
            .unwrap_or(label);

        let photo_url = match submission.photo {
            Some(photo) => self.attach_rating_photo(photo, &label, &rater).await,
            None => None,
        };

        let new_rating = NewRating {
            burger_id: item_id,
            burger: label,
            name: rater.clone(),
            toppings: subscores.toppings,
            bun: subscores.bun,
            doneness: subscores.doneness,
            flavor: subscores.flavor,
            created_at: Utc::now(),
            photo_url: photo_url.clone(),
        };
        let rating: Rating = insert_as(&self.store, Table::Ratings, &new_rating)
            .await
            .context("Failed to submit rating")?;
        info!(item_id, rating_id = rating.id, rater = %rater, "Rating submitted");

        let attendance_recorded = self.record_attendance(item_id, &rater, rating.id).await;
        let recompute = recompute_item(&self.store, item_id).await?;

        Ok(SubmitOutcome {
            rating,
            photo_url,
            attendance_recorded,
            recompute,
        })
    }

    /// Upload the rating photo and add it to the gallery. Failures are
    /// logged and the rating goes through without a photo.
    async fn attach_rating_photo(
        &self,
        photo: PhotoUpload,
        label: &str,
        rater: &str,
    ) -> Option<String> {
        let url = match self.upload_object(RATING_PHOTO_PREFIX, photo).await {
            Ok(url) => url,
            Err(e) => {
                warn!(error = %e, "Photo upload failed, submitting without photo");
                return None;
            }
        };

        let entry = NewPhoto {
            url: url.clone(),
            restaurant: label.to_string(),
            caption: format!("Rated by {}", rater),
        };
        if let Err(e) = insert_as::<GalleryPhoto, _, _>(&self.store, Table::Gallery, &entry).await {
            warn!(error = %e, url = %url, "Failed to add rating photo to gallery");
        }
        Some(url)
    }

    /// Best-effort attendance row inferred from a rating.
    async fn record_attendance(&self, item_id: i64, rater: &str, rating_id: i64) -> bool {
        let existing = select_as::<AttendanceRecord, _>(
            &self.store,
            Table::Attendees,
            &Query::all().eq("burger_id", item_id).eq("name", rater),
        )
        .await;
        match existing {
            Ok(rows) if !rows.is_empty() => return true,
            Ok(_) => {}
            Err(e) => {
                warn!(item_id, error = %e, "Failed to check attendance");
                return false;
            }
        }

        let row = NewAttendance {
            burger_id: item_id,
            name: rater.to_string(),
            rating_id: Some(rating_id),
        };
        match insert_as::<AttendanceRecord, _, _>(&self.store, Table::Attendees, &row).await {
            Ok(_) => true,
            Err(e) => {
                warn!(item_id, rater = %rater, error = %e, "Failed to record attendance");
                false
            }
        }
    }
}
