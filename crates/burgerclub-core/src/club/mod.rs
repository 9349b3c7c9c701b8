//! Every user-facing action of the club site.
//!
//! `Club` wraps a store and runs each workflow as: validate, write, trigger
//! recomputation, report. Callers reload an [`AppState`] afterwards to
//! render.
//!
//! - `submit`: the public rating form
//! - `admin`: password gate, form control, adding and deleting burgers,
//!   members, rating summary, placeholder backfill
//! - `gallery`: photo uploads and deletion
//! - `feedback`: suggestions and restaurant requests

mod admin;
mod feedback;
mod gallery;
mod submit;

pub use admin::{AddedItem, NewItem};
pub use feedback::RestaurantRequestInput;
pub use gallery::{content_type_for, PhotoUpload, PHOTO_BUCKET};
pub use submit::{RatingSubmission, SubmitOutcome};

use anyhow::{Context, Result};

use crate::api::{select_as, BlobStore, Query, Store, Table};
use crate::config::Config;
use crate::error::ClubError;
use crate::listing::{filter_and_sort, SortMode};
use crate::map::{build_pins, MapPin};
use crate::models::{BurgerLocation, FormConfig, RankedItem, FORM_CONFIG_ID};
use crate::ranking::load_items;
use crate::roster::HistoricalCounts;
use crate::state::AppState;

/// Acknowledgements a destructive action needs.
const REQUIRED_ACKNOWLEDGEMENTS: u8 = 2;

/// Explicit sign-off for a destructive action. Deletes refuse unless the
/// user acknowledged twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confirmation {
    acknowledgements: u8,
}

impl Confirmation {
    pub fn none() -> Self {
        Self::default()
    }

    /// Both acknowledgements given up front (scripts, `--yes --yes`).
    pub fn twice() -> Self {
        Self {
            acknowledgements: REQUIRED_ACKNOWLEDGEMENTS,
        }
    }

    pub fn acknowledge(self) -> Self {
        Self {
            acknowledgements: self.acknowledgements.saturating_add(1),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.acknowledgements >= REQUIRED_ACKNOWLEDGEMENTS
    }

    pub fn require(&self) -> Result<(), ClubError> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(ClubError::NotConfirmed)
        }
    }
}

pub struct Club<S> {
    store: S,
    history: HistoricalCounts,
    fallback_admin_hash: String,
}

impl<S> Club<S> {
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            store,
            history: config.historical_counts.clone(),
            fallback_admin_hash: config.admin_password_hash.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn history(&self) -> &HistoricalCounts {
        &self.history
    }
}

impl<S: Store + BlobStore> Club<S> {
    pub async fn load_state(&self) -> Result<AppState> {
        AppState::load(&self.store, &self.history).await
    }

    pub async fn rankings(&self, query: &str, sort: SortMode) -> Result<Vec<RankedItem>> {
        let items = load_items(&self.store).await?;
        Ok(filter_and_sort(&items, query, sort)
            .into_iter()
            .cloned()
            .collect())
    }

    /// The singleton form row; `None` when it does not exist yet.
    pub async fn form_status(&self) -> Result<Option<FormConfig>> {
        let rows: Vec<FormConfig> = select_as(
            &self.store,
            Table::FormConfig,
            &Query::all().eq("id", FORM_CONFIG_ID),
        )
        .await
        .context("Failed to load form status")?;
        Ok(rows.into_iter().next())
    }

    pub async fn map_pins(&self) -> Result<Vec<MapPin>> {
        let all = Query::all();
        let (items, locations) = futures::try_join!(
            load_items(&self.store),
            select_as::<BurgerLocation, _>(&self.store, Table::Burgers, &all),
        )
        .context("Failed to load map data")?;
        Ok(build_pins(&items, &locations))
    }

    pub(crate) async fn find_item(&self, item_id: i64) -> Result<RankedItem> {
        let items: Vec<RankedItem> = select_as(
            &self.store,
            Table::Results,
            &Query::all().eq("id", item_id),
        )
        .await
        .context("Failed to look up burger")?;
        items
            .into_iter()
            .next()
            .ok_or_else(|| ClubError::UnknownItem(item_id).into())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{club, seeded_store};
    use super::*;
    use crate::api::fake::FakeStore;

    #[test]
    fn test_confirmation_needs_two_acknowledgements() {
        assert_eq!(Confirmation::none().require(), Err(ClubError::NotConfirmed));
        assert!(!Confirmation::none().acknowledge().is_complete());
        assert!(Confirmation::none().acknowledge().acknowledge().is_complete());
        assert!(Confirmation::twice().require().is_ok());
    }

    #[tokio::test]
    async fn test_rankings_filter_and_form_status() {
        let club = club(seeded_store(FakeStore::default()).await);
        let all = club.rankings("", SortMode::Rank).await.expect("rankings");
        assert_eq!(all.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);

        let emmy = club.rankings("emmy", SortMode::Rank).await.expect("rankings");
        assert_eq!(emmy.len(), 1);

        let form = club.form_status().await.expect("form").expect("row");
        assert!(form.is_open);
        assert_eq!(form.active_item_id, Some(2));
    }

    #[tokio::test]
    async fn test_find_unknown_item() {
        let club = club(FakeStore::default());
        let err = club.find_item(9).await.expect_err("missing");
        assert_eq!(err.downcast_ref::<ClubError>(), Some(&ClubError::UnknownItem(9)));
    }
}
