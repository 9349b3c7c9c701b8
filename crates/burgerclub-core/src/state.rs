//! Snapshot of everything the views render.
//!
//! Workflows write to the store, then reload an `AppState`; presentation
//! code only reads it.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::debug;

use crate::api::{select_as, Direction, Query, Store, Table};
use crate::listing::{filter_and_sort, SortMode};
use crate::map::{build_pins, MapPin};
use crate::models::{
    AttendanceRecord, BurgerLocation, FormConfig, GalleryPhoto, Member, RankedItem, Rating,
    FORM_CONFIG_ID,
};
use crate::ranking::load_items;
use crate::roster::{resolve_rosters, HistoricalCounts, Roster};
use crate::utils::cmp_ignore_case;

#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// In rank order
    pub items: Vec<RankedItem>,
    pub ratings: Vec<Rating>,
    pub attendance: Vec<AttendanceRecord>,
    /// Alphabetical
    pub members: Vec<Member>,
    /// `None` when the singleton row is missing
    pub form: Option<FormConfig>,
    /// Newest first
    pub gallery: Vec<GalleryPhoto>,
    pub locations: Vec<BurgerLocation>,
    pub rosters: BTreeMap<i64, Roster>,
}

impl AppState {
    /// Read every table concurrently and derive the rosters.
    pub async fn load<S: Store + ?Sized>(store: &S, history: &HistoricalCounts) -> Result<Self> {
        let all = Query::all();
        let form_query = Query::all().eq("id", FORM_CONFIG_ID);
        let gallery_query = Query::all().order_by("created_at", Direction::Desc);

        let (items, ratings, attendance, mut members, forms, gallery, locations) =
            futures::try_join!(
                load_items(store),
                select_as::<Rating, _>(store, Table::Ratings, &all),
                select_as::<AttendanceRecord, _>(store, Table::Attendees, &all),
                select_as::<Member, _>(store, Table::Members, &all),
                select_as::<FormConfig, _>(store, Table::FormConfig, &form_query),
                select_as::<GalleryPhoto, _>(store, Table::Gallery, &gallery_query),
                select_as::<BurgerLocation, _>(store, Table::Burgers, &all),
            )
            .context("Failed to load club data")?;

        members.sort_by(|a, b| cmp_ignore_case(&a.name, &b.name));
        let rosters = resolve_rosters(&items, &attendance, &ratings, history);
        debug!(
            items = items.len(),
            ratings = ratings.len(),
            photos = gallery.len(),
            "Loaded club state"
        );

        Ok(Self {
            items,
            ratings,
            attendance,
            members,
            form: forms.into_iter().next(),
            gallery,
            locations,
            rosters,
        })
    }

    pub fn item(&self, id: i64) -> Option<&RankedItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn rankings(&self, query: &str, sort: SortMode) -> Vec<&RankedItem> {
        filter_and_sort(&self.items, query, sort)
    }

    pub fn map_pins(&self) -> Vec<MapPin> {
        build_pins(&self.items, &self.locations)
    }

    pub fn roster(&self, item_id: i64) -> Option<&Roster> {
        self.rosters.get(&item_id)
    }

    /// Rosters in ranking order, or just the one for `only`. Empty when
    /// `only` names no known burger.
    pub fn rosters_for(&self, only: Option<i64>) -> Vec<(&RankedItem, &Roster)> {
        self.items
            .iter()
            .filter(|i| only.map_or(true, |id| i.id == id))
            .filter_map(|i| self.rosters.get(&i.id).map(|r| (i, r)))
            .collect()
    }

    pub fn is_form_open(&self) -> bool {
        self.form.as_ref().map(|f| f.is_open).unwrap_or(false)
    }
}
