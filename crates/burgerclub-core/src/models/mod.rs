//! Data models for the club's hosted tables.
//!
//! Field names follow the domain (`rank`, `score`, `rater`); serde renames
//! map them onto the wire column names (`ranking`, `burger_rating`, `name`).
//!
//! - `RankedItem`, `BurgerLocation`: the ranked list and map coordinates
//! - `Rating`, `Subscores`, `Criterion`: submitted scores
//! - `AttendanceRecord`, `Member`: who was at each tasting
//! - `FormConfig`: the rating form gate
//! - `GalleryPhoto`, `Suggestion`, `RestaurantRequest`

pub mod attendance;
pub mod feedback;
pub mod form;
pub mod gallery;
pub mod item;
pub mod rating;

use serde::{Deserialize, Deserializer};

pub use attendance::{AttendanceRecord, Member, NewAttendance, NewMember};
pub use feedback::{NewRestaurantRequest, NewSuggestion, RestaurantRequest, Suggestion};
pub use form::{FormConfig, FORM_CONFIG_ID};
pub use gallery::{GalleryPhoto, NewPhoto};
pub use item::{BurgerLocation, NewBurger, NewResultRow, RankedItem};
pub use rating::{Criterion, NewRating, Rating, Subscores};

/// Columns may come back as `null`; treat that like a missing value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
