use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_default;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryPhoto {
    pub id: i64,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub restaurant: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub caption: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl GalleryPhoto {
    /// "Restaurant — caption", or whichever half is present.
    pub fn title(&self) -> String {
        match (self.restaurant.is_empty(), self.caption.is_empty()) {
            (false, false) => format!("{} — {}", self.restaurant, self.caption),
            (false, true) => self.restaurant.clone(),
            (true, false) => self.caption.clone(),
            (true, true) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPhoto {
    pub url: String,
    pub restaurant: String,
    pub caption: String,
}
