use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::utils::truncate_with_ellipsis;

/// Label length for the rating form's "currently rating" banner.
const ACTIVE_LABEL_DETAIL_CHARS: usize = 60;

/// Label length for pick lists.
const OPTION_LABEL_DETAIL_CHARS: usize = 50;

/// One reviewed burger in the ranked list (`results` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedItem {
    pub id: i64,
    #[serde(rename = "ranking", default, deserialize_with = "null_as_default")]
    pub rank: u32,
    #[serde(rename = "burger_rating", default)]
    pub score: Option<f64>,
    #[serde(rename = "restaurant", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "description", default, deserialize_with = "null_as_default")]
    pub details: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: String,
    #[serde(rename = "location", default, deserialize_with = "null_as_default")]
    pub place: String,
    #[serde(rename = "date_of_visit", default, deserialize_with = "null_as_default")]
    pub visit_date: String,
}

impl RankedItem {
    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }

    /// "Restaurant — description" with the description cut at 60 chars.
    /// This is the label stored on ratings and on the form config.
    pub fn label(&self) -> String {
        Self::compose_label(&self.name, &self.details, ACTIVE_LABEL_DETAIL_CHARS)
    }

    /// Shorter label for selection lists.
    pub fn option_label(&self) -> String {
        Self::compose_label(&self.name, &self.details, OPTION_LABEL_DETAIL_CHARS)
    }

    fn compose_label(name: &str, details: &str, max_chars: usize) -> String {
        if details.is_empty() {
            name.to_string()
        } else {
            format!("{} — {}", name, truncate_with_ellipsis(details, max_chars))
        }
    }

    /// Score formatted for tables; unrated items show a dash.
    pub fn score_display(&self) -> String {
        self.score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "-".to_string())
    }
}

/// A `results` row as inserted by the admin "add burger" flow.
#[derive(Debug, Clone, Serialize)]
pub struct NewResultRow {
    pub ranking: u32,
    pub burger_rating: Option<f64>,
    pub restaurant: String,
    pub description: String,
    pub price: String,
    pub location: String,
    pub date_of_visit: String,
}

/// Map coordinates for a burger (`burgers` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurgerLocation {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub restaurant: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl BurgerLocation {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBurger {
    pub restaurant: String,
    pub description: String,
    pub price: String,
    pub location: String,
    pub date_of_visit: String,
    pub lat: f64,
    pub lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_results_row_with_nulls() {
        let json = r#"{"id": 7, "ranking": 3, "burger_rating": null, "restaurant": "Red Hook Tavern",
            "description": null, "price": "$24.00", "location": "329 Van Brunt St, Brooklyn, NY 11231",
            "date_of_visit": "3/14/2024"}"#;
        let item: RankedItem = serde_json::from_str(json).expect("row");
        assert_eq!(item.rank, 3);
        assert_eq!(item.score, None);
        assert_eq!(item.details, "");
        assert_eq!(item.place, "329 Van Brunt St, Brooklyn, NY 11231");
        assert_eq!(item.score_display(), "-");
    }

    #[test]
    fn test_labels() {
        let item = RankedItem {
            id: 1,
            rank: 1,
            score: Some(8.25),
            name: "Emily".to_string(),
            details: "Emmy burger with caramelized onions, gruyere and special sauce on a pretzel bun".to_string(),
            price: String::new(),
            place: String::new(),
            visit_date: String::new(),
        };
        assert_eq!(
            item.label(),
            "Emily — Emmy burger with caramelized onions, gruyere and special sau..."
        );
        assert!(item.option_label().ends_with("..."));
        assert_eq!(item.score_display(), "8.25");

        let bare = RankedItem { details: String::new(), ..item };
        assert_eq!(bare.label(), "Emily");
    }
}
