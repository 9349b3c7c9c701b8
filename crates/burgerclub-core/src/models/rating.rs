use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::error::ClubError;

/// Lowest and highest subscore a rater may give.
pub const MIN_SUBSCORE: f64 = 0.0;
pub const MAX_SUBSCORE: f64 = 10.0;

/// The four judged aspects of a burger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    Toppings,
    Bun,
    Doneness,
    Flavor,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Criterion::Toppings,
        Criterion::Bun,
        Criterion::Doneness,
        Criterion::Flavor,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Criterion::Toppings => "Toppings",
            Criterion::Bun => "Bun",
            Criterion::Doneness => "Doneness",
            Criterion::Flavor => "Flavor",
        }
    }

    pub fn value(&self, scores: &Subscores) -> f64 {
        match self {
            Criterion::Toppings => scores.toppings,
            Criterion::Bun => scores.bun,
            Criterion::Doneness => scores.doneness,
            Criterion::Flavor => scores.flavor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Subscores {
    #[serde(default, deserialize_with = "null_as_default")]
    pub toppings: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bun: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub doneness: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub flavor: f64,
}

impl Subscores {
    /// Validated constructor: every subscore must be finite and within 0..=10.
    pub fn new(toppings: f64, bun: f64, doneness: f64, flavor: f64) -> Result<Self, ClubError> {
        let scores = Self {
            toppings,
            bun,
            doneness,
            flavor,
        };
        for criterion in Criterion::ALL {
            let value = criterion.value(&scores);
            if !value.is_finite() || !(MIN_SUBSCORE..=MAX_SUBSCORE).contains(&value) {
                return Err(ClubError::SubscoreOutOfRange {
                    criterion: criterion.label(),
                    value,
                });
            }
        }
        Ok(scores)
    }

    /// Unweighted mean of the four subscores.
    pub fn average(&self) -> f64 {
        (self.toppings + self.bun + self.doneness + self.flavor) / 4.0
    }
}

/// One person's submitted scores for a burger (`ratings` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub id: i64,
    /// Stable reference to the rated item. Absent on legacy rows.
    #[serde(rename = "burger_id", default)]
    pub item_id: Option<i64>,
    /// Human-readable label recorded at submission time.
    #[serde(rename = "burger", default, deserialize_with = "null_as_default")]
    pub item_label: String,
    #[serde(rename = "name", default, deserialize_with = "null_as_default")]
    pub rater: String,
    #[serde(flatten)]
    pub subscores: Subscores,
    #[serde(rename = "created_at", default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(rename = "photo_url", default)]
    pub photo_ref: Option<String>,
}

/// A `ratings` row as submitted through the form.
#[derive(Debug, Clone, Serialize)]
pub struct NewRating {
    pub burger_id: i64,
    pub burger: String,
    pub name: String,
    pub toppings: f64,
    pub bun: f64,
    pub doneness: f64,
    pub flavor: f64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscores_validation() {
        assert!(Subscores::new(0.0, 10.0, 5.5, 7.0).is_ok());
        assert_eq!(
            Subscores::new(8.0, 11.0, 5.0, 5.0),
            Err(ClubError::SubscoreOutOfRange {
                criterion: "Bun",
                value: 11.0
            })
        );
        assert!(Subscores::new(8.0, 7.0, -0.5, 5.0).is_err());
        assert!(Subscores::new(8.0, 7.0, 5.0, f64::NAN).is_err());
    }

    #[test]
    fn test_parse_legacy_rating_row() {
        let json = r#"{"id": 3, "burger": "Emily — Emmy burger", "name": "Dana",
            "toppings": 8, "bun": 7.5, "doneness": null, "flavor": 10,
            "created_at": "2024-03-14T19:02:11.52+00:00", "photo_url": null}"#;
        let rating: Rating = serde_json::from_str(json).expect("rating row");
        assert_eq!(rating.item_id, None);
        assert_eq!(rating.rater, "Dana");
        assert_eq!(rating.subscores.doneness, 0.0);
        assert_eq!(rating.subscores.flavor, 10.0);
        assert!(rating.submitted_at.is_some());
        assert!((rating.subscores.average() - 6.375).abs() < 1e-9);
    }

    #[test]
    fn test_new_rating_omits_missing_photo() {
        let rating = NewRating {
            burger_id: 4,
            burger: "Emily".to_string(),
            name: "Dana".to_string(),
            toppings: 8.0,
            bun: 7.0,
            doneness: 9.0,
            flavor: 10.0,
            created_at: Utc::now(),
            photo_url: None,
        };
        let value = serde_json::to_value(&rating).expect("encode");
        assert!(value.get("photo_url").is_none());
        assert_eq!(value["burger_id"], 4);
    }
}
