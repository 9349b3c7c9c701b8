//! Filtering and sorting of the ranked list for display.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::RankedItem;
use crate::utils::{contains_ignore_case, parse_price, parse_visit_date};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    #[default]
    Rank,
    RatingDesc,
    RatingAsc,
    PriceAsc,
    PriceDesc,
    DateDesc,
    DateAsc,
}

impl SortMode {
    pub const ALL: [SortMode; 7] = [
        SortMode::Rank,
        SortMode::RatingDesc,
        SortMode::RatingAsc,
        SortMode::PriceAsc,
        SortMode::PriceDesc,
        SortMode::DateDesc,
        SortMode::DateAsc,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SortMode::Rank => "rank",
            SortMode::RatingDesc => "rating-desc",
            SortMode::RatingAsc => "rating-asc",
            SortMode::PriceAsc => "price-asc",
            SortMode::PriceDesc => "price-desc",
            SortMode::DateDesc => "date-desc",
            SortMode::DateAsc => "date-asc",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortMode::ALL
            .into_iter()
            .find(|mode| mode.key() == s)
            .ok_or_else(|| {
                let keys: Vec<&str> = SortMode::ALL.iter().map(|m| m.key()).collect();
                format!("unknown sort '{}', expected one of: {}", s, keys.join(", "))
            })
    }
}

/// Case-insensitive substring match over name, details and place.
pub fn matches_query(item: &RankedItem, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty()
        || contains_ignore_case(&item.name, &needle)
        || contains_ignore_case(&item.details, &needle)
        || contains_ignore_case(&item.place, &needle)
}

/// Unscored items sort after scored ones in both rating directions.
fn cmp_rating(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if descending => y.total_cmp(&x),
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Filter then sort `items`, which are expected in rank order. Every sort
/// is stable, so equal keys keep rank order.
pub fn filter_and_sort<'a>(
    items: &'a [RankedItem],
    query: &str,
    sort: SortMode,
) -> Vec<&'a RankedItem> {
    let mut rows: Vec<&RankedItem> = items.iter().filter(|i| matches_query(i, query)).collect();

    match sort {
        SortMode::Rank => {}
        SortMode::RatingDesc => rows.sort_by(|a, b| cmp_rating(a.score, b.score, true)),
        SortMode::RatingAsc => rows.sort_by(|a, b| cmp_rating(a.score, b.score, false)),
        SortMode::PriceAsc => {
            rows.sort_by(|a, b| parse_price(&a.price).total_cmp(&parse_price(&b.price)))
        }
        SortMode::PriceDesc => {
            rows.sort_by(|a, b| parse_price(&b.price).total_cmp(&parse_price(&a.price)))
        }
        // Unparseable dates sort as the oldest
        SortMode::DateDesc => {
            rows.sort_by_key(|i| std::cmp::Reverse(parse_visit_date(&i.visit_date)))
        }
        SortMode::DateAsc => rows.sort_by_key(|i| parse_visit_date(&i.visit_date)),
    }
    rows
}
