//! Per-burger rating breakdown for the admin ratings view.

use crate::models::{Criterion, RankedItem, Rating, Subscores};
use crate::ranking::CriterionMeans;
use crate::routing::ItemIndex;

/// Ratings shown in the admin view, newest first.
pub const RECENT_RATINGS_LIMIT: usize = 100;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingGroup<'a> {
    /// `None` when the ratings no longer match a current item
    pub item_id: Option<i64>,
    pub label: String,
    pub ratings: Vec<&'a Rating>,
    /// Per-criterion means rounded to one decimal
    pub means: Subscores,
    /// Plain mean of the four rounded means, two decimals
    pub average: f64,
    /// Weighted score over exactly these ratings
    pub weighted: f64,
}

impl<'a> RatingGroup<'a> {
    pub fn votes(&self) -> usize {
        self.ratings.len()
    }
}

/// Recent ratings with the items they are grouped against.
#[derive(Debug, Clone, Default)]
pub struct RatingSummary {
    pub items: Vec<RankedItem>,
    /// Newest first
    pub ratings: Vec<Rating>,
}

impl RatingSummary {
    pub fn groups(&self) -> Vec<RatingGroup<'_>> {
        group_ratings(&self.items, &self.ratings)
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

/// Row average shown next to each rating, one decimal.
pub fn row_average(rating: &Rating) -> f64 {
    round1(rating.subscores.average())
}

/// Group ratings by the item they belong to. Unattributable ratings are
/// grouped by their stored label ("Unknown" when blank). Groups appear in
/// order of their first rating.
pub fn group_ratings<'a>(items: &[RankedItem], ratings: &'a [Rating]) -> Vec<RatingGroup<'a>> {
    let index = ItemIndex::new(items);
    let mut keyed: Vec<((Option<i64>, String), Vec<&'a Rating>)> = Vec::new();

    for rating in ratings {
        let item_id = index.resolve_rating(rating);
        let label = match item_id.and_then(|id| items.iter().find(|i| i.id == id)) {
            Some(item) => item.label(),
            None if rating.item_label.trim().is_empty() => "Unknown".to_string(),
            None => rating.item_label.trim().to_string(),
        };
        let key = (item_id, label);
        match keyed.iter_mut().find(|(k, _)| *k == key) {
            Some((_, group)) => group.push(rating),
            None => keyed.push((key, vec![rating])),
        }
    }

    keyed
        .into_iter()
        .filter_map(|((item_id, label), group)| {
            let means = CriterionMeans::from_ratings(group.iter().map(|r| &r.subscores))?;
            let rounded = Subscores {
                toppings: round1(means.mean(Criterion::Toppings)),
                bun: round1(means.mean(Criterion::Bun)),
                doneness: round1(means.mean(Criterion::Doneness)),
                flavor: round1(means.mean(Criterion::Flavor)),
            };
            Some(RatingGroup {
                item_id,
                label,
                average: (rounded.average() * 100.0).round() / 100.0,
                weighted: means.weighted_score(),
                means: rounded,
                ratings: group,
            })
        })
        .collect()
}
