//! Rating aggregation and rank recomputation.
//!
//! An item's score is the weighted mean of its per-criterion averages:
//! flavor counts 40%, toppings, bun and doneness 20% each, rounded to two
//! decimals. Ranks are dense: scored items first by descending score (ties
//! keep their existing order), unscored items after them in their existing
//! order.
//!
//! Persistence is best-effort. Each rank write is independent; a failed
//! write is logged and leaves that item stale until the next recompute.

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, error, info};

use crate::api::{select_as, Direction, Query, Store, Table};
use crate::models::{Criterion, RankedItem, Rating, Subscores};
use crate::routing::ItemIndex;

/// Criterion carrying the double weight.
pub const PRIMARY_CRITERION: Criterion = Criterion::Flavor;

pub const PRIMARY_WEIGHT: f64 = 0.40;
pub const SECONDARY_WEIGHT: f64 = 0.20;

pub fn weight(criterion: Criterion) -> f64 {
    if criterion == PRIMARY_CRITERION {
        PRIMARY_WEIGHT
    } else {
        SECONDARY_WEIGHT
    }
}

/// Round half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Per-criterion averages over a set of ratings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriterionMeans {
    pub means: Subscores,
    pub count: usize,
}

impl CriterionMeans {
    /// `None` when there are no ratings.
    pub fn from_ratings<'a>(ratings: impl IntoIterator<Item = &'a Subscores>) -> Option<Self> {
        let mut sum = Subscores::default();
        let mut count = 0usize;
        for r in ratings {
            sum.toppings += r.toppings;
            sum.bun += r.bun;
            sum.doneness += r.doneness;
            sum.flavor += r.flavor;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(Self {
            means: Subscores {
                toppings: sum.toppings / n,
                bun: sum.bun / n,
                doneness: sum.doneness / n,
                flavor: sum.flavor / n,
            },
            count,
        })
    }

    pub fn mean(&self, criterion: Criterion) -> f64 {
        criterion.value(&self.means)
    }

    /// Weighted score, rounded to two decimals.
    pub fn weighted_score(&self) -> f64 {
        round2(
            Criterion::ALL
                .iter()
                .map(|c| weight(*c) * self.mean(*c))
                .sum(),
        )
    }
}

/// Display score for one item's ratings; `None` when nobody has rated it.
pub fn score<'a>(ratings: impl IntoIterator<Item = &'a Subscores>) -> Option<f64> {
    CriterionMeans::from_ratings(ratings).map(|m| m.weighted_score())
}

/// A rank that differs from what is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankChange {
    pub item_id: i64,
    pub from: u32,
    pub to: u32,
}

/// Dense ranks for `items`, which must be in their existing display order.
/// Returns `(item_id, rank)` in new rank order.
pub fn compute_ranks(items: &[RankedItem]) -> Vec<(i64, u32)> {
    let (mut scored, unscored): (Vec<&RankedItem>, Vec<&RankedItem>) =
        items.iter().partition(|item| item.is_scored());

    // sort_by is stable, so equal scores keep their existing order
    scored.sort_by(|a, b| {
        let (a, b) = (a.score.unwrap_or(0.0), b.score.unwrap_or(0.0));
        b.total_cmp(&a)
    });

    scored
        .into_iter()
        .chain(unscored)
        .enumerate()
        .map(|(i, item)| (item.id, i as u32 + 1))
        .collect()
}

/// Items whose computed rank differs from their stored rank.
pub fn rank_changes(items: &[RankedItem]) -> Vec<RankChange> {
    compute_ranks(items)
        .into_iter()
        .filter_map(|(item_id, to)| {
            let current = items.iter().find(|i| i.id == item_id)?;
            (current.rank != to).then_some(RankChange {
                item_id,
                from: current.rank,
                to,
            })
        })
        .collect()
}

/// Apply computed ranks in memory and reorder `items` by them.
pub fn apply_ranks(items: &mut Vec<RankedItem>) {
    let ranks = compute_ranks(items);
    let mut reordered = Vec::with_capacity(items.len());
    for (item_id, rank) in ranks {
        if let Some(pos) = items.iter().position(|i| i.id == item_id) {
            let mut item = items.swap_remove(pos);
            item.rank = rank;
            reordered.push(item);
        }
    }
    *items = reordered;
}

/// Order items as displayed: by stored rank, then by id for stability.
pub fn sort_by_stored_rank(items: &mut [RankedItem]) {
    items.sort_by(|a, b| a.rank.cmp(&b.rank).then(a.id.cmp(&b.id)));
}

// ============================================================================
// Persistence
// ============================================================================

/// Result of writing recomputed ranks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RerankReport {
    pub updated: Vec<i64>,
    pub failed: Vec<i64>,
}

impl RerankReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of recomputing one item after a new rating.
#[derive(Debug, Clone, PartialEq)]
pub struct RecomputeOutcome {
    pub item_id: i64,
    pub score: Option<f64>,
    pub score_saved: bool,
    pub ranks: RerankReport,
}

/// Load every item in its existing display order.
pub async fn load_items<S: Store + ?Sized>(store: &S) -> Result<Vec<RankedItem>> {
    let mut items: Vec<RankedItem> = select_as(
        store,
        Table::Results,
        &Query::all().order_by("ranking", Direction::Asc),
    )
    .await
    .context("Failed to load rankings")?;
    sort_by_stored_rank(&mut items);
    Ok(items)
}

/// Write ranks for every item whose computed rank changed. Never fails as a
/// whole; per-item failures are logged and reported.
pub async fn persist_ranks<S: Store + ?Sized>(store: &S, items: &[RankedItem]) -> RerankReport {
    let mut report = RerankReport::default();
    for change in rank_changes(items) {
        let patch = json!({ "ranking": change.to });
        match store
            .update(Table::Results, patch, "id", &change.item_id.to_string())
            .await
        {
            Ok(_) => {
                debug!(
                    item_id = change.item_id,
                    from = change.from,
                    to = change.to,
                    "Rank updated"
                );
                report.updated.push(change.item_id);
            }
            Err(e) => {
                error!(item_id = change.item_id, error = %e, "Failed to update rank");
                report.failed.push(change.item_id);
            }
        }
    }
    report
}

/// Re-rank all items from their stored scores.
pub async fn rerank_all<S: Store + ?Sized>(store: &S) -> Result<RerankReport> {
    let items = load_items(store).await?;
    let report = persist_ranks(store, &items).await;
    info!(
        items = items.len(),
        updated = report.updated.len(),
        failed = report.failed.len(),
        "Re-ranked items"
    );
    Ok(report)
}

/// Recompute one item's score from its ratings, store it, then re-rank all.
pub async fn recompute_item<S: Store + ?Sized>(
    store: &S,
    item_id: i64,
) -> Result<RecomputeOutcome> {
    let mut items = load_items(store).await?;
    let ratings: Vec<Rating> = select_as(store, Table::Ratings, &Query::all())
        .await
        .context("Failed to load ratings")?;

    let index = ItemIndex::new(&items);
    let new_score = score(
        ratings
            .iter()
            .filter(|r| index.resolve_rating(r) == Some(item_id))
            .map(|r| &r.subscores),
    );

    let patch = json!({ "burger_rating": new_score });
    let score_saved = match store
        .update(Table::Results, patch, "id", &item_id.to_string())
        .await
    {
        Ok(_) => {
            if let Some(item) = items.iter_mut().find(|i| i.id == item_id) {
                item.score = new_score;
            }
            true
        }
        Err(e) => {
            error!(item_id, error = %e, "Failed to store recomputed score");
            false
        }
    };

    let ranks = persist_ranks(store, &items).await;
    info!(item_id, score = ?new_score, updated = ranks.updated.len(), "Recomputed item score");
    Ok(RecomputeOutcome {
        item_id,
        score: new_score,
        score_saved,
        ranks,
    })
}
