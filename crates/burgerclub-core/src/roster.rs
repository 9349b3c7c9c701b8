//! Attendance rosters: who was at each burger's tasting.
//!
//! A roster merges three sources, in order:
//! 1. explicit `attendees` rows (admin-entered, inferred, or persisted
//!    placeholders)
//! 2. the rater name of every rating attributable to the item
//! 3. `"Unknown N"` placeholders covering any shortfall against the
//!    historical headcount recorded before attendance was tracked
//!
//! Merging is pure: missing placeholders appear as pending and are only
//! written by the explicit [`backfill_placeholders`] step. Because persisted
//! placeholders count toward the roster, the backfill converges after one run.

use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::api::{insert_as, select_as, Query, Store, Table};
use crate::models::{AttendanceRecord, NewAttendance, RankedItem, Rating};
use crate::ranking::load_items;
use crate::routing::ItemIndex;
use crate::utils::cmp_ignore_case;

const PLACEHOLDER_PREFIX: &str = "Unknown ";

/// Headcounts per item id captured before attendance was tracked.
pub type HistoricalCounts = BTreeMap<i64, u32>;

/// Parse the `N` of a `"Unknown N"` placeholder name.
pub fn placeholder_number(name: &str) -> Option<u32> {
    let digits = name.strip_prefix(PLACEHOLDER_PREFIX)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn placeholder_name(number: u32) -> String {
    format!("{}{}", PLACEHOLDER_PREFIX, number)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendeeSource {
    /// An `attendees` row with a real name
    Recorded,
    /// Only known from a rating submission
    Rater,
    /// A placeholder; `persisted` is false until the backfill writes it
    Placeholder { persisted: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    pub name: String,
    pub source: AttendeeSource,
}

impl Attendee {
    pub fn is_placeholder(&self) -> bool {
        matches!(self.source, AttendeeSource::Placeholder { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub item_id: i64,
    /// Real names alphabetically, then placeholders by number
    pub attendees: Vec<Attendee>,
}

impl Roster {
    pub fn len(&self) -> usize {
        self.attendees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attendees.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.attendees.iter().map(|a| a.name.as_str()).collect()
    }

    /// Placeholders shown but not yet stored.
    pub fn pending_placeholders(&self) -> impl Iterator<Item = &Attendee> {
        self.attendees
            .iter()
            .filter(|a| a.source == AttendeeSource::Placeholder { persisted: false })
    }
}

/// Merge explicit attendance, ratings and historical headcounts into one
/// deduplicated roster per item. Ratings that cannot be attributed to a
/// current item are skipped.
pub fn resolve_rosters(
    items: &[RankedItem],
    explicit: &[AttendanceRecord],
    ratings: &[Rating],
    history: &HistoricalCounts,
) -> BTreeMap<i64, Roster> {
    let index = ItemIndex::new(items);
    let mut rosters: BTreeMap<i64, (Vec<Attendee>, HashSet<String>)> = items
        .iter()
        .map(|item| (item.id, (Vec::new(), HashSet::new())))
        .collect();

    let mut add = |item_id: i64, name: &str, source: AttendeeSource| {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        if let Some((attendees, seen)) = rosters.get_mut(&item_id) {
            if seen.insert(name.to_string()) {
                let source = if placeholder_number(name).is_some() {
                    AttendeeSource::Placeholder { persisted: true }
                } else {
                    source
                };
                attendees.push(Attendee {
                    name: name.to_string(),
                    source,
                });
            }
        }
    };

    for record in explicit {
        add(record.item_id, &record.person_name, AttendeeSource::Recorded);
    }
    for rating in ratings {
        if let Some(item_id) = index.resolve_rating(rating) {
            add(item_id, &rating.rater, AttendeeSource::Rater);
        }
    }

    items
        .iter()
        .filter_map(|item| {
            let (mut attendees, _) = rosters.remove(&item.id)?;
            let historical = history.get(&item.id).copied().unwrap_or(0);
            if historical > 0 && item.is_scored() {
                fill_placeholders(&mut attendees, historical as usize);
            }
            sort_for_display(&mut attendees);
            Some((
                item.id,
                Roster {
                    item_id: item.id,
                    attendees,
                },
            ))
        })
        .collect()
}

/// Add pending placeholders, using the lowest unused numbers, until the
/// roster reaches `headcount`.
fn fill_placeholders(attendees: &mut Vec<Attendee>, headcount: usize) {
    let mut deficit = headcount.saturating_sub(attendees.len());
    let used: HashSet<u32> = attendees
        .iter()
        .filter_map(|a| placeholder_number(&a.name))
        .collect();

    let mut number = 1u32;
    while deficit > 0 {
        if !used.contains(&number) {
            attendees.push(Attendee {
                name: placeholder_name(number),
                source: AttendeeSource::Placeholder { persisted: false },
            });
            deficit -= 1;
        }
        number += 1;
    }
}

fn sort_for_display(attendees: &mut [Attendee]) {
    attendees.sort_by(|a, b| {
        match (placeholder_number(&a.name), placeholder_number(&b.name)) {
            (None, None) => cmp_ignore_case(&a.name, &b.name),
            (None, Some(_)) => std::cmp::Ordering::Less,
            (Some(_), None) => std::cmp::Ordering::Greater,
            (Some(x), Some(y)) => x.cmp(&y),
        }
    });
}

/// Rows the backfill would write: every pending placeholder.
pub fn plan_backfill(rosters: &BTreeMap<i64, Roster>) -> Vec<NewAttendance> {
    rosters
        .values()
        .flat_map(|roster| {
            roster.pending_placeholders().map(move |a| NewAttendance {
                burger_id: roster.item_id,
                name: a.name.clone(),
                rating_id: None,
            })
        })
        .collect()
}

// ============================================================================
// Store-backed operations
// ============================================================================

/// Everything the resolver reads, fetched concurrently.
pub async fn load_inputs<S: Store + ?Sized>(
    store: &S,
) -> Result<(Vec<RankedItem>, Vec<AttendanceRecord>, Vec<Rating>)> {
    let attendees_query = Query::all();
    let ratings_query = Query::all();
    let (items, attendees, ratings) = futures::try_join!(
        load_items(store),
        select_as::<AttendanceRecord, _>(store, Table::Attendees, &attendees_query),
        select_as::<Rating, _>(store, Table::Ratings, &ratings_query),
    )
    .context("Failed to load attendance inputs")?;
    Ok((items, attendees, ratings))
}

pub async fn load_rosters<S: Store + ?Sized>(
    store: &S,
    history: &HistoricalCounts,
) -> Result<BTreeMap<i64, Roster>> {
    let (items, attendees, ratings) = load_inputs(store).await?;
    Ok(resolve_rosters(&items, &attendees, &ratings, history))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub created: Vec<(i64, String)>,
    pub failed: Vec<(i64, String)>,
}

/// Persist the placeholders the roster merge currently synthesizes.
/// Running it again on unchanged data writes nothing.
pub async fn backfill_placeholders<S: Store + ?Sized>(
    store: &S,
    history: &HistoricalCounts,
) -> Result<BackfillReport> {
    let rosters = load_rosters(store, history).await?;
    let mut report = BackfillReport::default();

    for row in plan_backfill(&rosters) {
        let key = (row.burger_id, row.name.clone());
        match insert_as::<AttendanceRecord, _, _>(store, Table::Attendees, &row).await {
            Ok(_) => report.created.push(key),
            Err(e) => {
                error!(
                    item_id = row.burger_id,
                    name = %row.name,
                    error = %e,
                    "Failed to store placeholder"
                );
                report.failed.push(key);
            }
        }
    }

    info!(
        created = report.created.len(),
        failed = report.failed.len(),
        "Placeholder backfill finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeStore;
    use crate::models::Subscores;
    use serde_json::json;

    fn item(id: i64, name: &str, score: Option<f64>) -> RankedItem {
        RankedItem {
            id,
            rank: id as u32,
            score,
            name: name.to_string(),
            details: String::new(),
            price: String::new(),
            place: String::new(),
            visit_date: String::new(),
        }
    }

    fn record(id: i64, item_id: i64, name: &str) -> AttendanceRecord {
        AttendanceRecord {
            id,
            item_id,
            person_name: name.to_string(),
            source_rating: None,
        }
    }

    fn rating(id: i64, item_id: Option<i64>, label: &str, rater: &str) -> Rating {
        Rating {
            id,
            item_id,
            item_label: label.to_string(),
            rater: rater.to_string(),
            subscores: Subscores::default(),
            submitted_at: None,
            photo_ref: None,
        }
    }

    #[test]
    fn test_placeholder_number() {
        assert_eq!(placeholder_number("Unknown 3"), Some(3));
        assert_eq!(placeholder_number("Unknown 12"), Some(12));
        assert_eq!(placeholder_number("Unknown"), None);
        assert_eq!(placeholder_number("Unknown x"), None);
        assert_eq!(placeholder_number("unknown 3"), None);
        assert_eq!(placeholder_number("Unknown -1"), None);
    }

    #[test]
    fn test_merge_dedupes_and_orders() {
        let items = vec![item(1, "Emily", Some(8.0))];
        let explicit = vec![record(1, 1, "zoe"), record(2, 1, "Bea"), record(3, 1, "Bea")];
        let ratings = vec![
            rating(1, Some(1), "Emily", "Bea"),
            rating(2, Some(1), "Emily", "adam"),
            rating(3, Some(1), "Emily", "bea"),
            rating(4, Some(1), "Emily", "  "),
        ];
        let rosters = resolve_rosters(&items, &explicit, &ratings, &HistoricalCounts::new());
        let roster = &rosters[&1];
        assert_eq!(roster.names(), vec!["adam", "Bea", "bea", "zoe"]);
        assert_eq!(roster.attendees[0].source, AttendeeSource::Rater);
        assert_eq!(roster.attendees[1].source, AttendeeSource::Recorded);
    }

    #[test]
    fn test_ratings_for_missing_items_are_excluded() {
        let items = vec![item(1, "Emily", Some(8.0)), item(2, "Au Cheval", None)];
        let ratings = vec![
            rating(1, Some(42), "Emily", "Ghost"),
            rating(2, None, "Deleted Place — gone", "Ghost"),
            rating(3, None, "Au Cheval", "Legacy"),
        ];
        let rosters = resolve_rosters(&items, &[], &ratings, &HistoricalCounts::new());
        assert!(rosters[&1].is_empty());
        assert_eq!(rosters[&2].names(), vec!["Legacy"]);
    }

    #[test]
    fn test_history_adds_pending_placeholders_for_scored_items_only() {
        let items = vec![item(1, "Emily", Some(8.0)), item(2, "Au Cheval", None)];
        let explicit = vec![record(1, 1, "Dana"), record(2, 2, "Eli")];
        let history = HistoricalCounts::from([(1, 4), (2, 5)]);

        let rosters = resolve_rosters(&items, &explicit, &[], &history);
        assert_eq!(
            rosters[&1].names(),
            vec!["Dana", "Unknown 1", "Unknown 2", "Unknown 3"]
        );
        assert_eq!(rosters[&1].pending_placeholders().count(), 3);
        assert_eq!(rosters[&2].names(), vec!["Eli"]);
    }

    #[test]
    fn test_existing_placeholders_are_reused() {
        let items = vec![item(1, "Emily", Some(8.0))];
        let explicit = vec![record(1, 1, "Unknown 2"), record(2, 1, "Dana")];
        let history = HistoricalCounts::from([(1, 4)]);

        let rosters = resolve_rosters(&items, &explicit, &[], &history);
        let roster = &rosters[&1];
        assert_eq!(roster.names(), vec!["Dana", "Unknown 1", "Unknown 2", "Unknown 3"]);
        let pending: Vec<&str> = roster.pending_placeholders().map(|a| a.name.as_str()).collect();
        assert_eq!(pending, vec!["Unknown 1", "Unknown 3"]);
    }

    #[test]
    fn test_roster_over_history_adds_nothing() {
        let items = vec![item(1, "Emily", Some(8.0))];
        let explicit = vec![record(1, 1, "A"), record(2, 1, "B"), record(3, 1, "C")];
        let history = HistoricalCounts::from([(1, 2)]);
        let rosters = resolve_rosters(&items, &explicit, &[], &history);
        assert_eq!(rosters[&1].len(), 3);
        assert!(plan_backfill(&rosters).is_empty());
    }

    #[tokio::test]
    async fn test_backfill_is_idempotent() {
        let store = FakeStore::default();
        store
            .seed(
                Table::Results,
                vec![
                    serde_json::to_value(item(1, "Emily", Some(8.0))).unwrap(),
                    serde_json::to_value(item(2, "Au Cheval", Some(7.0))).unwrap(),
                ],
            )
            .await;
        store
            .seed(
                Table::Ratings,
                vec![json!({"id": 1, "burger_id": 1, "burger": "Emily", "name": "Dana",
                            "toppings": 8, "bun": 8, "doneness": 8, "flavor": 8})],
            )
            .await;
        let history = HistoricalCounts::from([(1, 3), (2, 2)]);

        let before = load_rosters(&store, &history).await.expect("rosters");
        let first = backfill_placeholders(&store, &history).await.expect("first");
        assert_eq!(first.created.len(), 4);
        assert!(first.failed.is_empty());

        let second = backfill_placeholders(&store, &history).await.expect("second");
        assert!(second.created.is_empty());
        assert_eq!(store.rows(Table::Attendees).await.len(), 4);

        let after = load_rosters(&store, &history).await.expect("rosters");
        for (id, roster) in &after {
            assert_eq!(roster.len(), before[id].len());
            assert_eq!(roster.pending_placeholders().count(), 0);
        }
        assert_eq!(after[&1].names(), vec!["Dana", "Unknown 1", "Unknown 2"]);
    }

    #[tokio::test]
    async fn test_backfill_reports_failed_inserts() {
        let store = FakeStore::default();
        store
            .seed(
                Table::Results,
                vec![serde_json::to_value(item(1, "Emily", Some(8.0))).unwrap()],
            )
            .await;
        store.failing_inserts.lock().await.insert(Table::Attendees);
        let history = HistoricalCounts::from([(1, 2)]);

        let report = backfill_placeholders(&store, &history).await.expect("backfill");
        assert!(report.created.is_empty());
        assert_eq!(
            report.failed,
            vec![(1, "Unknown 1".to_string()), (1, "Unknown 2".to_string())]
        );
        assert!(store.rows(Table::Attendees).await.is_empty());

        // Still pending, so a later run picks them up.
        store.failing_inserts.lock().await.clear();
        let retry = backfill_placeholders(&store, &history).await.expect("retry");
        assert_eq!(retry.created.len(), 2);
        assert!(retry.failed.is_empty());
    }
}
