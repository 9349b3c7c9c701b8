use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{Club, Confirmation};
use crate::api::{insert_as, select_as, BlobStore, Direction, Query, Store, Table};
use crate::auth::{validate_new_password, verify_password};
use crate::error::ClubError;
use crate::models::{
    BurgerLocation, FormConfig, Member, NewBurger, NewMember, NewResultRow, RankedItem, Rating,
    FORM_CONFIG_ID,
};
use crate::ranking::{load_items, rerank_all, RerankReport};
use crate::roster::{self, BackfillReport};
use crate::summary::{RatingSummary, RECENT_RATINGS_LIMIT};
use crate::utils::{cmp_ignore_case, normalize_price, normalize_visit_date};

/// A burger as entered in the admin "add" form.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub restaurant: String,
    pub description: String,
    /// Free-form; normalised to `$N.NN`
    pub price: String,
    pub location: String,
    /// `YYYY-MM-DD`, or empty
    pub visit_date: String,
    /// From the selected address search result
    pub coordinates: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddedItem {
    pub item: RankedItem,
    pub location: BurgerLocation,
    pub ranks: RerankReport,
}

impl NewItem {
    fn validate(&self) -> Result<NewBurger, ClubError> {
        let restaurant = self.restaurant.trim();
        let description = self.description.trim();
        if restaurant.is_empty() {
            return Err(ClubError::MissingField("restaurant"));
        }
        if description.is_empty() {
            return Err(ClubError::MissingField("description"));
        }
        let price = normalize_price(&self.price)?;
        let (lat, lng) = self.coordinates.ok_or(ClubError::MissingCoordinates)?;
        Ok(NewBurger {
            restaurant: restaurant.to_string(),
            description: description.to_string(),
            price,
            location: self.location.trim().to_string(),
            date_of_visit: normalize_visit_date(&self.visit_date)?,
            lat,
            lng,
        })
    }
}

impl<S: Store + BlobStore> Club<S> {
    /// Digest the admin password is checked against: the form row's
    /// `admin_hash` when set, otherwise the configured fallback.
    pub async fn admin_hash(&self) -> String {
        let query = Query::all().columns("admin_hash").eq("id", FORM_CONFIG_ID);
        match select_as::<FormConfig, _>(&self.store, Table::FormConfig, &query).await {
            Ok(rows) => rows
                .into_iter()
                .next()
                .and_then(|row| row.admin_hash)
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| self.fallback_admin_hash.clone()),
            Err(e) => {
                warn!(error = %e, "Failed to read admin hash, using configured hash");
                self.fallback_admin_hash.clone()
            }
        }
    }

    /// Check the admin password. Returns the digest it matched so the
    /// caller can bind a session to it.
    pub async fn admin_login(&self, password: &str) -> Result<String> {
        if password.is_empty() {
            return Err(ClubError::MissingField("password").into());
        }
        let expected = self.admin_hash().await;
        if verify_password(password, &expected) {
            info!("Admin unlocked");
            Ok(expected)
        } else {
            Err(ClubError::IncorrectPassword.into())
        }
    }

    /// Store a new admin digest on the form row. Returns the digest.
    pub async fn change_password(&self, password: &str, confirmation: &str) -> Result<String> {
        let hash = validate_new_password(password, confirmation)?;
        self.write_form(json!({ "admin_hash": hash })).await?;
        info!("Admin password changed");
        Ok(hash)
    }

    /// Open the rating form for one burger.
    pub async fn open_form(&self, item_id: i64) -> Result<FormConfig> {
        let item = self.find_item(item_id).await?;
        let label = item.label();
        let form = self
            .write_form(json!({
                "is_open": true,
                "active_burger_id": item.id,
                "active_burger": label,
            }))
            .await?;
        info!(item_id, label = %label, "Rating form opened");
        Ok(form)
    }

    pub async fn close_form(&self) -> Result<FormConfig> {
        let form = self.write_form(json!({ "is_open": false })).await?;
        info!("Rating form closed");
        Ok(form)
    }

    /// Patch the singleton form row, creating it when missing.
    async fn write_form(&self, patch: Value) -> Result<FormConfig> {
        let id = FORM_CONFIG_ID.to_string();
        let mut rows = self
            .store
            .update(Table::FormConfig, patch.clone(), "id", &id)
            .await
            .context("Failed to update form")?;
        if rows.is_empty() {
            let mut record = patch;
            if let Some(obj) = record.as_object_mut() {
                obj.insert("id".to_string(), json!(FORM_CONFIG_ID));
            }
            rows = self
                .store
                .insert(Table::FormConfig, record)
                .await
                .context("Failed to create form row")?;
        }
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| crate::api::ApiError::InvalidResponse("form row missing".to_string()))?;
        serde_json::from_value(row).context("Failed to parse form row")
    }

    /// Add a burger: map coordinates go to `burgers`, the ranked entry is
    /// appended to `results` unrated, then ranks are recomputed.
    pub async fn add_item(&self, new_item: NewItem) -> Result<AddedItem> {
        let burger = new_item.validate()?;

        let location: BurgerLocation = insert_as(&self.store, Table::Burgers, &burger)
            .await
            .context("Failed to add burger location")?;

        let last: Vec<RankedItem> = select_as(
            &self.store,
            Table::Results,
            &Query::all().order_by("ranking", Direction::Desc).limit(1),
        )
        .await
        .context("Failed to read current rankings")?;
        let next_rank = last.first().map(|i| i.rank).unwrap_or(0) + 1;

        let row = NewResultRow {
            ranking: next_rank,
            burger_rating: None,
            restaurant: burger.restaurant,
            description: burger.description,
            price: burger.price,
            location: burger.location,
            date_of_visit: burger.date_of_visit,
        };
        let item: RankedItem = insert_as(&self.store, Table::Results, &row)
            .await
            .context("Failed to add burger to rankings")?;
        info!(item_id = item.id, rank = next_rank, name = %item.name, "Burger added");

        let ranks = rerank_all(&self.store).await?;
        Ok(AddedItem {
            item,
            location,
            ranks,
        })
    }

    /// Delete a burger from the rankings and close the rank gap.
    pub async fn delete_item(
        &self,
        item_id: i64,
        confirmation: Confirmation,
    ) -> Result<RerankReport> {
        confirmation.require()?;
        let item = self.find_item(item_id).await?;
        self.store
            .delete(Table::Results, "id", &item_id.to_string())
            .await
            .context("Failed to delete burger")?;
        info!(item_id, name = %item.name, rank = item.rank, "Burger deleted");
        rerank_all(&self.store).await
    }

    /// Items alphabetical by name then details, for the admin pick lists.
    pub async fn items_by_name(&self) -> Result<Vec<RankedItem>> {
        let mut items = load_items(&self.store).await?;
        items.sort_by(|a, b| {
            cmp_ignore_case(&a.name, &b.name).then_with(|| cmp_ignore_case(&a.details, &b.details))
        });
        Ok(items)
    }

    pub async fn rating_summary(&self) -> Result<RatingSummary> {
        let query = Query::all()
            .order_by("created_at", Direction::Desc)
            .limit(RECENT_RATINGS_LIMIT);
        let (items, ratings) = futures::try_join!(
            load_items(&self.store),
            select_as::<Rating, _>(&self.store, Table::Ratings, &query),
        )
        .context("Failed to load ratings")?;
        Ok(RatingSummary { items, ratings })
    }

    /// Alphabetical.
    pub async fn members(&self) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = select_as(&self.store, Table::Members, &Query::all())
            .await
            .context("Failed to load members")?;
        members.sort_by(|a, b| cmp_ignore_case(&a.name, &b.name));
        Ok(members)
    }

    pub async fn add_member(&self, name: &str) -> Result<Member> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClubError::MissingField("name").into());
        }
        if self.members().await?.iter().any(|m| m.name == name) {
            return Err(ClubError::DuplicateMember(name.to_string()).into());
        }
        let member: Member = insert_as(
            &self.store,
            Table::Members,
            &NewMember {
                name: name.to_string(),
            },
        )
        .await
        .context("Failed to add member")?;
        info!(member_id = member.id, name = %member.name, "Member added");
        Ok(member)
    }

    pub async fn remove_member(&self, member_id: i64) -> Result<()> {
        self.store
            .delete(Table::Members, "id", &member_id.to_string())
            .await
            .context("Failed to remove member")?;
        info!(member_id, "Member removed");
        Ok(())
    }

    /// Persist the placeholders rosters currently show for missing
    /// historical attendees.
    pub async fn backfill_placeholders(&self) -> Result<BackfillReport> {
        roster::backfill_placeholders(&self.store, &self.history).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{club, seeded_store};
    use super::*;
    use crate::api::fake::FakeStore;
    use crate::auth::DEFAULT_ADMIN_HASH;
    use crate::config::Config;
    use crate::roster::HistoricalCounts;
    use serde_json::json;

    fn new_item() -> NewItem {
        NewItem {
            restaurant: " Red Hook Tavern ".to_string(),
            description: "Dry-aged beef, American cheese".to_string(),
            price: "24".to_string(),
            location: "329 Van Brunt St, Brooklyn, NY 11231".to_string(),
            visit_date: "2024-03-05".to_string(),
            coordinates: Some((40.678, -74.012)),
        }
    }

    #[tokio::test]
    async fn test_login_falls_back_to_configured_hash() {
        let club = club(seeded_store(FakeStore::default()).await);
        assert_eq!(club.admin_hash().await, DEFAULT_ADMIN_HASH);
        assert_eq!(club.admin_login("password").await.expect("login"), DEFAULT_ADMIN_HASH);
        let err = club.admin_login("hunter2").await.expect_err("wrong");
        assert_eq!(err.downcast_ref::<ClubError>(), Some(&ClubError::IncorrectPassword));
    }

    #[tokio::test]
    async fn test_change_password_then_login() {
        let club = club(seeded_store(FakeStore::default()).await);
        let err = club.change_password("abc", "abc").await.expect_err("short");
        assert_eq!(err.downcast_ref::<ClubError>(), Some(&ClubError::PasswordTooShort(4)));
        let err = club.change_password("abcd", "abcx").await.expect_err("mismatch");
        assert_eq!(err.downcast_ref::<ClubError>(), Some(&ClubError::PasswordMismatch));

        let hash = club.change_password("grill", "grill").await.expect("change");
        assert_eq!(club.admin_hash().await, hash);
        assert!(club.admin_login("password").await.is_err());
        assert!(club.admin_login("grill").await.is_ok());
    }

    #[tokio::test]
    async fn test_open_and_close_form() {
        let club = club(seeded_store(FakeStore::default()).await);
        let form = club.open_form(1).await.expect("open");
        assert!(form.is_open);
        assert_eq!(form.active_item_id, Some(1));
        assert_eq!(form.active_item_label.as_deref(), Some("Minetta — Black Label"));

        let form = club.close_form().await.expect("close");
        assert!(!form.is_open);
        assert_eq!(form.active_item_id, Some(1));

        let err = club.open_form(42).await.expect_err("unknown");
        assert_eq!(err.downcast_ref::<ClubError>(), Some(&ClubError::UnknownItem(42)));
    }

    #[tokio::test]
    async fn test_open_form_creates_missing_row() {
        let store = FakeStore::default();
        store
            .seed(Table::Results, vec![json!({"id": 3, "ranking": 1, "restaurant": "Emily"})])
            .await;
        let club = club(store);
        let form = club.open_form(3).await.expect("open");
        assert_eq!(form.id, FORM_CONFIG_ID);
        assert_eq!(club.store().rows(Table::FormConfig).await.len(), 1);
    }

    #[tokio::test]
    async fn test_add_item_normalises_and_appends() {
        let club = club(seeded_store(FakeStore::default()).await);
        let added = club.add_item(new_item()).await.expect("add");

        assert_eq!(added.item.name, "Red Hook Tavern");
        assert_eq!(added.item.price, "$24.00");
        assert_eq!(added.item.visit_date, "3/5/2024");
        assert_eq!(added.item.rank, 3);
        assert_eq!(added.item.score, None);
        assert_eq!(added.location.coordinates(), Some((40.678, -74.012)));
        assert!(added.ranks.is_clean());

        let pins = club.map_pins().await.expect("pins");
        let pin = pins.iter().find(|p| p.title() == "Red Hook Tavern").expect("pin");
        assert_eq!(pin.coordinates, Some((40.678, -74.012)));
    }

    #[tokio::test]
    async fn test_add_item_validation() {
        let club = club(seeded_store(FakeStore::default()).await);
        let cases = [
            (
                NewItem { restaurant: " ".into(), ..new_item() },
                ClubError::MissingField("restaurant"),
            ),
            (
                NewItem { price: "".into(), ..new_item() },
                ClubError::MissingField("price"),
            ),
            (
                NewItem { coordinates: None, ..new_item() },
                ClubError::MissingCoordinates,
            ),
            (
                NewItem { visit_date: "March 5".into(), ..new_item() },
                ClubError::InvalidDate("March 5".into()),
            ),
        ];
        for (item, expected) in cases {
            let err = club.add_item(item).await.expect_err("invalid");
            assert_eq!(err.downcast_ref::<ClubError>(), Some(&expected));
        }
        assert!(club.store().rows(Table::Burgers).await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_item_needs_two_confirmations_and_reranks() {
        let club = club(seeded_store(FakeStore::default()).await);
        let err = club
            .delete_item(1, Confirmation::none().acknowledge())
            .await
            .expect_err("unconfirmed");
        assert_eq!(err.downcast_ref::<ClubError>(), Some(&ClubError::NotConfirmed));
        assert_eq!(club.store().rows(Table::Results).await.len(), 2);

        let report = club.delete_item(1, Confirmation::twice()).await.expect("delete");
        assert_eq!(report.updated, vec![2]);
        let items = club.rankings("", Default::default()).await.expect("rankings");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].rank, 1);
    }

    #[tokio::test]
    async fn test_items_by_name_orders_name_then_details() {
        let club = club(seeded_store(FakeStore::default()).await);
        club.store()
            .seed(
                Table::Results,
                vec![json!({"id": 3, "ranking": 3, "restaurant": "Emily", "description": "Classic"})],
            )
            .await;
        let items = club.items_by_name().await.expect("items");
        assert_eq!(items.iter().map(|i| i.id).collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_members() {
        let club = club(FakeStore::default());
        club.add_member("zoe").await.expect("add");
        let adam = club.add_member(" Adam ").await.expect("add");
        let err = club.add_member("Adam").await.expect_err("duplicate");
        assert_eq!(
            err.downcast_ref::<ClubError>(),
            Some(&ClubError::DuplicateMember("Adam".into()))
        );
        let names: Vec<String> = club
            .members()
            .await
            .expect("list")
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Adam", "zoe"]);

        club.remove_member(adam.id).await.expect("remove");
        assert_eq!(club.members().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn test_rating_summary_groups_recent_ratings() {
        let store = seeded_store(FakeStore::default()).await;
        store
            .seed(
                Table::Ratings,
                vec![
                    json!({"id": 1, "burger_id": 1, "burger": "Minetta — Black Label", "name": "Dana",
                           "toppings": 8, "bun": 8, "doneness": 8, "flavor": 8,
                           "created_at": "2024-02-01T20:00:00Z"}),
                    json!({"id": 2, "burger_id": 1, "burger": "Minetta — Black Label", "name": "Eli",
                           "toppings": 6, "bun": 7, "doneness": 8, "flavor": 9,
                           "created_at": "2024-02-01T21:00:00Z"}),
                ],
            )
            .await;
        let club = club(store);
        let summary = club.rating_summary().await.expect("summary");
        assert_eq!(summary.ratings[0].rater, "Eli");
        let groups = summary.groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].votes(), 2);
        assert_eq!(groups[0].means.bun, 7.5);
    }

    #[tokio::test]
    async fn test_backfill_uses_configured_history() {
        let store = seeded_store(FakeStore::default()).await;
        let config = Config {
            historical_counts: HistoricalCounts::from([(1, 2), (2, 3)]),
            ..Config::default()
        };
        let club = Club::new(store, &config);
        let report = club.backfill_placeholders().await.expect("backfill");
        // item 2 is unrated, so only item 1 gets placeholders
        assert_eq!(
            report.created,
            vec![(1, "Unknown 1".to_string()), (1, "Unknown 2".to_string())]
        );
        assert!(club.backfill_placeholders().await.expect("again").created.is_empty());
    }
}
