use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use tracing::info;

use super::{Club, Confirmation};
use crate::api::{insert_as, select_as, BlobStore, Direction, Query, Store, Table};
use crate::error::ClubError;
use crate::models::{NewRestaurantRequest, NewSuggestion, RestaurantRequest, Suggestion};

/// A visitor's "you should try this place" form.
#[derive(Debug, Clone, Default)]
pub struct RestaurantRequestInput {
    pub name: String,
    pub restaurant: String,
    pub address: String,
    pub notes: String,
}

fn required(value: &str, field: &'static str) -> Result<String, ClubError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ClubError::MissingField(field))
    } else {
        Ok(value.to_string())
    }
}

fn optional(value: &str) -> Option<String> {
    Some(value.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl<S: Store + BlobStore> Club<S> {
    pub async fn submit_suggestion(&self, name: &str, text: &str) -> Result<Suggestion> {
        let row = NewSuggestion {
            name: required(name, "name")?,
            suggestion: required(text, "suggestion")?,
        };
        let suggestion: Suggestion = insert_as(&self.store, Table::Suggestions, &row)
            .await
            .context("Failed to submit suggestion")?;
        info!(suggestion_id = suggestion.id, "Suggestion received");
        Ok(suggestion)
    }

    pub async fn request_restaurant(
        &self,
        input: RestaurantRequestInput,
    ) -> Result<RestaurantRequest> {
        let row = NewRestaurantRequest {
            name: required(&input.name, "name")?,
            restaurant: required(&input.restaurant, "restaurant")?,
            address: optional(&input.address),
            notes: optional(&input.notes),
        };
        let request: RestaurantRequest = insert_as(&self.store, Table::RestaurantRequests, &row)
            .await
            .context("Failed to submit restaurant request")?;
        info!(request_id = request.id, restaurant = %request.restaurant, "Restaurant requested");
        Ok(request)
    }

    /// Newest first.
    pub async fn suggestions(&self) -> Result<Vec<Suggestion>> {
        select_as(
            &self.store,
            Table::Suggestions,
            &Query::all().order_by("created_at", Direction::Desc),
        )
        .await
        .context("Failed to load suggestions")
    }

    /// Newest first.
    pub async fn restaurant_requests(&self) -> Result<Vec<RestaurantRequest>> {
        select_as(
            &self.store,
            Table::RestaurantRequests,
            &Query::all().order_by("created_at", Direction::Desc),
        )
        .await
        .context("Failed to load restaurant requests")
    }

    /// Mark a suggestion addressed (stamping the time) or clear the mark.
    pub async fn set_suggestion_addressed(&self, id: i64, addressed: bool) -> Result<()> {
        let addressed_at = addressed.then(|| Utc::now().to_rfc3339());
        let patch = json!({ "addressed": addressed, "addressed_at": addressed_at });
        self.store
            .update(Table::Suggestions, patch, "id", &id.to_string())
            .await
            .context("Failed to update suggestion")?;
        Ok(())
    }

    pub async fn delete_suggestion(&self, id: i64, confirmation: Confirmation) -> Result<()> {
        confirmation.require()?;
        self.store
            .delete(Table::Suggestions, "id", &id.to_string())
            .await
            .context("Failed to delete suggestion")?;
        info!(suggestion_id = id, "Deleted suggestion");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::club;
    use super::*;
    use crate::api::fake::FakeStore;

    #[tokio::test]
    async fn test_suggestion_lifecycle() {
        let club = club(FakeStore::default());
        let err = club.submit_suggestion("Dana", "   ").await.expect_err("blank");
        assert_eq!(
            err.downcast_ref::<ClubError>(),
            Some(&ClubError::MissingField("suggestion"))
        );

        let s = club
            .submit_suggestion(" Dana ", " More smash burgers ")
            .await
            .expect("submit");
        assert_eq!(s.name, "Dana");
        assert_eq!(s.suggestion, "More smash burgers");
        assert!(!s.addressed);

        club.set_suggestion_addressed(s.id, true).await.expect("toggle");
        let listed = club.suggestions().await.expect("list");
        assert!(listed[0].addressed);
        assert!(listed[0].addressed_at.is_some());

        club.set_suggestion_addressed(s.id, false).await.expect("toggle");
        let listed = club.suggestions().await.expect("list");
        assert!(!listed[0].addressed);
        assert_eq!(listed[0].addressed_at, None);

        assert!(club.delete_suggestion(s.id, Confirmation::none()).await.is_err());
        club.delete_suggestion(s.id, Confirmation::twice()).await.expect("delete");
        assert!(club.suggestions().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_request_restaurant_drops_blank_optionals() {
        let club = club(FakeStore::default());
        let request = club
            .request_restaurant(RestaurantRequestInput {
                name: "Eli".to_string(),
                restaurant: "Hamburger America".to_string(),
                address: "  ".to_string(),
                notes: "Get the onion fried".to_string(),
            })
            .await
            .expect("request");
        assert_eq!(request.address, None);
        assert_eq!(request.notes.as_deref(), Some("Get the onion fried"));

        let rows = club.store().rows(Table::RestaurantRequests).await;
        assert!(rows[0].get("address").is_none());
        assert_eq!(club.restaurant_requests().await.expect("list").len(), 1);
    }
}
