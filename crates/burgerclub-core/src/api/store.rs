//! The storage seam between the club workflows and the hosted backend.
//!
//! `Store` is the four-operation row contract (select, insert, update,
//! delete) and `BlobStore` is the photo upload contract. `StoreClient`
//! implements both over HTTP; tests substitute an in-memory store.

use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::ApiError;

/// Tables exposed by the hosted backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Results,
    Burgers,
    Gallery,
    Ratings,
    Attendees,
    Members,
    FormConfig,
    Suggestions,
    RestaurantRequests,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Results => "results",
            Table::Burgers => "burgers",
            Table::Gallery => "gallery",
            Table::Ratings => "ratings",
            Table::Attendees => "attendees",
            Table::Members => "members",
            Table::FormConfig => "form_config",
            Table::Suggestions => "suggestions",
            Table::RestaurantRequests => "restaurant_requests",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Row selection: projected columns, equality filters, one ordering, limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    columns: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    /// Select every column of every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push((column.to_string(), value.to_string()));
        self
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some((column.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    pub fn order(&self) -> Option<(&str, Direction)> {
        self.order.as_ref().map(|(c, d)| (c.as_str(), *d))
    }

    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Render as REST query-string pairs (`select=*`, `id=eq.1`, `order=ranking.asc`).
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![(
            "select".to_string(),
            self.columns.clone().unwrap_or_else(|| "*".to_string()),
        )];
        for (column, value) in &self.filters {
            pairs.push((column.clone(), format!("eq.{}", value)));
        }
        if let Some((column, direction)) = &self.order {
            pairs.push(("order".to_string(), format!("{}.{}", column, direction.as_str())));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

/// Row-level CRUD over the hosted tables.
#[async_trait]
pub trait Store: Send + Sync {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>>;

    /// Insert one record, returning the stored representation.
    async fn insert(&self, table: Table, record: Value) -> Result<Vec<Value>>;

    /// Patch every row where `column == value`, returning the updated rows.
    async fn update(&self, table: Table, patch: Value, column: &str, value: &str)
        -> Result<Vec<Value>>;

    async fn delete(&self, table: Table, column: &str, value: &str) -> Result<()>;
}

/// Photo storage that hands back a public URL for each upload.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String>;
}

/// Select rows and decode them into `T`.
pub async fn select_as<T, S>(store: &S, table: Table, query: &Query) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    S: Store + ?Sized,
{
    let rows = store.select(table, query).await?;
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .with_context(|| format!("Failed to parse rows from {}", table))
}

/// Insert a record and decode the stored row.
pub async fn insert_as<T, B, S>(store: &S, table: Table, record: &B) -> Result<T>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
    S: Store + ?Sized,
{
    let body = serde_json::to_value(record)
        .with_context(|| format!("Failed to encode record for {}", table))?;
    let row = store
        .insert(table, body)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            ApiError::InvalidResponse(format!("insert into {} returned no row", table))
        })?;
    serde_json::from_value(row).with_context(|| format!("Failed to parse inserted {} row", table))
}
