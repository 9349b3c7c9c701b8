//! In-memory store for workflow tests.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use super::store::{BlobStore, Direction, Query, Store, Table};
use super::ApiError;

pub struct FakeStore {
    pub tables: Mutex<HashMap<Table, Vec<Value>>>,
    pub next_id: AtomicI64,
    pub update_calls: AtomicUsize,
    /// `(table, match value)` pairs whose update fails with a 500
    pub failing_updates: Mutex<HashSet<(Table, String)>>,
    /// Tables whose inserts fail with a 500
    pub failing_inserts: Mutex<HashSet<Table>>,
    pub fail_uploads: bool,
    pub uploads: Mutex<Vec<String>>,
}

impl Default for FakeStore {
    fn default() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1000),
            update_calls: AtomicUsize::new(0),
            failing_updates: Mutex::new(HashSet::new()),
            failing_inserts: Mutex::new(HashSet::new()),
            fail_uploads: false,
            uploads: Mutex::new(Vec::new()),
        }
    }
}

impl FakeStore {
    pub async fn seed(&self, table: Table, rows: Vec<Value>) {
        self.tables.lock().await.entry(table).or_default().extend(rows);
    }

    pub async fn rows(&self, table: Table) -> Vec<Value> {
        self.tables.lock().await.get(&table).cloned().unwrap_or_default()
    }

    pub fn updates(&self) -> usize {
        self.update_calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn server_error(what: &str) -> anyhow::Error {
        ApiError::ServerError {
            status: 500,
            body: format!("injected failure: {}", what),
        }
        .into()
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn matches(row: &Value, column: &str, value: &str) -> bool {
    row.get(column).map(|v| as_text(v) == value).unwrap_or(false)
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Null) | None, Some(Value::Null) | None) => Ordering::Equal,
        (Some(Value::Null) | None, _) => Ordering::Greater,
        (_, Some(Value::Null) | None) => Ordering::Less,
        (Some(x), Some(y)) => as_text(x).cmp(&as_text(y)),
    }
}

#[async_trait]
impl Store for FakeStore {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<Value> = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters().iter().all(|(c, v)| matches(row, c, v)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((column, direction)) = query.order() {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(column), b.get(column));
                match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }
        if let Some(limit) = query.row_limit() {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: Table, mut record: Value) -> Result<Vec<Value>> {
        if self.failing_inserts.lock().await.contains(&table) {
            return Err(Self::server_error(table.name()));
        }
        if let Some(obj) = record.as_object_mut() {
            if !obj.contains_key("id") {
                let id = self.next_id.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                obj.insert("id".to_string(), json!(id));
            }
            obj.entry("created_at")
                .or_insert_with(|| json!(Utc::now().to_rfc3339()));
        }
        self.tables
            .lock()
            .await
            .entry(table)
            .or_default()
            .push(record.clone());
        Ok(vec![record])
    }

    async fn update(
        &self,
        table: Table,
        patch: Value,
        column: &str,
        value: &str,
    ) -> Result<Vec<Value>> {
        self.update_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self
            .failing_updates
            .lock()
            .await
            .contains(&(table, value.to_string()))
        {
            return Err(Self::server_error(value));
        }

        let mut tables = self.tables.lock().await;
        let mut updated = Vec::new();
        for row in tables.entry(table).or_default().iter_mut() {
            if !matches(row, column, value) {
                continue;
            }
            if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
                for (k, v) in fields {
                    target.insert(k.clone(), v.clone());
                }
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, table: Table, column: &str, value: &str) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if let Some(rows) = tables.get_mut(&table) {
            rows.retain(|row| !matches(row, column, value));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FakeStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String> {
        if self.fail_uploads {
            return Err(Self::server_error(path));
        }
        self.uploads.lock().await.push(path.to_string());
        Ok(format!("https://fake.storage/{}/{}", bucket, path))
    }
}
