//! HTTP client for the hosted backend's REST and storage endpoints.
//!
//! This module provides `StoreClient`, the production implementation of
//! the `Store` and `BlobStore` traits.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::debug;

use super::store::{BlobStore, Query, Store, Table};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Path prefix of the row API
const REST_PATH: &str = "/rest/v1";

/// Path prefix of the object storage API
const STORAGE_PATH: &str = "/storage/v1";

/// HTTP request timeout in seconds.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Identifies this client to the backend and to the public geocoder.
const USER_AGENT: &str = concat!("burgerclub/", env!("CARGO_PKG_VERSION"));

/// Build the reqwest client every outbound request goes through.
pub(crate) fn http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

/// Client for the hosted store.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct StoreClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl StoreClient {
    /// Create a new client for the project at `base_url`
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = http_client(Duration::from_secs(REQUEST_TIMEOUT_SECS))?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    /// Build a client around an existing connection pool.
    pub fn with_client(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// The shared reqwest client, for collaborators such as the geocoder.
    pub fn http(&self) -> &Client {
        &self.client
    }

    fn rest_url(&self, table: Table) -> String {
        format!("{}{}/{}", self.base_url, REST_PATH, table)
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}{}/object/{}/{}", self.base_url, STORAGE_PATH, bucket, path)
    }

    /// Public URL of an uploaded object.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}{}/object/public/{}/{}", self.base_url, STORAGE_PATH, bucket, path)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert("apikey", header::HeaderValue::from_str(&self.api_key)?);
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Read a row array from a successful response. An empty body is no rows.
    async fn read_rows(response: reqwest::Response, table: Table) -> Result<Vec<Value>> {
        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read {} response body", table))?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&text)
            .with_context(|| format!("Failed to parse {} response", table))?
        {
            Value::Array(rows) => Ok(rows),
            Value::Object(row) => Ok(vec![Value::Object(row)]),
            other => Err(ApiError::InvalidResponse(format!(
                "expected rows from {}, got {}",
                table, other
            ))
            .into()),
        }
    }
}

#[async_trait]
impl Store for StoreClient {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>> {
        let url = self.rest_url(table);
        let response = self
            .client
            .get(&url)
            .headers(self.auth_headers()?)
            .header(header::ACCEPT, "application/json")
            .query(&query.to_pairs())
            .send()
            .await
            .with_context(|| format!("Failed to send select to {}", table))?;

        let response = Self::check_response(response).await?;
        let rows = Self::read_rows(response, table).await?;
        debug!(table = %table, rows = rows.len(), "Select completed");
        Ok(rows)
    }

    async fn insert(&self, table: Table, record: Value) -> Result<Vec<Value>> {
        let url = self.rest_url(table);
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await
            .with_context(|| format!("Failed to send insert to {}", table))?;

        let response = Self::check_response(response).await?;
        let rows = Self::read_rows(response, table).await?;
        debug!(table = %table, "Insert completed");
        Ok(rows)
    }

    async fn update(
        &self,
        table: Table,
        patch: Value,
        column: &str,
        value: &str,
    ) -> Result<Vec<Value>> {
        let url = self.rest_url(table);
        let response = self
            .client
            .patch(&url)
            .headers(self.auth_headers()?)
            .header("Prefer", "return=representation")
            .query(&[(column, format!("eq.{}", value))])
            .json(&patch)
            .send()
            .await
            .with_context(|| format!("Failed to send update to {}", table))?;

        let response = Self::check_response(response).await?;
        let rows = Self::read_rows(response, table).await?;
        debug!(table = %table, column, value, rows = rows.len(), "Update completed");
        Ok(rows)
    }

    async fn delete(&self, table: Table, column: &str, value: &str) -> Result<()> {
        let url = self.rest_url(table);
        let response = self
            .client
            .delete(&url)
            .headers(self.auth_headers()?)
            .query(&[(column, format!("eq.{}", value))])
            .send()
            .await
            .with_context(|| format!("Failed to send delete to {}", table))?;

        Self::check_response(response).await?;
        debug!(table = %table, column, value, "Delete completed");
        Ok(())
    }
}

#[async_trait]
impl BlobStore for StoreClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let url = self.object_url(bucket, path);
        let size = bytes.len();
        let response = self
            .client
            .post(&url)
            .headers(self.auth_headers()?)
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .with_context(|| format!("Failed to upload {}", path))?;

        Self::check_response(response).await?;
        debug!(bucket, path, size, "Upload completed");
        Ok(self.public_url(bucket, path))
    }
}
