//! HTTP client for the remote REST store.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::client::Store;
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::table::Table;

/// [`Store`] backed by a PostgREST-compatible HTTP endpoint.
#[derive(Clone)]
pub struct RestStore {
    http: Client,
    config: StoreConfig,
}

impl RestStore {
    /// Build a client for the configured endpoint.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(StoreError::Http)?;

        Ok(Self { http, config })
    }

    fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=representation")
    }

    async fn rows(table: Table, response: Response) -> Result<Vec<Value>> {
        let status = response.status();
        if status == StatusCode::CONFLICT {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Conflict { table, message });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                table,
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await.map_err(StoreError::Http)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(rows)) => Ok(rows),
            Ok(Value::Object(row)) => Ok(vec![Value::Object(row)]),
            Ok(_) => Err(StoreError::EmptyResponse { table }),
            Err(source) => Err(StoreError::Decode { table, source }),
        }
    }
}

#[async_trait]
impl Store for RestStore {
    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>> {
        let url = self.config.table_url(table.name());
        debug!(table = %table, params = ?query.to_params(), "store select");

        let response = self
            .with_headers(self.http.get(&url))
            .query(&query.to_params())
            .send()
            .await?;

        Self::rows(table, response).await
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Vec<Value>> {
        let url = self.config.table_url(table.name());
        debug!(table = %table, "store insert");

        let response = self
            .with_headers(self.http.post(&url))
            .json(&row)
            .send()
            .await?;

        Self::rows(table, response).await
    }

    async fn update(&self, table: Table, query: &Query, patch: Value) -> Result<Vec<Value>> {
        let url = self.config.table_url(table.name());
        debug!(table = %table, params = ?query.to_params(), "store update");

        let response = self
            .with_headers(self.http.patch(&url))
            .query(&query.to_params())
            .json(&patch)
            .send()
            .await?;

        Self::rows(table, response).await
    }

    async fn delete(&self, table: Table, query: &Query) -> Result<usize> {
        let url = self.config.table_url(table.name());
        debug!(table = %table, params = ?query.to_params(), "store delete");

        let response = self
            .with_headers(self.http.delete(&url))
            .query(&query.to_params())
            .send()
            .await?;

        Ok(Self::rows(table, response).await?.len())
    }
}

impl std::fmt::Debug for RestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestStore")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
