//! REST client for the hosted store's table API.
//!
//! Tables are reached at `/rest/v1/<table>` with filters in the query string
//! (`column=eq.value`). Any non-success status is a store rejection and
//! carries the store's message; transport failures stay `AppError::Remote`.

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use common::AppResult;

use super::remote::{rejection, RemoteHttp};

const PREFER_HEADER: &str = "Prefer";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Row selection for `select`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreQuery {
    filters: Vec<(String, String)>,
    order: Option<(String, bool)>,
    limit: Option<usize>,
}

impl StoreQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep rows where `column` equals `value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    /// Order by `column`; `descending` puts the newest first.
    pub fn order(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order = Some((column.into(), descending));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(
            self.filters
                .iter()
                .map(|(column, value)| (column.clone(), format!("eq.{}", value))),
        );
        if let Some((column, descending)) = &self.order {
            let direction = if *descending { "desc" } else { "asc" };
            params.push(("order".to_string(), format!("{}.{}", column, direction)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// Table API client.
#[derive(Clone)]
pub struct StoreClient {
    remote: RemoteHttp,
}

impl StoreClient {
    pub fn new(remote: RemoteHttp) -> Self {
        Self { remote }
    }

    fn table_path(table: &str) -> String {
        format!("/rest/v1/{}", table)
    }

    /// Select rows matching `query`.
    pub async fn select(&self, table: &str, query: &StoreQuery) -> AppResult<Vec<Value>> {
        debug!(table, "store select");
        let response = self
            .remote
            .request(Method::GET, &Self::table_path(table))
            .query(&query.params())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(response.json().await?)
    }

    /// Insert one row and return the stored representation.
    pub async fn insert(&self, table: &str, row: &Value) -> AppResult<Vec<Value>> {
        debug!(table, "store insert");
        let response = self
            .remote
            .request(Method::POST, &Self::table_path(table))
            .header(PREFER_HEADER, RETURN_REPRESENTATION)
            .json(row)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(response.json().await?)
    }

    /// Update rows where `column` equals `value`; returns the updated rows.
    pub async fn update_eq(
        &self,
        table: &str,
        column: &str,
        value: &str,
        changes: &Value,
    ) -> AppResult<Vec<Value>> {
        debug!(table, column, "store update");
        let response = self
            .remote
            .request(Method::PATCH, &Self::table_path(table))
            .header(PREFER_HEADER, RETURN_REPRESENTATION)
            .query(&[(column, format!("eq.{}", value))])
            .json(changes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(response.json().await?)
    }

    /// Delete rows where `column` equals `value`; returns the deleted rows.
    pub async fn delete_eq(&self, table: &str, column: &str, value: &str) -> AppResult<Vec<Value>> {
        debug!(table, column, "store delete");
        let response = self
            .remote
            .request(Method::DELETE, &Self::table_path(table))
            .header(PREFER_HEADER, RETURN_REPRESENTATION)
            .query(&[(column, format!("eq.{}", value))])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        Ok(response.json().await?)
    }

    /// Reachability check against the API root.
    pub async fn ping(&self) -> AppResult<()> {
        let response = self.remote.request(Method::GET, "/rest/v1/").send().await?;
        if response.status().is_server_error() {
            return Err(rejection(response).await);
        }
        Ok(())
    }
}
