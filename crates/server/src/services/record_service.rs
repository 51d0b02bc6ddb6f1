//! CRUD service over the bakery's business tables.
//!
//! Store rejections come back as `ServiceResult::Error` carrying the store's
//! message; only transport faults and undecodable answers are `Err`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use common::{AppError, AppResult};
use domain::{EntityKind, ServiceResult};

use crate::clients::{StoreClient, StoreQuery};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Primary key column shared by every business table.
const ID_COLUMN: &str = "id";

/// Row listing for one entity table.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub kind: EntityKind,
    pub order_by: Option<String>,
    pub descending: bool,
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Every row, newest first by the entity's date column.
    pub fn all(kind: EntityKind) -> Self {
        Self {
            kind,
            order_by: date_column(kind).map(str::to_string),
            descending: true,
            limit: None,
        }
    }

    /// The `limit` newest rows.
    pub fn recent(kind: EntityKind, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::all(kind)
        }
    }

    fn to_store_query(&self) -> StoreQuery {
        let mut query = StoreQuery::new();
        if let Some(column) = &self.order_by {
            query = query.order(column.as_str(), self.descending);
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        query
    }
}

fn date_column(kind: EntityKind) -> Option<&'static str> {
    match kind {
        EntityKind::Customer => None,
        EntityKind::Production => Some("production_date"),
        EntityKind::Sale => Some("sale_date"),
        EntityKind::Payment => Some("payment_date"),
        EntityKind::Expense => Some("expense_date"),
    }
}

/// Record service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RecordService: Send + Sync {
    /// Rows of one entity table
    async fn list(&self, query: ListQuery) -> AppResult<Vec<Value>>;

    /// Insert one row
    async fn create(&self, kind: EntityKind, row: Value) -> AppResult<ServiceResult>;

    /// Delete the row with `id`; a missing row is a service error
    async fn delete(&self, kind: EntityKind, id: String) -> AppResult<ServiceResult>;

    /// Reachability of the backing store
    async fn ping(&self) -> AppResult<()>;
}

/// Concrete implementation of RecordService over the table API.
pub struct RecordManager {
    store: Arc<StoreClient>,
}

impl RecordManager {
    pub fn new(store: Arc<StoreClient>) -> Self {
        Self { store }
    }

    async fn insert_row(&self, kind: EntityKind, row: &Value) -> AppResult<ServiceResult> {
        let rows = self.store.insert(kind.table(), row).await?;
        if rows.is_empty() {
            return Ok(ServiceResult::error(kind.create_failed_message()));
        }
        info!(entity = kind.label(), "record created");
        Ok(ServiceResult::success_with(format!(
            "{} created successfully",
            kind.label()
        )))
    }

    async fn delete_row(&self, kind: EntityKind, id: &str) -> AppResult<ServiceResult> {
        let rows = self.store.delete_eq(kind.table(), ID_COLUMN, id).await?;
        if rows.is_empty() {
            return Ok(ServiceResult::error(kind.not_found_message()));
        }
        info!(entity = kind.label(), id, "record deleted");
        Ok(ServiceResult::success_with(format!(
            "{} deleted successfully",
            kind.label()
        )))
    }
}

/// Fold a store rejection into the service result; keep other faults as errors.
fn rejected_as_result(result: AppResult<ServiceResult>) -> AppResult<ServiceResult> {
    match result {
        Err(AppError::Rejected(reason)) => Ok(ServiceResult::error(reason)),
        other => other,
    }
}

#[async_trait]
impl RecordService for RecordManager {
    async fn list(&self, query: ListQuery) -> AppResult<Vec<Value>> {
        self.store
            .select(query.kind.table(), &query.to_store_query())
            .await
    }

    async fn create(&self, kind: EntityKind, row: Value) -> AppResult<ServiceResult> {
        rejected_as_result(self.insert_row(kind, &row).await)
    }

    async fn delete(&self, kind: EntityKind, id: String) -> AppResult<ServiceResult> {
        debug!(entity = kind.label(), id = %id, "deleting record");
        rejected_as_result(self.delete_row(kind, &id).await)
    }

    async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
