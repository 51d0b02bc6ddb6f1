//! Cached read routes for the business entities.
//!
//! Each view is cached under the tag its source entity invalidates, so a
//! mutation makes the next read go back to the store.

use axum::{extract::State, response::Json};
use serde::de::DeserializeOwned;
use serde_json::Value;

use common::{AppError, AppResult};
use domain::{
    compute_balances, CacheTag, Customer, CustomerBalance, EntityKind, Expense, Payment,
    Production, Sale, RECENT_PRODUCTIONS_LIMIT,
};

use crate::cache::cached_view;
use crate::services::{ListQuery, RecordService};
use crate::state::AppState;

/// Cache key of the full listing of a table
const VIEW_ALL: &str = "all";
/// Cache key of the recent productions listing
const VIEW_RECENT: &str = "recent";
/// Cache key of the balance aggregate
const VIEW_BALANCES: &str = "balances";

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> AppResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(AppError::from))
        .collect()
}

async fn fetch<T: DeserializeOwned>(records: &dyn RecordService, query: ListQuery) -> AppResult<Vec<T>> {
    decode_rows(records.list(query).await?)
}

async fn list_view<T>(state: &AppState, kind: EntityKind) -> AppResult<Json<Vec<T>>>
where
    T: serde::Serialize + DeserializeOwned,
{
    let records = state.records.as_ref();
    let rows = cached_view(state.views.as_ref(), kind.own_tag(), VIEW_ALL, || {
        fetch(records, ListQuery::all(kind))
    })
    .await?;
    Ok(Json(rows))
}

/// List customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    responses((status = 200, description = "All customers", body = Vec<Customer>))
)]
pub async fn list_customers(State(state): State<AppState>) -> AppResult<Json<Vec<Customer>>> {
    list_view(&state, EntityKind::Customer).await
}

/// List production batches, newest first
#[utoipa::path(
    get,
    path = "/api/productions",
    tag = "Productions",
    responses((status = 200, description = "All production batches", body = Vec<Production>))
)]
pub async fn list_productions(State(state): State<AppState>) -> AppResult<Json<Vec<Production>>> {
    list_view(&state, EntityKind::Production).await
}

/// Ten most recent production batches
#[utoipa::path(
    get,
    path = "/api/productions/recent",
    tag = "Productions",
    responses((status = 200, description = "Most recent production batches", body = Vec<Production>))
)]
pub async fn recent_productions(State(state): State<AppState>) -> AppResult<Json<Vec<Production>>> {
    let records = state.records.as_ref();
    let rows = cached_view(state.views.as_ref(), CacheTag::Last10, VIEW_RECENT, || {
        fetch(
            records,
            ListQuery::recent(EntityKind::Production, RECENT_PRODUCTIONS_LIMIT),
        )
    })
    .await?;
    Ok(Json(rows))
}

/// List sales, newest first
#[utoipa::path(
    get,
    path = "/api/sales",
    tag = "Sales",
    responses((status = 200, description = "All sales", body = Vec<Sale>))
)]
pub async fn list_sales(State(state): State<AppState>) -> AppResult<Json<Vec<Sale>>> {
    list_view(&state, EntityKind::Sale).await
}

/// List payments, newest first
#[utoipa::path(
    get,
    path = "/api/payments",
    tag = "Payments",
    responses((status = 200, description = "All payments", body = Vec<Payment>))
)]
pub async fn list_payments(State(state): State<AppState>) -> AppResult<Json<Vec<Payment>>> {
    list_view(&state, EntityKind::Payment).await
}

/// List expenses, newest first
#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Expenses",
    responses((status = 200, description = "All expenses", body = Vec<Expense>))
)]
pub async fn list_expenses(State(state): State<AppState>) -> AppResult<Json<Vec<Expense>>> {
    list_view(&state, EntityKind::Expense).await
}

/// Outstanding balance per customer
#[utoipa::path(
    get,
    path = "/api/customers/balances",
    tag = "Customers",
    responses((status = 200, description = "Sales total minus payments per customer", body = Vec<CustomerBalance>))
)]
pub async fn customer_balances(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CustomerBalance>>> {
    let records = state.records.as_ref();
    let balances = cached_view(state.views.as_ref(), CacheTag::Customers, VIEW_BALANCES, || async move {
        let customers: Vec<Customer> = fetch(records, ListQuery::all(EntityKind::Customer)).await?;
        let sales: Vec<Sale> = fetch(records, ListQuery::all(EntityKind::Sale)).await?;
        let payments: Vec<Payment> = fetch(records, ListQuery::all(EntityKind::Payment)).await?;
        Ok(compute_balances(&customers, &sales, &payments))
    })
    .await?;
    Ok(Json(balances))
}
