//! Create and delete routes for the business entities.
//!
//! Every mutation answers with the status envelope. A successful mutation
//! enqueues the entity's fixed tag set for invalidation; a failed one leaves
//! the cache alone.

use axum::{body::Bytes, extract::State, http::StatusCode, response::Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use common::AppError;
use domain::{EntityKind, NewCustomer, NewExpense, NewPayment, NewProduction, NewSale, ServiceResult};

use super::envelope::{failure, success};
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Identifier from a delete body: present, a string, and non-empty.
fn required_id(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Answer for a service call that returned.
fn service_outcome(state: &AppState, kind: EntityKind, result: ServiceResult) -> Response {
    match result {
        ServiceResult::Success { message } => {
            state.invalidator.invalidate(kind.invalidation_tags());
            success(message)
        }
        ServiceResult::Error { reason } => {
            warn!(entity = kind.label(), reason = %reason, "store rejected mutation");
            failure(StatusCode::INTERNAL_SERVER_ERROR, reason)
        }
    }
}

async fn delete_entity(
    state: &AppState,
    kind: EntityKind,
    payload: Bytes,
) -> Response {
    // Parsed regardless of content type; only bytes that are not JSON fail.
    let body: Value = match serde_json::from_slice(&payload) {
        Ok(body) => body,
        Err(e) => {
            error!(entity = kind.label(), error = %e, "unreadable delete request");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, kind.delete_failed_message());
        }
    };

    let Some(id) = required_id(&body, kind.id_field()) else {
        return failure(StatusCode::BAD_REQUEST, kind.missing_id_message());
    };

    match state.records.delete(kind, id).await {
        Ok(result) => service_outcome(state, kind, result),
        Err(e) => {
            error!(entity = kind.label(), error = %e, "delete failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, kind.delete_failed_message())
        }
    }
}

async fn create_entity<T: Serialize>(
    state: &AppState,
    kind: EntityKind,
    payload: Result<ValidatedJson<T>, AppError>,
) -> Response {
    let record = match payload {
        Ok(ValidatedJson(record)) => record,
        Err(e) => return failure(StatusCode::BAD_REQUEST, e.user_message()),
    };

    let row = match serde_json::to_value(&record) {
        Ok(row) => row,
        Err(e) => {
            error!(entity = kind.label(), error = %e, "unserializable record");
            return failure(StatusCode::INTERNAL_SERVER_ERROR, kind.create_failed_message());
        }
    };

    match state.records.create(kind, row).await {
        Ok(result) => service_outcome(state, kind, result),
        Err(e) => {
            error!(entity = kind.label(), error = %e, "create failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, kind.create_failed_message())
        }
    }
}

// =============================================================================
// Delete
// =============================================================================

/// Delete a customer
#[utoipa::path(
    delete,
    path = "/api/customers/delete",
    tag = "Customers",
    request_body = Object,
    responses(
        (status = 200, description = "Customer deleted; invalidates customers"),
        (status = 400, description = "Customer ID is required"),
        (status = 500, description = "Store rejected the delete")
    )
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    payload: Bytes,
) -> Response {
    delete_entity(&state, EntityKind::Customer, payload).await
}

/// Delete a production batch
#[utoipa::path(
    delete,
    path = "/api/productions/delete",
    tag = "Productions",
    request_body = Object,
    responses(
        (status = 200, description = "Production deleted; invalidates productions and last10"),
        (status = 400, description = "Production ID is required"),
        (status = 500, description = "Store rejected the delete")
    )
)]
pub async fn delete_production(
    State(state): State<AppState>,
    payload: Bytes,
) -> Response {
    delete_entity(&state, EntityKind::Production, payload).await
}

/// Delete a sale
#[utoipa::path(
    delete,
    path = "/api/sales/delete",
    tag = "Sales",
    request_body = Object,
    responses(
        (status = 200, description = "Sale deleted; invalidates sales, customers and productions"),
        (status = 400, description = "Sale ID is required"),
        (status = 500, description = "Store rejected the delete")
    )
)]
pub async fn delete_sale(
    State(state): State<AppState>,
    payload: Bytes,
) -> Response {
    delete_entity(&state, EntityKind::Sale, payload).await
}

/// Delete a payment
#[utoipa::path(
    delete,
    path = "/api/payments/delete",
    tag = "Payments",
    request_body = Object,
    responses(
        (status = 200, description = "Payment deleted; invalidates payments, customers, productions and sales"),
        (status = 400, description = "Payment ID is required"),
        (status = 500, description = "Store rejected the delete")
    )
)]
pub async fn delete_payment(
    State(state): State<AppState>,
    payload: Bytes,
) -> Response {
    delete_entity(&state, EntityKind::Payment, payload).await
}

/// Delete an expense
#[utoipa::path(
    delete,
    path = "/api/expenses/delete",
    tag = "Expenses",
    request_body = Object,
    responses(
        (status = 200, description = "Expense deleted; invalidates expenses"),
        (status = 400, description = "Expense ID is required"),
        (status = 500, description = "Store rejected the delete")
    )
)]
pub async fn delete_expense(
    State(state): State<AppState>,
    payload: Bytes,
) -> Response {
    delete_entity(&state, EntityKind::Expense, payload).await
}

// =============================================================================
// Create
// =============================================================================

/// Create a customer
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = NewCustomer,
    responses(
        (status = 200, description = "Customer created"),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_customer(
    State(state): State<AppState>,
    payload: Result<ValidatedJson<NewCustomer>, AppError>,
) -> Response {
    create_entity(&state, EntityKind::Customer, payload).await
}

/// Record a production batch
#[utoipa::path(
    post,
    path = "/api/productions",
    tag = "Productions",
    request_body = NewProduction,
    responses(
        (status = 200, description = "Production created"),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_production(
    State(state): State<AppState>,
    payload: Result<ValidatedJson<NewProduction>, AppError>,
) -> Response {
    create_entity(&state, EntityKind::Production, payload).await
}

/// Record a sale
#[utoipa::path(
    post,
    path = "/api/sales",
    tag = "Sales",
    request_body = NewSale,
    responses(
        (status = 200, description = "Sale created"),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_sale(
    State(state): State<AppState>,
    payload: Result<ValidatedJson<NewSale>, AppError>,
) -> Response {
    create_entity(&state, EntityKind::Sale, payload).await
}

/// Record a payment
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "Payments",
    request_body = NewPayment,
    responses(
        (status = 200, description = "Payment created"),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_payment(
    State(state): State<AppState>,
    payload: Result<ValidatedJson<NewPayment>, AppError>,
) -> Response {
    create_entity(&state, EntityKind::Payment, payload).await
}

/// Record an expense
#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Expenses",
    request_body = NewExpense,
    responses(
        (status = 200, description = "Expense created"),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_expense(
    State(state): State<AppState>,
    payload: Result<ValidatedJson<NewExpense>, AppError>,
) -> Response {
    create_entity(&state, EntityKind::Expense, payload).await
}
