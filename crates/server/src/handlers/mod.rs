//! HTTP handlers.

pub mod auth_handler;
pub mod envelope;
pub mod health_handler;
pub mod mutation_handler;
pub mod page_handler;
pub mod profile_handler;
pub mod record_handler;

use axum::{
    routing::{delete, get},
    Router,
};

use crate::state::AppState;

pub use auth_handler::auth_routes;
pub use envelope::StatusEnvelope;
pub use health_handler::health_routes;
pub use page_handler::page_routes;
pub use profile_handler::profile_routes;

/// Create the business entity routes (reads, creates and deletes).
pub fn record_routes() -> Router<AppState> {
    use mutation_handler::*;
    use record_handler::*;

    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/balances", get(customer_balances))
        .route("/customers/delete", delete(delete_customer))
        .route("/productions", get(list_productions).post(create_production))
        .route("/productions/recent", get(recent_productions))
        .route("/productions/delete", delete(delete_production))
        .route("/sales", get(list_sales).post(create_sale))
        .route("/sales/delete", delete(delete_sale))
        .route("/payments", get(list_payments).post(create_payment))
        .route("/payments/delete", delete(delete_payment))
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/delete", delete(delete_expense))
}
