//! Cached reads and their invalidation by mutations.

mod support;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use bakery_server::cache::ViewCache;
use domain::{CacheTag, EntityKind};

use support::{delete_json, get, sale_row, TestApp};

/// Wait until the purge worker has dropped `tag`.
async fn wait_for_purge(app: &TestApp, tag: CacheTag, key: &str) {
    for _ in 0..100 {
        if app.views.get(tag, key).await.unwrap().is_none() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{} view was never purged", tag);
}

#[tokio::test]
async fn repeated_list_is_served_from_cache() {
    let app = TestApp::new();
    app.records.insert(EntityKind::Sale, sale_row("s1", "c1", 10.0));

    let (_, first) = app.send_json(get("/api/sales")).await;
    let (_, second) = app.send_json(get("/api/sales")).await;

    assert_eq!(first, second);
    assert_eq!(first[0]["id"], "s1");
    assert_eq!(app.records.list_count(), 1);
}

#[tokio::test]
async fn delete_makes_next_read_fresh() {
    let app = TestApp::with_purge_worker();
    app.records.insert(EntityKind::Sale, sale_row("s1", "c1", 10.0));
    app.records.insert(EntityKind::Sale, sale_row("s2", "c1", 4.0));

    let (_, before) = app.send_json(get("/api/sales")).await;
    assert_eq!(before.as_array().map(Vec::len), Some(2));

    let (status, _) = app
        .send_json(delete_json("/api/sales/delete", json!({ "saleId": "s1" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    wait_for_purge(&app, CacheTag::Sales, "all").await;

    let (_, after) = app.send_json(get("/api/sales")).await;
    assert_eq!(after.as_array().map(Vec::len), Some(1));
    assert_eq!(after[0]["id"], "s2");
}

#[tokio::test]
async fn failed_delete_keeps_cached_view() {
    let app = TestApp::with_purge_worker();
    app.records.insert(EntityKind::Expense, json!({
        "id": "e1",
        "category": "flour",
        "amount": 30.0,
        "expense_date": "2024-03-02",
    }));

    app.send_json(get("/api/expenses")).await;
    let (status, _) = app
        .send_json(delete_json("/api/expenses/delete", json!({ "expenseId": "missing" })))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.views.get(CacheTag::Expenses, "all").await.unwrap().is_some());
}

#[tokio::test]
async fn balances_subtract_payments_from_sales() {
    let app = TestApp::new();
    app.records
        .insert(EntityKind::Customer, json!({ "id": "c1", "name": "Corner Cafe" }));
    app.records
        .insert(EntityKind::Customer, json!({ "id": "c2", "name": "Market Stall" }));
    app.records.insert(EntityKind::Sale, sale_row("s1", "c1", 50.0));
    app.records.insert(EntityKind::Sale, sale_row("s2", "c1", 25.0));
    app.records.insert(
        EntityKind::Payment,
        json!({ "id": "p1", "customer_id": "c1", "amount": 60.0, "payment_date": "2024-03-05" }),
    );

    let (status, body) = app.send_json(get("/api/customers/balances")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["customer_id"], "c1");
    assert_eq!(body[0]["outstanding"], 15.0);
    assert_eq!(body[1]["customer_id"], "c2");
    assert_eq!(body[1]["outstanding"], 0.0);
}

#[tokio::test]
async fn payment_delete_purges_balances() {
    let app = TestApp::with_purge_worker();
    app.records
        .insert(EntityKind::Customer, json!({ "id": "c1", "name": "Corner Cafe" }));
    app.records.insert(
        EntityKind::Payment,
        json!({ "id": "p1", "customer_id": "c1", "amount": 5.0, "payment_date": "2024-03-05" }),
    );

    app.send_json(get("/api/customers/balances")).await;
    assert!(app.views.get(CacheTag::Customers, "balances").await.unwrap().is_some());

    app.send_json(delete_json("/api/payments/delete", json!({ "paymentId": "p1" })))
        .await;

    wait_for_purge(&app, CacheTag::Customers, "balances").await;
}

#[tokio::test]
async fn recent_productions_are_cached_under_last10() {
    let app = TestApp::new();
    for i in 0..12 {
        app.records.insert(
            EntityKind::Production,
            json!({
                "id": format!("p{}", i),
                "product": "Baguette",
                "quantity": 10.0,
                "production_date": "2024-03-01",
            }),
        );
    }

    let (status, body) = app.send_json(get("/api/productions/recent")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(10));
    assert!(app.views.get(CacheTag::Last10, "recent").await.unwrap().is_some());
}

#[tokio::test]
async fn store_fault_on_read_is_a_generic_error() {
    let app = TestApp::new();
    app.records.fail();

    let (status, body) = app.send_json(get("/api/customers")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn health_reports_both_dependencies() {
    let app = TestApp::new();

    let (status, body) = app.send_json(get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["cache"]["status"], "healthy");
    assert_eq!(body["services"]["store"]["status"], "healthy");
}

#[tokio::test]
async fn unreachable_store_degrades_health() {
    let app = TestApp::new();
    app.records.fail();

    let (status, body) = app.send_json(get("/health")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["store"]["status"], "unhealthy");
}
