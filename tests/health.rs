mod common;

use axum::extract::State;
use siopao_storefront::routes::health::health_check;

#[tokio::test]
async fn health_check_reports_database() {
    let app = common::test_app().await;
    let response = health_check(State(app.state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "ok");
}
