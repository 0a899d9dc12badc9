use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use stockroom_api::app::{build_app, services::AppServices};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = build_app(Arc::new(AppServices::in_memory()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn register_store(client: &reqwest::Client, base_url: &str, key: &str) {
    let res = client
        .post(format!("{}/stores", base_url))
        .json(&json!({ "key": key, "name": key }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

async fn put_category(
    client: &reqwest::Client,
    base_url: &str,
    store: &str,
    key: &str,
    label: &str,
    sort_order: i64,
) {
    let res = client
        .put(format!("{}/stores/{}/categories/{}", base_url, store, key))
        .json(&json!({ "label": label, "sort_order": sort_order }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
}

async fn add_item(
    client: &reqwest::Client,
    base_url: &str,
    store: &str,
    category: &str,
    body: serde_json::Value,
) -> serde_json::Value {
    let res = client
        .post(format!(
            "{}/stores/{}/categories/{}/items",
            base_url, store, category
        ))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn shortage_rows(
    client: &reqwest::Client,
    base_url: &str,
    store: &str,
    query: &str,
) -> Vec<serde_json::Value> {
    let res = client
        .get(format!("{}/stores/{}/shortages{}", base_url, store, query))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let report: serde_json::Value = res.json().await.unwrap();
    report["rows"].as_array().unwrap().clone()
}

#[tokio::test]
async fn health_reports_service_name() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["service"], "stockroom");
}

#[tokio::test]
async fn shortage_report_for_unknown_store_is_404() {
    let srv = TestServer::spawn().await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/stores/ghost/shortages", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn shortage_report_follows_category_then_name_order() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register_store(&client, &srv.base_url, "lab").await;
    put_category(&client, &srv.base_url, "lab", "sauce", "소스류", 2).await;
    put_category(&client, &srv.base_url, "lab", "chicken", "닭고기", 1).await;

    // Both short; chicken category sorts first despite later insertion.
    add_item(
        &client,
        &srv.base_url,
        "lab",
        "sauce",
        json!({ "name": "간장", "current_stock": 1.0, "min_stock": 3.0, "unit": "L" }),
    )
    .await;
    add_item(
        &client,
        &srv.base_url,
        "lab",
        "chicken",
        json!({ "name": "닭", "current_stock": 8.0, "min_stock": 10.0, "unit": "kg" }),
    )
    .await;
    // At exactly the minimum: not short.
    add_item(
        &client,
        &srv.base_url,
        "lab",
        "sauce",
        json!({ "name": "고추장", "current_stock": 3.0, "min_stock": 3.0 }),
    )
    .await;
    // Threshold disabled: never short.
    add_item(
        &client,
        &srv.base_url,
        "lab",
        "sauce",
        json!({ "name": "소금", "current_stock": 0.0, "min_stock": 0.0 }),
    )
    .await;

    let rows = shortage_rows(&client, &srv.base_url, "lab", "").await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "닭");
    assert_eq!(rows[0]["category_label"], "닭고기");
    assert_eq!(rows[0]["need"], 2.0);
    assert_eq!(rows[1]["name"], "간장");
    assert_eq!(rows[1]["need"], 2.0);
}

#[tokio::test]
async fn urgency_order_sorts_by_descending_need() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register_store(&client, &srv.base_url, "lab").await;
    put_category(&client, &srv.base_url, "lab", "pantry", "팬트리", 1).await;

    add_item(
        &client,
        &srv.base_url,
        "lab",
        "pantry",
        json!({ "name": "쌀", "current_stock": 9.0, "min_stock": 10.0 }),
    )
    .await;
    add_item(
        &client,
        &srv.base_url,
        "lab",
        "pantry",
        json!({ "name": "밀가루", "current_stock": 1.0, "min_stock": 8.0 }),
    )
    .await;

    let rows = shortage_rows(&client, &srv.base_url, "lab", "?order=urgency").await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["name"], "밀가루");
    assert_eq!(rows[1]["name"], "쌀");
}

#[tokio::test]
async fn restock_removes_item_from_report() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register_store(&client, &srv.base_url, "lab").await;
    put_category(&client, &srv.base_url, "lab", "chicken", "닭고기", 1).await;
    let created = add_item(
        &client,
        &srv.base_url,
        "lab",
        "chicken",
        json!({ "name": "닭", "current_stock": 8.0, "min_stock": 10.0 }),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    assert_eq!(shortage_rows(&client, &srv.base_url, "lab", "").await.len(), 1);

    let res = client
        .patch(format!("{}/stores/lab/items/{}", srv.base_url, id))
        .json(&json!({ "current_stock": 12.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["current_stock"], 12.0);

    assert!(shortage_rows(&client, &srv.base_url, "lab", "").await.is_empty());
}

#[tokio::test]
async fn duplicate_item_name_in_category_is_409() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register_store(&client, &srv.base_url, "lab").await;
    put_category(&client, &srv.base_url, "lab", "sauce", "소스류", 1).await;
    add_item(
        &client,
        &srv.base_url,
        "lab",
        "sauce",
        json!({ "name": "간장" }),
    )
    .await;

    let res = client
        .post(format!("{}/stores/lab/categories/sauce/items", srv.base_url))
        .json(&json!({ "name": "간장" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn item_body_with_unknown_field_is_rejected() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register_store(&client, &srv.base_url, "lab").await;
    put_category(&client, &srv.base_url, "lab", "sauce", "소스류", 1).await;

    let res = client
        .post(format!("{}/stores/lab/categories/sauce/items", srv.base_url))
        .json(&json!({ "name": "간장", "surprise": true }))
        .send()
        .await
        .unwrap();
    // Unknown keys fail deserialization before the handler runs.
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn negative_stock_is_a_validation_error() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register_store(&client, &srv.base_url, "lab").await;
    put_category(&client, &srv.base_url, "lab", "sauce", "소스류", 1).await;

    let res = client
        .post(format!("{}/stores/lab/categories/sauce/items", srv.base_url))
        .json(&json!({ "name": "간장", "current_stock": -1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn malformed_item_id_is_400() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register_store(&client, &srv.base_url, "lab").await;

    let res = client
        .get(format!("{}/stores/lab/items/not-a-uuid", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn deleting_a_category_cascades_to_its_items() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register_store(&client, &srv.base_url, "lab").await;
    put_category(&client, &srv.base_url, "lab", "sauce", "소스류", 1).await;
    let created = add_item(
        &client,
        &srv.base_url,
        "lab",
        "sauce",
        json!({ "name": "간장", "current_stock": 0.0, "min_stock": 2.0 }),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let res = client
        .delete(format!("{}/stores/lab/categories/sauce", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/stores/lab/items/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    assert!(shortage_rows(&client, &srv.base_url, "lab", "").await.is_empty());
}

#[tokio::test]
async fn category_list_is_sorted_and_relabelable() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register_store(&client, &srv.base_url, "lab").await;
    put_category(&client, &srv.base_url, "lab", "sauce", "소스류", 2).await;
    put_category(&client, &srv.base_url, "lab", "chicken", "닭고기", 1).await;

    let res = client
        .get(format!("{}/stores/lab/categories", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cats: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(cats[0]["key"], "chicken");
    assert_eq!(cats[1]["key"], "sauce");

    // PUT on the same key replaces label and order.
    put_category(&client, &srv.base_url, "lab", "chicken", "육류", 3).await;
    let res = client
        .get(format!("{}/stores/lab/categories", srv.base_url))
        .send()
        .await
        .unwrap();
    let cats: Vec<serde_json::Value> = res.json().await.unwrap();
    assert_eq!(cats[0]["key"], "sauce");
    assert_eq!(cats[1]["label"], "육류");
}
