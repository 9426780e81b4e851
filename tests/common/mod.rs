#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use lorekeeper::{AppState, app, db};
use sea_orm::{DatabaseConnection, DbErr};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_PAGE_SIZE_CAP: u64 = 100;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    db::connect("sqlite::memory:").await
}

pub async fn setup_test_app() -> Router {
    let db = setup_test_db().await.expect("Failed to setup test database");
    app(AppState::new(db, Some(TEST_PAGE_SIZE_CAP)))
}

/// An app with no page size cap, as with `MAX_PAGE_SIZE=0`.
pub async fn setup_uncapped_test_app() -> Router {
    let db = setup_test_db().await.expect("Failed to setup test database");
    app(AppState::new(db, None))
}

/// Send a request and decode the JSON body (`Value::Null` when empty).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = body.map_or_else(Body::empty, |json| Body::from(json.to_string()));
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}

/// Create a resource and return its `data` object.
pub async fn create(app: &Router, collection: &str, body: Value) -> Value {
    let (status, json) = send(app, "POST", &format!("/api/{collection}"), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create {collection} failed: {json}");
    json["data"].clone()
}

pub fn id_of(item: &Value) -> String {
    item["id"].as_str().expect("item has an id").to_string()
}

pub async fn create_species(app: &Router, name: &str) -> String {
    let species = create(
        app,
        "species",
        serde_json::json!({ "name": name, "desc": format!("The {name} folk") }),
    )
    .await;
    id_of(&species)
}
