//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycles through the router, plus one suite
//! against a real listener.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use recipes_api::{
    api::create_router,
    cache::MemoryCache,
    service::{RecipeService, ServiceOptions},
    store::{FileStore, MemoryStore},
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> Router {
    let service = RecipeService::new(
        Arc::new(MemoryStore::new()),
        Some(Arc::new(MemoryCache::new())),
        ServiceOptions::default(),
    );
    create_router(AppState::new(service))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// == Create ==

#[tokio::test]
async fn test_create_assigns_id_and_timestamp() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/recipes")
                .header("content-type", "application/json")
                .body(Body::from(
                    r#"{"name":"Soup","tags":["winter"],"ingredients":["water","salt"]}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert!(json["id"].as_str().is_some());
    assert!(json["publishedAt"].as_str().is_some());
    assert_eq!(json["name"], "Soup");
    assert_eq!(json["ingredients"], json!(["water", "salt"]));
    assert!(json.get("instructions").is_none());
}

#[tokio::test]
async fn test_create_ignores_client_id() {
    let app = create_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/recipes",
        Some(json!({"id": "client-chosen", "name": "Soup"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_ne!(json["id"], "client-chosen");
}

#[tokio::test]
async fn test_create_invalid_draft() {
    let app = create_test_app();

    let (status, json) = send(&app, "POST", "/recipes", Some(json!({"tags": [""]}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("tags"));
}

#[tokio::test]
async fn test_create_wrong_field_type() {
    let app = create_test_app();

    let (status, json) = send(&app, "POST", "/recipes", Some(json!({"tags": "winter"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json.get("error").is_some());
}

// == Lifecycle ==

#[tokio::test]
async fn test_soup_to_stew_lifecycle() {
    let app = create_test_app();

    let (status, created) = send(&app, "POST", "/recipes", Some(json!({"name": "Soup"}))).await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().unwrap().to_string();
    let t1 = created["publishedAt"].as_str().unwrap().to_string();

    let (status, listed) = send(&app, "GET", "/recipes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([created]));

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/recipes/{}", id),
        Some(json!({"name": "Stew"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id.as_str());

    let (status, fetched) = send(&app, "GET", &format!("/recipes/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Stew");
    let t2: chrono::DateTime<chrono::Utc> = fetched["publishedAt"].as_str().unwrap().parse().unwrap();
    let t1: chrono::DateTime<chrono::Utc> = t1.parse().unwrap();
    assert!(t2 > t1);

    let (status, listed) = send(&app, "GET", "/recipes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["name"], "Stew");

    let (status, deleted) = send(&app, "DELETE", &format!("/recipes/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], id.as_str());

    let (status, _) = send(&app, "GET", &format!("/recipes/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &format!("/recipes/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = send(&app, "GET", "/recipes", None).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_patch_endpoint() {
    let app = create_test_app();
    let (_, created) = send(
        &app,
        "POST",
        "/recipes",
        Some(json!({"name": "Soup", "tags": ["winter"]})),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, patched) = send(
        &app,
        "PATCH",
        &format!("/recipes/{}", id),
        Some(json!({"tags": null, "instructions": ["simmer"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["name"], "Soup");
    assert!(patched.get("tags").is_none());
    assert_eq!(patched["instructions"], json!(["simmer"]));
}

#[tokio::test]
async fn test_update_missing_recipe() {
    let app = create_test_app();
    let missing = recipes_api::models::RecipeId::new();

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/recipes/{}", missing),
        Some(json!({"name": "Stew"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains(&missing.to_string()));
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = create_test_app();

    let (status, _) = send(&app, "GET", "/recipes/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == Cache Behaviour ==

#[tokio::test]
async fn test_repeated_list_served_from_cache() {
    let app = create_test_app();
    send(&app, "POST", "/recipes", Some(json!({"name": "Soup"}))).await;

    let (_, first) = send(&app, "GET", "/recipes", None).await;
    let (_, second) = send(&app, "GET", "/recipes", None).await;
    assert_eq!(first, second);

    let (status, stats) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["store_queries"], 1);
    assert_eq!(stats["cache_hits"], 1);
    assert_eq!(stats["cache_misses"], 1);
    assert_eq!(stats["cache"]["hits"], 1);
    assert_eq!(stats["cache"]["writes"], 1);
}

#[tokio::test]
async fn test_create_after_list_is_visible() {
    let app = create_test_app();
    send(&app, "POST", "/recipes", Some(json!({"name": "Soup"}))).await;
    send(&app, "GET", "/recipes", None).await;

    let (_, stew) = send(&app, "POST", "/recipes", Some(json!({"name": "Stew"}))).await;
    let (_, listed) = send(&app, "GET", "/recipes", None).await;

    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.contains(&stew));
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

// == File Store ==

#[tokio::test]
async fn test_records_survive_restart_with_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.json");

    let build = |store: FileStore| {
        create_router(AppState::new(RecipeService::new(
            Arc::new(store),
            Some(Arc::new(MemoryCache::new())),
            ServiceOptions::default(),
        )))
    };

    let app = build(FileStore::open(&path).await.unwrap());
    let (_, created) = send(&app, "POST", "/recipes", Some(json!({"name": "Soup"}))).await;
    drop(app);

    let app = build(FileStore::open(&path).await.unwrap());
    let (_, listed) = send(&app, "GET", "/recipes", None).await;
    assert_eq!(listed, json!([created]));
}

// == Live Server ==

#[tokio::test]
async fn test_live_server_roundtrip() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, create_test_app()).await.unwrap();
    });

    let client = reqwest::Client::new();
    let base = format!("http://{}", addr);

    let created: Value = client
        .post(format!("{}/recipes", base))
        .json(&json!({"name": "Soup", "tags": ["quick"]}))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap()
        .json()
        .await
        .unwrap();

    let listed: Value = client
        .get(format!("{}/recipes", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed, json!([created]));

    let missing = client
        .get(format!("{}/recipes/{}", base, recipes_api::models::RecipeId::new()))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    server.abort();
}
