//! Dispatching into an axum `Router` without a network hop.

mod support;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use treaty::prelude::*;

fn app() -> Router {
    Router::new()
        .route(
            "/users/{id}",
            get(|Path(id): Path<String>| async move { Json(json!({"id": id})) }),
        )
        .route(
            "/users",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let trace = headers
                    .get("x-trace")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                (StatusCode::CREATED, Json(json!({"created": body, "trace": trace})))
            }),
        )
        .route(
            "/search",
            get(|Query(q): Query<HashMap<String, String>>| async move { Json(json!(q)) }),
        )
        .route(
            "/teapot",
            get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout").into_response() }),
        )
}

#[tokio::test]
async fn router_serves_dynamic_segments() {
    let client = Treaty::with_handler(app(), TreatyConfig::new());
    let resp = client.at("users").param(7).get(None).send().await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(support::data_value(resp), json!({"id": "7"}));
}

#[tokio::test]
async fn router_receives_json_bodies_and_interceptor_headers() {
    let config = TreatyConfig::new().with_on_request(request_fn(|_path, _config| {
        Ok(Some(RequestPatch::new().with_header("x-trace", "t-1")))
    }));
    let client = Treaty::with_handler(app(), config);

    let resp = client
        .at("users")
        .post(Some(json!({"name": "a"}).into()), None)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status, 201);
    assert_eq!(
        support::data_value(resp),
        json!({"created": {"name": "a"}, "trace": "t-1"})
    );
}

#[tokio::test]
async fn router_sees_the_query_string() {
    let client = Treaty::with_handler(app(), TreatyConfig::new());
    let resp = client
        .at("search")
        .get(Some(json!({"query": {"q": "rust lang"}}).into()))
        .send()
        .await
        .unwrap();
    assert_eq!(support::data_value(resp), json!({"q": "rust lang"}));
}

#[tokio::test]
async fn router_error_statuses_fill_the_error_slot() {
    let client = Treaty::with_handler(app(), TreatyConfig::new());
    let resp = client.at("teapot").get(None).send().await.unwrap();
    let err = resp.error.unwrap();
    assert_eq!(err.status, 418);
    assert_eq!(err.value, json!("short and stout"));
}

#[tokio::test]
async fn unknown_routes_are_404() {
    let client = Treaty::with_handler(app(), TreatyConfig::new());
    let resp = client.at("nowhere").get(None).send().await.unwrap();
    assert_eq!(resp.status, 404);
    assert!(resp.data.is_none());
}
