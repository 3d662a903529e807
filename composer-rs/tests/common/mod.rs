//! Shared fixtures: throwaway upstream services and app wiring

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use composer_rs::{AppConfig, AppState};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const API_KEY: &str = "test-key";

/// Serve `router` on an ephemeral local port, returning its base URL
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Stand-in for the auth and conversion services
#[derive(Default)]
pub struct Upstream {
    pub token_requests: AtomicUsize,
    pub conversion_requests: AtomicUsize,
}

impl Upstream {
    pub fn token_requests(&self) -> usize {
        self.token_requests.load(Ordering::SeqCst)
    }

    pub fn conversion_requests(&self) -> usize {
        self.conversion_requests.load(Ordering::SeqCst)
    }
}

async fn login(State(upstream): State<Arc<Upstream>>, Json(body): Json<Value>) -> Response {
    let n = upstream.token_requests.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;

    if body["client_id"] != CLIENT_ID || body["client_secret"] != CLIENT_SECRET {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "invalid client" }))).into_response();
    }
    Json(json!({
        "access_token": format!("token-{}", n),
        "uid": body["uid"],
        "expires_in": 300
    }))
    .into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v == format!("Bearer {}", API_KEY))
}

async fn html_to_json(
    State(upstream): State<Arc<Upstream>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    upstream.conversion_requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, r#"{"message":"bad key"}"#).into_response();
    }
    if body.contains("slow") {
        tokio::time::sleep(Duration::from_secs(3)).await;
    }
    if body.contains("<broken") {
        return (StatusCode::BAD_REQUEST, r#"{"message":"cannot parse html"}"#).into_response();
    }

    Json(json!({
        "page": {
            "title": "Imported",
            "template": { "version": "2.0.0" },
            "body": { "webFontsList": [] },
            "rows": [{
                "uuid": "r-1",
                "columns": [{
                    "grid-columns": 12,
                    "modules": [
                        {
                            "type": "mailup-bee-newsletter-modules-paragraph",
                            "descriptor": { "paragraph": { "html": body } }
                        },
                        {
                            "type": "mailup-bee-newsletter-modules-divider",
                            "descriptor": { "divider": { "style": { "border-top": "1px solid #ddd" } } }
                        }
                    ]
                }]
            }]
        },
        "comments": {}
    }))
    .into_response()
}

async fn json_to_html(
    State(upstream): State<Arc<Upstream>>,
    headers: HeaderMap,
    Json(document): Json<Value>,
) -> Response {
    upstream.conversion_requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, r#"{"message":"bad key"}"#).into_response();
    }
    let title = document["page"]["title"].as_str().unwrap_or_default().to_string();
    Json(json!({ "html": format!("<html><title>{}</title></html>", title) })).into_response()
}

/// Start the fake upstreams
pub async fn spawn_upstream() -> (String, Arc<Upstream>) {
    let upstream = Arc::new(Upstream::default());
    let router = Router::new()
        .route("/loginV2", post(login))
        .route("/v1/conversion/html-to-json", post(html_to_json))
        .route("/v1/conversion/json-to-html", post(json_to_html))
        .with_state(upstream.clone());
    (spawn(router).await, upstream)
}

/// Valid configuration pointing at the fake upstreams
pub fn test_config(upstream_url: &str) -> AppConfig {
    let mut config = AppConfig::development();
    config.auth.url = format!("{}/loginV2", upstream_url);
    config.auth.client_id = Some(CLIENT_ID.to_string());
    config.auth.client_secret = Some(CLIENT_SECRET.to_string());
    config.conversion.base_url = upstream_url.to_string();
    config.conversion.api_key = Some(API_KEY.to_string());
    config.server.upstream_timeout_seconds = 1;
    config
}

/// App state wired to fresh fake upstreams
pub async fn test_state() -> (Arc<AppState>, Arc<Upstream>) {
    let (url, upstream) = spawn_upstream().await;
    let config = test_config(&url);
    config.validate().unwrap();
    (Arc::new(AppState::from_config(&config).unwrap()), upstream)
}

/// Send one request through the router
pub async fn call(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = composer_rs::api::router(state.clone())
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

pub async fn call_json(state: &Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = call(state, request).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_html(uri: &str, html: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "text/html")
        .body(Body::from(html.to_string()))
        .unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}
