//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against an in-memory
//! store and a scripted fetcher.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use bytes::Bytes;
use icon_cache::{
    api::{create_router, ICON_SOURCE_HEADER},
    cache::MemoryBlobStore,
    fetch::ContentFetcher,
    imaging, AppState, IconError, IconService,
};
use image::{Rgba, RgbaImage};
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

// == Helper Types ==

/// Serves canned bodies by URL; unknown URLs fail like an unreachable host.
struct ScriptedFetcher {
    bodies: HashMap<String, Vec<u8>>,
    calls: AtomicUsize,
}

#[async_trait]
impl ContentFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &Url) -> icon_cache::Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.bodies
            .get(url.as_str())
            .map(|body| Bytes::from(body.clone()))
            .ok_or_else(|| IconError::Transport(format!("no route to {}", url)))
    }
}

// == Helper Functions ==

const PNG_URL: &str = "https://icons.example/pkg/icon.png";
const SVG_URL: &str = "https://icons.example/pkg/logo.svg";

fn source_png() -> Vec<u8> {
    imaging::encode_png(&RgbaImage::from_pixel(256, 128, Rgba([30, 144, 255, 255]))).unwrap()
}

fn source_svg() -> Vec<u8> {
    br##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><circle cx="12" cy="12" r="10" fill="#2a9d8f"/></svg>"##.to_vec()
}

fn create_test_app() -> (Router, Arc<ScriptedFetcher>, Arc<MemoryBlobStore>) {
    let fetcher = Arc::new(ScriptedFetcher {
        bodies: HashMap::from([
            (PNG_URL.to_string(), source_png()),
            (SVG_URL.to_string(), source_svg()),
        ]),
        calls: AtomicUsize::new(0),
    });
    let blobs = Arc::new(MemoryBlobStore::new());
    let service = IconService::new(blobs.clone(), fetcher.clone(), 86_400);
    (create_router(AppState::new(service, 64)), fetcher, blobs)
}

fn icon_uri(url: &str, width: u32, height: u32) -> String {
    format!(
        "/icon?url={}&width={}&height={}",
        url.replace(':', "%3A").replace('/', "%2F"),
        width,
        height
    )
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

fn source_of(response: &axum::response::Response) -> String {
    response.headers()[ICON_SOURCE_HEADER]
        .to_str()
        .unwrap()
        .to_string()
}

// == Icon Endpoint Tests ==

#[tokio::test]
async fn test_png_icon_cached_then_served() {
    let (app, fetcher, blobs) = create_test_app();
    let uri = icon_uri(PNG_URL, 64, 64);

    let first = get(&app, &uri).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.headers()["content-type"], "image/png");
    assert_eq!(source_of(&first), "network");
    let first_body = body_bytes(first).await;

    let decoded = imaging::decode(&first_body).unwrap();
    assert_eq!(decoded.dimensions(), (64, 32));

    let second = get(&app, &uri).await;
    assert_eq!(source_of(&second), "cache");
    assert_eq!(body_bytes(second).await, first_body);

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(blobs.upload_count(), 1);
}

#[tokio::test]
async fn test_svg_icon_fills_requested_size() {
    let (app, _, _) = create_test_app();

    let response = get(&app, &icon_uri(SVG_URL, 96, 48)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(source_of(&response), "network");

    let decoded = imaging::decode(&body_bytes(response).await).unwrap();
    assert_eq!(decoded.dimensions(), (96, 48));
}

#[tokio::test]
async fn test_unreachable_icon_returns_error_icon() {
    let (app, _, blobs) = create_test_app();

    let response = get(&app, &icon_uri("https://icons.example/missing.png", 64, 64)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(source_of(&response), "fallback");

    let decoded = imaging::decode(&body_bytes(response).await).unwrap();
    assert_eq!(decoded, icon_cache::fallback::error_icon());
    assert_eq!(blobs.upload_count(), 0);
}

#[tokio::test]
async fn test_missing_url_returns_empty_icon() {
    let (app, fetcher, _) = create_test_app();

    let response = get(&app, "/icon").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(source_of(&response), "fallback");

    let decoded = imaging::decode(&body_bytes(response).await).unwrap();
    assert_eq!(decoded, icon_cache::fallback::empty_icon());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_oversized_request_rejected() {
    let (app, fetcher, _) = create_test_app();

    let response = get(&app, &icon_uri(PNG_URL, 100_000, 64)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = body_bytes(response).await;
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["error"].as_str().unwrap().contains("width"));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

// == Fallback Endpoint Tests ==

#[tokio::test]
async fn test_fallback_endpoints_are_stable() {
    let (app, _, blobs) = create_test_app();

    for uri in ["/icon/empty", "/icon/error"] {
        let first = body_bytes(get(&app, uri).await).await;
        let second = body_bytes(get(&app, uri).await).await;
        assert_eq!(first, second, "{} should be idempotent", uri);
    }
    assert_eq!(blobs.upload_count(), 0);
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let (app, _, _) = create_test_app();

    get(&app, &icon_uri(PNG_URL, 32, 32)).await;
    get(&app, &icon_uri(PNG_URL, 32, 32)).await;
    get(&app, &icon_uri("https://icons.example/gone.png", 32, 32)).await;

    let response = get(&app, "/stats").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 2);
    assert_eq!(json["fetches"], 2);
    assert_eq!(json["writes"], 1);
    assert_eq!(json["fallbacks"], 1);
    assert_eq!(json["total_entries"], 1);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _, _) = create_test_app();

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}
