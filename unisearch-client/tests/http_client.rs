use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use bytes::Bytes;
use serde_json::{Value, json};

use unisearch_client::api::{DirectoryApi, ExportTarget, HttpDirectoryClient};
use unisearch_client::error::DirectoryError;
use unisearch_client::module::{FetchOutcome, ResultView};
use unisearch_common::SuggestRequest;

#[derive(Clone, Default)]
struct Stub {
    page_hits: Arc<AtomicUsize>,
    export_queries: Arc<Mutex<Vec<String>>>,
}

async fn suggest(Json(body): Json<Value>) -> Json<Value> {
    match body["q"].as_str() {
        Some("Keio") => Json(json!({
            "suggestions": [{ "name": "Keio University", "country": "Japan" }]
        })),
        _ => Json(json!({ "detail": "no index" })),
    }
}

async fn universities(Json(body): Json<Value>) -> Json<Value> {
    let country = body["countries"][0].as_str().unwrap_or_default().to_string();
    Json(json!({
        "universities": [
            { "name": "Keio University", "abbreviation": "Keio", "country": country, "path": "/wiki/Keio_University" }
        ]
    }))
}

async fn page(
    State(stub): State<Stub>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<String, StatusCode> {
    stub.page_hits.fetch_add(1, Ordering::SeqCst);
    match params.get("page").map(String::as_str) {
        Some("1") => Ok("Name,Abbreviation,Country,Path\n\"Keio University\",\"Keio\",\"Japan\",\"/wiki/Keio_University\"\n".to_string()),
        Some("2") => Ok("name,abbreviation,country,path\nKyoto University,,Japan,\n".to_string()),
        Some("13") => Err(StatusCode::INTERNAL_SERVER_ERROR),
        _ => Ok(String::new()),
    }
}

async fn export_search(
    State(stub): State<Stub>,
    Query(params): Query<HashMap<String, String>>,
) -> Body {
    let q = params.get("q").cloned().unwrap_or_default();
    stub.export_queries.lock().unwrap().push(q);

    let chunks = vec![
        Ok::<_, std::io::Error>(Bytes::from_static(b"Name,Abbreviation,")),
        Ok(Bytes::new()),
        Ok(Bytes::from_static(b"Country,Path\n\"Keio University\",\"Keio\",\"Japan\",\"\"")),
    ];
    Body::from_stream(futures::stream::iter(chunks))
}

async fn spawn_stub() -> (String, Stub) {
    let stub = Stub::default();
    let app = Router::new()
        .route("/search/suggest", post(suggest))
        .route("/crawl/universities", post(universities))
        .route("/export/all_universities_pagination", get(page))
        .route("/export/search", get(export_search))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), stub)
}

fn client(base_url: &str) -> HttpDirectoryClient {
    HttpDirectoryClient::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn search_scenario_over_http() {
    let (base_url, _stub) = spawn_stub().await;
    let view = ResultView::new(Arc::new(client(&base_url)), 10, "unused");

    assert_eq!(view.navigate("?search=Keio").await, FetchOutcome::Applied(1));

    let rows = view.rows().await;
    assert_eq!(rows[0].name, "Keio University");
    assert_eq!(rows[0].abbreviation, "");
    assert_eq!(rows[0].country, "Japan");
}

#[tokio::test]
async fn missing_suggestions_field_is_no_results() {
    let (base_url, _stub) = spawn_stub().await;
    let response = client(&base_url)
        .suggest(&SuggestRequest::query("zzz"))
        .await
        .unwrap();
    assert!(response.into_universities().is_empty());
}

#[tokio::test]
async fn country_listing_over_http() {
    let (base_url, _stub) = spawn_stub().await;
    let view = ResultView::new(Arc::new(client(&base_url)), 10, "unused");

    assert_eq!(view.navigate("?country=Japan").await, FetchOutcome::Applied(1));
    assert_eq!(view.rows().await[0].detail_id(), Some("Keio_University"));
    assert!(!view.export_visible().await);
}

#[tokio::test]
async fn pages_are_fetched_once_over_http() {
    let (base_url, stub) = spawn_stub().await;
    let view = ResultView::new(Arc::new(client(&base_url)), 10, "unused");

    view.navigate("?search=All").await;
    view.next_page().await;
    assert_eq!(view.rows().await[0].name, "Kyoto University");
    view.prev_page().await;
    view.next_page().await;

    assert_eq!(stub.page_hits.load(Ordering::SeqCst), 2);
    assert_eq!(view.current_page(), 2);
}

#[tokio::test]
async fn past_the_end_page_is_empty() {
    let (base_url, _stub) = spawn_stub().await;
    let body = client(&base_url).page_csv(99, 10).await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let (base_url, _stub) = spawn_stub().await;
    let err = client(&base_url).page_csv(13, 10).await.unwrap_err();
    match err {
        DirectoryError::Status { status, url } => {
            assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
            assert!(url.ends_with("page=13&page_size=10"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn search_export_streams_to_file() {
    let (base_url, stub) = spawn_stub().await;
    let dir = tempfile::tempdir().unwrap();
    let view = ResultView::new(Arc::new(client(&base_url)), 10, dir.path());

    view.navigate("?search=Keio+University").await;
    let outcome = view.export_current().await.unwrap();

    assert_eq!(outcome.path, dir.path().join("Keio University_results.csv"));
    let written = std::fs::read_to_string(&outcome.path).unwrap();
    assert_eq!(
        written,
        "Name,Abbreviation,Country,Path\n\"Keio University\",\"Keio\",\"Japan\",\"\""
    );
    assert_eq!(
        stub.export_queries.lock().unwrap().as_slice(),
        ["Keio University".to_string()]
    );
    assert!(!view.is_downloading());
}

#[tokio::test]
async fn unknown_export_resource_fails_cleanly() {
    let (base_url, _stub) = spawn_stub().await;
    let result = client(&base_url)
        .open_export(&ExportTarget::Country("Japan".into()))
        .await;
    assert!(matches!(result, Err(DirectoryError::Status { status, .. }) if status == reqwest::StatusCode::NOT_FOUND));
}
