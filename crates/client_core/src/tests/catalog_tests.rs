use super::*;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Router,
};
use shared::protocol::{RemotePhoto, RemotePhotoLinks, RemotePhotoUrls};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Debug, Clone)]
struct RecordedRequest {
    authorization: Option<String>,
    params: HashMap<String, String>,
}

#[derive(Clone)]
struct MockCatalog {
    status: StatusCode,
    body: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockCatalog {
    fn responding(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            hits: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn ok_with_photos(count: usize, total_pages: u32) -> Self {
        let results = (0..count)
            .map(|i| RemotePhoto {
                id: format!("photo-{i}"),
                urls: RemotePhotoUrls {
                    small: format!("https://images.test/{i}?w=400"),
                    full: format!("https://images.test/{i}"),
                },
                alt_description: (i % 2 == 0).then(|| format!("photo number {i}")),
                links: RemotePhotoLinks {
                    download_location: format!("https://api.test/photos/{i}/download"),
                },
            })
            .collect();
        let body = SearchPhotosResponse {
            total: Some(count as u64),
            total_pages,
            results,
        };
        Self::responding(
            StatusCode::OK,
            serde_json::to_string(&body).expect("serialize body"),
        )
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn handle_catalog(
    State(state): State<MockCatalog>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.requests.lock().await.push(RecordedRequest {
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        params,
    });
    (state.status, state.body.clone())
}

async fn spawn_catalog_server(state: MockCatalog) -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/search/photos", get(handle_catalog))
        .route("/photos/:id/download", get(handle_catalog))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}"))
}

fn query(text: &str) -> SearchQuery {
    SearchQuery::new(text).expect("query")
}

#[tokio::test]
async fn search_sends_credential_and_paging_parameters() {
    let mock = MockCatalog::ok_with_photos(3, 7);
    let base_url = spawn_catalog_server(mock.clone()).await.expect("spawn server");
    let client = CatalogClient::new(format!("{base_url}/"), "test-key");

    let page = client
        .search(&query("red fox & friends"), PageNumber::new(2).expect("page"))
        .await
        .expect("search");

    assert_eq!(page.results.len(), 3);
    assert_eq!(page.total_pages, 7);
    assert_eq!(page.results[0].id, "photo-0");
    assert_eq!(page.results[1].alt_description, None);

    let requests = mock.requests.lock().await;
    assert_eq!(requests.len(), 1);
    let recorded = &requests[0];
    assert_eq!(recorded.authorization.as_deref(), Some("Client-ID test-key"));
    assert_eq!(recorded.params.get("page").map(String::as_str), Some("2"));
    assert_eq!(recorded.params.get("per_page").map(String::as_str), Some("25"));
    assert_eq!(
        recorded.params.get("query").map(String::as_str),
        Some("red fox & friends")
    );
}

#[tokio::test]
async fn search_caps_results_at_page_size() {
    let mock = MockCatalog::ok_with_photos(40, 3);
    let base_url = spawn_catalog_server(mock).await.expect("spawn server");
    let client = CatalogClient::new(base_url, "test-key");

    let page = client
        .search(&query("nature"), PageNumber::FIRST)
        .await
        .expect("search");

    assert_eq!(page.results.len(), RESULTS_PER_PAGE as usize);
    assert_eq!(page.total_pages, 3);
}

#[tokio::test]
async fn empty_result_is_success_with_at_least_one_page() {
    let mock = MockCatalog::responding(StatusCode::OK, r#"{"total":0,"total_pages":0,"results":[]}"#);
    let base_url = spawn_catalog_server(mock).await.expect("spawn server");
    let client = CatalogClient::new(base_url, "test-key");

    let page = client
        .search(&query("zzzzqqq"), PageNumber::FIRST)
        .await
        .expect("empty search is not an error");

    assert!(page.results.is_empty());
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn missing_credential_makes_no_request() {
    let mock = MockCatalog::ok_with_photos(1, 1);
    let base_url = spawn_catalog_server(mock.clone()).await.expect("spawn server");
    let client = CatalogClient::new(base_url, "  ");

    assert!(!client.has_credential());
    let err = client
        .search(&query("nature"), PageNumber::FIRST)
        .await
        .expect_err("must fail");
    assert_eq!(err, ApiError::MissingCredential);

    let err = client
        .track_download("https://api.test/photos/1/download")
        .await
        .expect_err("must fail");
    assert_eq!(err, ApiError::MissingCredential);
    assert_eq!(mock.hits(), 0);
}

#[tokio::test]
async fn unauthorized_status_maps_to_unauthorized() {
    let mock = MockCatalog::responding(
        StatusCode::UNAUTHORIZED,
        r#"{"errors":["OAuth error: The access token is invalid"]}"#,
    );
    let base_url = spawn_catalog_server(mock).await.expect("spawn server");
    let client = CatalogClient::new(base_url, "bad-key");

    let err = client
        .search(&query("nature"), PageNumber::FIRST)
        .await
        .expect_err("must fail");
    assert_eq!(err, ApiError::Unauthorized);
}

#[tokio::test]
async fn forbidden_status_maps_to_rate_limited() {
    let mock = MockCatalog::responding(StatusCode::FORBIDDEN, "Rate Limit Exceeded");
    let base_url = spawn_catalog_server(mock).await.expect("spawn server");
    let client = CatalogClient::new(base_url, "test-key");

    let err = client
        .search(&query("nature"), PageNumber::FIRST)
        .await
        .expect_err("must fail");
    assert_eq!(err, ApiError::RateLimited);
}

#[tokio::test]
async fn too_many_requests_maps_to_rate_limited() {
    let mock = MockCatalog::responding(
        StatusCode::TOO_MANY_REQUESTS,
        r#"{"errors":["Rate Limit Exceeded"]}"#,
    );
    let base_url = spawn_catalog_server(mock).await.expect("spawn server");
    let client = CatalogClient::new(base_url, "test-key");

    let err = client
        .search(&query("nature"), PageNumber::FIRST)
        .await
        .expect_err("must fail");
    assert_eq!(err, ApiError::RateLimited);
}

#[tokio::test]
async fn other_statuses_carry_remote_error_list() {
    let mock = MockCatalog::responding(
        StatusCode::BAD_REQUEST,
        r#"{"errors":["query is missing","page is invalid"]}"#,
    );
    let base_url = spawn_catalog_server(mock).await.expect("spawn server");
    let client = CatalogClient::new(base_url, "test-key");

    let err = client
        .search(&query("nature"), PageNumber::FIRST)
        .await
        .expect_err("must fail");
    assert_eq!(
        err,
        ApiError::unknown(Some(400), "query is missing, page is invalid")
    );
}

#[test]
fn status_without_error_list_uses_generic_detail() {
    let err = classify_status(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
    assert_eq!(err, ApiError::unknown(Some(500), GENERIC_FAILURE_DETAIL));
    assert_eq!(
        classify_status(StatusCode::TOO_MANY_REQUESTS, ""),
        ApiError::RateLimited
    );
}

#[tokio::test]
async fn unparseable_body_is_malformed() {
    let mock = MockCatalog::responding(StatusCode::OK, r#"{"total_pages": "many"}"#);
    let base_url = spawn_catalog_server(mock).await.expect("spawn server");
    let client = CatalogClient::new(base_url, "test-key");

    let err = client
        .search(&query("nature"), PageNumber::FIRST)
        .await
        .expect_err("must fail");
    assert!(matches!(err, ApiError::Malformed(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let client = CatalogClient::new(format!("http://{addr}"), "test-key");
    let err = client
        .search(&query("nature"), PageNumber::FIRST)
        .await
        .expect_err("must fail");
    assert!(matches!(err, ApiError::Network(_)), "unexpected error: {err:?}");
}

#[tokio::test]
async fn track_download_calls_location_with_credential() {
    let mock = MockCatalog::responding(StatusCode::OK, r#"{"url":"https://images.test/9"}"#);
    let base_url = spawn_catalog_server(mock.clone()).await.expect("spawn server");
    let client = CatalogClient::new(base_url.clone(), "test-key");

    client
        .track_download(&format!("{base_url}/photos/9/download?ixid=abc"))
        .await
        .expect("track");

    let requests = mock.requests.lock().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Client-ID test-key")
    );
    assert_eq!(requests[0].params.get("ixid").map(String::as_str), Some("abc"));
}

#[tokio::test]
async fn track_download_surfaces_status_failures() {
    let mock = MockCatalog::responding(StatusCode::NOT_FOUND, r#"{"errors":["Couldn't find Photo"]}"#);
    let base_url = spawn_catalog_server(mock).await.expect("spawn server");
    let client = CatalogClient::new(base_url.clone(), "test-key");

    let err = client
        .track_download(&format!("{base_url}/photos/9/download"))
        .await
        .expect_err("must fail");
    assert_eq!(err, ApiError::unknown(Some(404), "Couldn't find Photo"));
}
