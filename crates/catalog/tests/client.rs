use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use api_types::item::{ItemStatus, ItemSummary};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
};
use catalog::{
    ApiClient, ApiError, CategoryMenu, CategorySelector, FilterState, FilterStore, Marketplace,
    MemorySlots, QuerySpec, SearchController, SearchOutcome, SearchView,
};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Seen {
    queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
    auth: Arc<Mutex<Vec<Option<String>>>>,
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn categories() -> Json<Value> {
    Json(json!([{"id": 1, "name": "fashion"}, {"id": 2, "name": "books"}]))
}

async fn search(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    seen.auth.lock().unwrap().push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );
    seen.queries.lock().unwrap().push(params);
    Json(json!([
        {"id": 10, "name": "tote bag", "price": 1200, "status": 2, "category_name": "fashion"},
        {"id": 11, "name": "old bag", "price": 800, "status": 3, "category_name": "fashion"}
    ]))
}

async fn recording_server() -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/items/categories", get(categories))
        .route("/search-detail", get(search))
        .with_state(seen.clone());
    (serve(app).await, seen)
}

fn client(base_url: &str) -> ApiClient {
    ApiClient::builder()
        .base_url(base_url)
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn fetches_categories_in_server_order() {
    let (url, _) = recording_server().await;
    let categories = client(&url).categories().await.unwrap();
    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["fashion", "books"]);
}

#[tokio::test]
async fn all_category_is_not_sent() {
    let (url, seen) = recording_server().await;
    let items = client(&url)
        .search(&QuerySpec::build(&FilterState::new()))
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].status, ItemStatus::SoldOut);

    let queries = seen.queries.lock().unwrap();
    let params = &queries[0];
    assert!(!params.contains_key("category"));
    assert_eq!(params["name"], "");
    assert_eq!(params["price-min"], "1");
    assert_eq!(params["price-max"], "99999999");
    assert_eq!(params["is-include-soldout"], "false");
}

#[tokio::test]
async fn concrete_category_and_raw_keyword_are_sent() {
    let (url, seen) = recording_server().await;
    let state = FilterState::new()
        .with_category(CategorySelector::Id(3))
        .with_keyword(" red bag&co ")
        .with_include_sold_out(true);
    client(&url)
        .search(&QuerySpec::build(&state))
        .await
        .unwrap();

    let queries = seen.queries.lock().unwrap();
    assert_eq!(queries[0]["category"], "3");
    assert_eq!(queries[0]["name"], " red bag&co ");
    assert_eq!(queries[0]["is-include-soldout"], "true");
}

#[tokio::test]
async fn bearer_token_is_sent_when_configured() {
    let (url, seen) = recording_server().await;
    let with_token = ApiClient::builder()
        .base_url(&url)
        .token(Some("secret"))
        .build()
        .unwrap();
    with_token
        .search(&QuerySpec::build(&FilterState::new()))
        .await
        .unwrap();
    client(&url)
        .search(&QuerySpec::build(&FilterState::new()))
        .await
        .unwrap();

    let auth = seen.auth.lock().unwrap();
    assert_eq!(auth[0].as_deref(), Some("Bearer secret"));
    assert_eq!(auth[1], None);
}

#[tokio::test]
async fn not_found_search_is_an_empty_list() {
    let app = Router::new().route(
        "/search-detail",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "There is no item containing the name"})),
            )
        }),
    );
    let url = serve(app).await;
    let items = client(&url)
        .search(&QuerySpec::build(&FilterState::new()))
        .await
        .unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn missing_search_route_is_an_error() {
    let url = serve(Router::new()).await;
    match client(&url)
        .search(&QuerySpec::build(&FilterState::new()))
        .await
    {
        Err(ApiError::Server { status, .. }) => assert_eq!(status, StatusCode::NOT_FOUND),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn null_body_is_an_empty_list() {
    let app = Router::new()
        .route("/search-detail", get(|| async { Json(Value::Null) }))
        .route("/items/categories", get(|| async { Json(Value::Null) }));
    let url = serve(app).await;
    let api = client(&url);
    assert!(api.search(&QuerySpec::build(&FilterState::new())).await.unwrap().is_empty());
    assert!(api.categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn server_error_carries_message() {
    let app = Router::new().route(
        "/items/categories",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"message": "db down"})),
            )
        }),
    );
    let url = serve(app).await;
    match client(&url).categories().await {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, "db down");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .categories()
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}

#[derive(Default)]
struct Notices(Mutex<Vec<String>>);

impl SearchView for Notices {
    fn set_items(&self, _items: Vec<ItemSummary>) {}

    fn set_categories(&self, _menu: CategoryMenu) {}

    fn notify(&self, message: String) {
        self.0.lock().unwrap().push(message);
    }
}

#[tokio::test]
async fn slow_server_is_reported_as_a_timeout() {
    let app = Router::new().route(
        "/search-detail",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!([]))
        }),
    );
    let url = serve(app).await;
    let remote = ApiClient::builder()
        .base_url(&url)
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let controller = SearchController::new(
        Arc::new(remote),
        FilterStore::new(MemorySlots::new()),
        Notices::default(),
    );

    assert_eq!(controller.submit().await, SearchOutcome::Failed);

    let notices = controller.view().0.lock().unwrap().clone();
    assert_eq!(notices, vec!["Server did not answer in time.".to_string()]);
}
