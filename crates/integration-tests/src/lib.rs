//! Integration tests for the AlMed storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p almed-integration-tests
//! ```
//!
//! No external services are needed. Each test starts a fake marketplace API
//! and the real storefront router on ephemeral ports and talks to both over
//! HTTP.
//!
//! ```rust,ignore
//! let ctx = TestContext::start(FakeApi::with_catalog()).await;
//! let resp = ctx.get("/list?category=Masker").send().await?;
//! ```

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use almed_storefront::config::{ApiConfig, StorefrontConfig, normalize_base_url};
use almed_storefront::state::AppState;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use tempfile::TempDir;

/// Fixture data and recorded requests of the fake marketplace API.
#[derive(Debug, Default)]
pub struct FakeApi {
    pub products: Vec<Value>,
    pub categories: Vec<Value>,
    pub transactions: Vec<Value>,
    pub users: Vec<Value>,
    /// When set, `POST transactions` answers 400 with this message.
    pub reject_with: Option<String>,
    /// When true, every endpoint answers 500.
    pub down: bool,
    /// Bodies received by `POST transactions`.
    pub received: Vec<Value>,
}

/// A product fixture in the marketplace's JSON shape.
#[must_use]
pub fn product(
    id: &str,
    name: &str,
    price: &str,
    category: &str,
    featured: bool,
    created_at: &str,
) -> Value {
    let images: Vec<Value> = (1..=2)
        .map(|n| {
            json!({
                "id": format!("{id}-img-{n}"),
                "productId": id,
                "url": format!("https://img.almed.test/{id}-{n}.jpg"),
            })
        })
        .collect();

    json!({
        "id": id,
        "storeId": "store-1",
        "categoryId": format!("cat-{category}"),
        "name": name,
        "description": format!("{name} untuk kebutuhan medis"),
        "stock": "25",
        "price": price,
        "isFeatured": featured,
        "isArchived": false,
        "createdAt": created_at,
        "updatedAt": created_at,
        "images": images,
        "category": {"id": format!("cat-{category}"), "storeId": "store-1", "name": category}
    })
}

impl FakeApi {
    /// Five products, two of them in "Masker", and three categories.
    #[must_use]
    pub fn with_catalog() -> Self {
        Self {
            products: [
                ("p1", "Masker Bedah 3-Ply", "35000", "Masker", true, "2024-05-01"),
                ("p2", "Termometer Digital", "85000", "Alat Ukur", false, "2024-05-03"),
                ("p3", "Masker N95", "120000", "Masker", true, "2024-05-02"),
                ("p4", "Kasa Steril", "15000", "Perban", false, "2024-05-05"),
                ("p5", "Tensimeter", "450000", "Alat Ukur", false, "2024-05-04"),
            ]
            .into_iter()
            .map(|(id, name, price, category, featured, day)| {
                product(id, name, price, category, featured, &format!("{day}T08:00:00.000Z"))
            })
            .collect(),
            categories: vec![
                json!({"id": "cat-Masker", "storeId": "store-1", "name": "Masker"}),
                json!({"id": "cat-Alat Ukur", "storeId": "store-1", "name": "Alat Ukur"}),
                json!({"id": "cat-Perban", "storeId": "store-1", "name": "Perban"}),
            ],
            users: vec![json!({"id": "u1", "name": "siti aminah", "email": "siti@almed.test"})],
            ..Self::default()
        }
    }
}

type Shared = Arc<Mutex<FakeApi>>;

fn lock(api: &Shared) -> MutexGuard<'_, FakeApi> {
    api.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unavailable() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "down").into_response()
}

async fn products(State(api): State<Shared>) -> Response {
    let api = lock(&api);
    if api.down {
        return unavailable();
    }
    Json(api.products.clone()).into_response()
}

async fn categories(State(api): State<Shared>) -> Response {
    let api = lock(&api);
    if api.down {
        return unavailable();
    }
    Json(api.categories.clone()).into_response()
}

async fn transactions(
    State(api): State<Shared>,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Response {
    let api = lock(&api);
    if api.down {
        return unavailable();
    }
    let user_id = params.get("userId").cloned().unwrap_or_default();
    let owned: Vec<Value> = api
        .transactions
        .iter()
        .filter(|tx| tx["userId"] == user_id.as_str())
        .cloned()
        .collect();
    Json(owned).into_response()
}

async fn create_transaction(State(api): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut api = lock(&api);
    if api.down {
        return unavailable();
    }
    if let Some(message) = api.reject_with.clone() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response();
    }
    api.received.push(body);
    (StatusCode::CREATED, Json(json!({"id": "trx-new"}))).into_response()
}

async fn user(State(api): State<Shared>, Path(id): Path<String>) -> Response {
    let api = lock(&api);
    api.users
        .iter()
        .find(|u| u["id"] == id.as_str())
        .map_or_else(
            || {
                let body = Json(json!({"message": "User not found"}));
                (StatusCode::NOT_FOUND, body).into_response()
            },
            |u| Json(u.clone()).into_response(),
        )
}

/// A running fake API plus a running storefront pointed at it.
pub struct TestContext {
    /// Client that does not follow redirects.
    pub client: reqwest::Client,
    /// Storefront base URL, without trailing slash.
    pub storefront_url: String,
    pub api: Arc<Mutex<FakeApi>>,
    _cart_dir: TempDir,
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server error");
    });
    format!("http://{addr}")
}

impl TestContext {
    /// Start the fake API with `fake` as its data and an uncached storefront
    /// in front.
    pub async fn start(fake: FakeApi) -> Self {
        Self::start_with_cache(fake, Duration::ZERO).await
    }

    /// Like [`TestContext::start`], caching the catalog for `cache_ttl`.
    pub async fn start_with_cache(fake: FakeApi, cache_ttl: Duration) -> Self {
        let api: Shared = Arc::new(Mutex::new(fake));

        let api_router = Router::new()
            .route("/api/products", get(products))
            .route("/api/categories", get(categories))
            .route(
                "/api/transactions",
                get(transactions).post(create_transaction),
            )
            .route("/api/user/{id}", get(user))
            .with_state(Arc::clone(&api));
        let api_url = serve(api_router).await;

        let cart_dir = tempfile::tempdir().expect("Failed to create cart dir");
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().expect("valid address"),
            port: 0,
            api: ApiConfig {
                base_url: normalize_base_url(&format!("{api_url}/api"))
                    .expect("valid API URL"),
                timeout: Duration::from_secs(5),
                cache_ttl,
            },
            cart_dir: cart_dir.path().to_path_buf(),
            whatsapp_number: Some("+62 821-4651-0812".to_string()),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let state = AppState::new(config).expect("Failed to build app state");
        let storefront_url = serve(almed_storefront::app(state)).await;

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            storefront_url,
            api,
            _cart_dir: cart_dir,
        }
    }

    /// Lock the fake API to inspect or change it.
    pub fn api(&self) -> MutexGuard<'_, FakeApi> {
        lock(&self.api)
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// GET `path` as nobody.
    #[must_use]
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path))
    }

    /// GET `path` signed in as `user_id`.
    #[must_use]
    pub fn get_as(&self, user_id: &str, path: &str) -> reqwest::RequestBuilder {
        self.get(path).header("cookie", user_cookie(user_id))
    }

    /// POST a form to `path` signed in as `user_id`.
    #[must_use]
    pub fn post_as(
        &self,
        user_id: &str,
        path: &str,
        form: &[(&str, &str)],
    ) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("cookie", user_cookie(user_id))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(encode_form(form))
    }
}

/// `Cookie` header value for a signed-in shopper.
#[must_use]
pub fn user_cookie(user_id: &str) -> String {
    let value = json!({ "id": user_id }).to_string();
    format!("user={}", urlencoding::encode(&value))
}

fn encode_form(pairs: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
