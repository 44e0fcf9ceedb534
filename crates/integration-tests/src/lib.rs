//! Integration test harness for the Green Mango client SDK.
//!
//! Spins up an in-process mock of the backend API on an ephemeral port and
//! wires a [`Client`] at it, so the whole stack (session manager, request
//! pipeline, upload coordinator, services) is exercised over real HTTP
//! without an external server.
//!
//! The mock is deliberately small: fixed credentials, scripted failure
//! toggles, and capture buffers the tests assert against.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use url::Url;

use green_mango_client::session::MemorySessionStore;
use green_mango_client::{Client, ClientConfig};

/// Credentials the mock backend accepts.
pub const TEST_EMAIL: &str = "admin@example.com";
pub const TEST_PASSWORD: &str = "secret";

/// Mint an unsigned JWT-shaped token with the given expiry and a marker
/// claim so distinct tokens compare unequal.
#[must_use]
pub fn mint_token(exp: i64, marker: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload =
        URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp},"sid":"{marker}"}}"#).as_bytes());
    format!("{header}.{payload}.sig")
}

/// Seconds since the epoch.
#[must_use]
#[allow(clippy::missing_panics_doc)]
pub fn now_epoch() -> i64 {
    i64::try_from(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system clock before epoch")
            .as_secs(),
    )
    .expect("epoch seconds overflow")
}

fn profile_json() -> Value {
    json!({
        "id": 1,
        "email": TEST_EMAIL,
        "full_name": "Ada Admin",
        "role": "admin",
        "phone": null,
        "avatar_url": null,
        "verified": true,
    })
}

/// A recorded binary PUT against the mock storage endpoint.
#[derive(Debug, Clone)]
pub struct StoragePut {
    /// Blob counter the presigned URL was issued for.
    pub blob: u64,
    /// `Content-Type` header as received.
    pub content_type: Option<String>,
    /// `Content-Length` header as received.
    pub content_length: Option<u64>,
    /// Number of body bytes received.
    pub body_len: usize,
}

/// Everything the tests can observe or script about the mock backend.
#[derive(Default)]
pub struct MockState {
    base_url: Mutex<String>,

    /// Number of refresh exchanges performed.
    pub refresh_calls: AtomicUsize,
    /// Number of logout notifications received.
    pub logout_calls: AtomicUsize,
    /// Number of direct-upload negotiations performed.
    pub negotiate_calls: AtomicUsize,

    /// When set, the refresh endpoint answers 401.
    pub refresh_fails: AtomicBool,
    /// When set, the logout endpoint answers 500.
    pub logout_fails: AtomicBool,
    /// When set, the profile endpoint answers 401.
    pub user_info_unauthorized: AtomicBool,
    /// When set, the storage endpoint answers 403.
    pub storage_fails: AtomicBool,

    /// Blob metadata submitted during negotiations, in order.
    pub negotiations: Mutex<Vec<Value>>,
    /// Binary PUTs received by the storage endpoint, in order.
    pub storage_puts: Mutex<Vec<StoragePut>>,
    /// Raw query string of the last product listing.
    pub products_query: Mutex<Option<String>>,
    /// Body of the last product create.
    pub product_create: Mutex<Option<Value>>,
    /// Body of the last user create.
    pub user_create: Mutex<Option<Value>>,
    /// Body of the last banner reorder.
    pub reorder_body: Mutex<Option<Value>>,
}

impl MockState {
    fn require_bearer(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
        let authorized = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("Bearer "));
        if authorized {
            Ok(())
        } else {
            Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"message": "Missing token"})),
            ))
        }
    }
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if email == TEST_EMAIL && password == TEST_PASSWORD {
        (
            StatusCode::OK,
            Json(json!({
                "access_token": mint_token(now_epoch() + 3600, "login"),
                "refresh_token": "R1",
                "user": profile_json(),
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid email or password"})),
        )
    }
}

async fn refresh(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    let call = state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    if state.refresh_fails.load(Ordering::SeqCst) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Refresh token revoked"})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "access_token": mint_token(now_epoch() + 3600, &format!("refresh-{call}")),
        })),
    )
}

async fn logout(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    state.logout_calls.fetch_add(1, Ordering::SeqCst);

    if state.logout_fails.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "boom"})),
        );
    }

    (StatusCode::OK, Json(json!({"message": "Signed out"})))
}

async fn user_info(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    MockState::require_bearer(&headers)?;

    if state.user_info_unauthorized.load(Ordering::SeqCst) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Token expired"})),
        ));
    }

    Ok(Json(json!({"user": profile_json()})))
}

async fn direct_uploads(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    MockState::require_bearer(&headers)?;

    let blob = state.negotiate_calls.fetch_add(1, Ordering::SeqCst) as u64;
    let content_type = body["blob"]["content_type"]
        .as_str()
        .unwrap_or("application/octet-stream")
        .to_string();

    state
        .negotiations
        .lock()
        .expect("negotiations lock poisoned")
        .push(body["blob"].clone());

    let base = state
        .base_url
        .lock()
        .expect("base_url lock poisoned")
        .clone();

    Ok(Json(json!({
        "direct_upload": {
            "url": format!("{base}/storage/{blob}"),
            "headers": {"Content-Type": content_type},
        },
        "blob_signed_id": format!("signed-{blob}"),
    })))
}

async fn storage_put(
    State(state): State<Arc<MockState>>,
    Path(blob): Path<u64>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> impl IntoResponse {
    if state.storage_fails.load(Ordering::SeqCst) {
        return (StatusCode::FORBIDDEN, "Access Denied".to_string());
    }

    let record = StoragePut {
        blob,
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
        content_length: headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok()),
        body_len: body.len(),
    };
    state
        .storage_puts
        .lock()
        .expect("storage_puts lock poisoned")
        .push(record);

    (StatusCode::OK, String::new())
}

async fn list_products(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    MockState::require_bearer(&headers)?;

    *state
        .products_query
        .lock()
        .expect("products_query lock poisoned") = query;

    Ok(Json(json!({
        "data": [{
            "id": 42,
            "name": "Green mango crate",
            "description": null,
            "price": "12.50",
            "stock_quantity": 7,
            "status": "active",
            "category_id": 3,
            "category_name": "Fruit",
            "images": [
                {"id": 10, "url": "https://cdn.example/10.jpg", "thumbnail_url": null},
            ],
            "created_at": "2026-01-05T08:30:00Z",
            "updated_at": "2026-01-06T08:30:00Z",
        }],
        "meta": {"page": 1, "per_page": 20, "total_count": 1, "total_pages": 1},
    })))
}

async fn create_product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    MockState::require_bearer(&headers)?;

    let product = body["product"].clone();
    *state
        .product_create
        .lock()
        .expect("product_create lock poisoned") = Some(product.clone());

    Ok(Json(json!({
        "product": {
            "id": 100,
            "name": product["name"],
            "description": product["description"],
            "price": product["price"],
            "stock_quantity": product["stock_quantity"],
            "status": product["status"],
            "category_id": product["category_id"],
            "category_name": null,
            "images": [],
            "created_at": "2026-02-01T00:00:00Z",
            "updated_at": "2026-02-01T00:00:00Z",
        },
    })))
}

async fn create_user(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    MockState::require_bearer(&headers)?;

    let user = body["user"].clone();
    *state
        .user_create
        .lock()
        .expect("user_create lock poisoned") = Some(user.clone());

    // Echo the avatar blob reference back as a served URL, the way the real
    // backend answers once the blob is attached.
    let avatar_url = user["avatar"]
        .as_str()
        .map(|signed| format!("https://cdn.example/avatars/{signed}.jpg"));

    Ok(Json(json!({
        "user": {
            "id": 7,
            "email": user["email"],
            "full_name": user["full_name"],
            "role": user["role"],
            "phone": user["phone"],
            "avatar_url": avatar_url,
            "verified": false,
            "created_at": "2026-02-01T00:00:00Z",
            "updated_at": "2026-02-01T00:00:00Z",
            "deleted_at": null,
        },
    })))
}

async fn reorder_banners(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    MockState::require_bearer(&headers)?;

    *state
        .reorder_body
        .lock()
        .expect("reorder_body lock poisoned") = Some(body);

    Ok(Json(json!({"message": "ok"})))
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/v1/admin/auth/login", post(login))
        .route("/api/v1/admin/auth/refresh", post(refresh))
        .route("/api/v1/admin/auth/logout", post(logout))
        .route("/api/v1/users/userInfo", get(user_info))
        .route("/api/v1/direct_uploads", post(direct_uploads))
        .route("/storage/{blob}", put(storage_put))
        .route(
            "/api/v1/admin/products",
            get(list_products).post(create_product),
        )
        .route("/api/v1/admin/users", post(create_user))
        .route("/api/v1/admin/banners/reorder", patch(reorder_banners))
        .with_state(state)
}

/// One mock backend plus a client pointed at it.
pub struct TestContext {
    /// The client under test, using in-memory session persistence.
    pub client: Client,
    /// Scripting and capture handles for the mock backend.
    pub state: Arc<MockState>,
    /// Root of the mock server (no `/api/v1` suffix).
    pub base_url: Url,
}

impl TestContext {
    /// Start a mock backend on an ephemeral port and build a client at it.
    ///
    /// # Panics
    ///
    /// Panics if the listener or client cannot be set up; tests have no
    /// useful way to recover from that.
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock listener");
        let addr = listener.local_addr().expect("mock listener addr");

        let state = Arc::new(MockState::default());
        let base = format!("http://{addr}");
        *state.base_url.lock().expect("base_url lock poisoned") = base.clone();

        let app = router(Arc::clone(&state));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        let base_url = Url::parse(&format!("{base}/api/v1")).expect("mock base url");
        let client = Client::with_store(
            ClientConfig::for_base_url(base_url.clone()),
            Box::new(MemorySessionStore::new()),
        )
        .expect("build client");

        Self {
            client,
            state,
            base_url,
        }
    }

    /// Sign in with the fixed test credentials.
    ///
    /// # Panics
    ///
    /// Panics when the mock backend rejects them.
    pub async fn login(&self) {
        self.client
            .auth()
            .login(TEST_EMAIL, TEST_PASSWORD)
            .await
            .expect("test login");
    }
}
