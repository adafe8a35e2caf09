//! Integration test harness for the FSAD storefront.
//!
//! Each test spawns two servers on ephemeral ports:
//!
//! - a [`MockBackend`] speaking the backend's JSON API, whose behaviour and
//!   recorded requests the test controls and inspects;
//! - the real storefront router ([`fsad_storefront::app`]) pointed at it.
//!
//! [`TestApp`] wraps a cookie-keeping `reqwest` client that does not follow
//! redirects, so tests can assert on every hop of the checkout wizard.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fsad-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use fsad_storefront::config::{BackendConfig, SentryConfig, StorefrontConfig};
use fsad_storefront::state::AppState;
use reqwest::{Client, redirect::Policy};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;

/// Token the mock backend accepts.
pub const VALID_TOKEN: &str = "test-access-token";

/// Session secret used by every test storefront.
pub const TEST_SESSION_SECRET: &str =
    "kX9#mQ2$vL7@pR4!nT8&wZ3*yB6^cF1%hJ5(dG0)sA2-eU7+iO4=rK9~tM3<xN8>";

// =============================================================================
// Mock Backend
// =============================================================================

/// How the mock answers `POST /payments/process`.
#[derive(Debug, Clone)]
pub enum PaymentBehavior {
    /// `{success: true, transactionId}`.
    Approve { transaction_id: String },
    /// `{success: false, message}`.
    Decline { message: Option<String> },
    /// Non-2xx status with an optional `{message}` body.
    Fail {
        status: StatusCode,
        message: Option<String>,
    },
}

/// How the mock answers `POST /orders`.
#[derive(Debug, Clone)]
pub enum OrderBehavior {
    /// `{success: true, order}` with the given id.
    Create { order_id: i64 },
    /// `{success: false, message}`.
    Reject { message: Option<String> },
}

/// Mutable state behind the mock backend.
#[derive(Debug)]
pub struct MockState {
    pub products: Vec<Value>,
    pub orders: Vec<Value>,
    /// When set, `GET /orders` fails with this status and message.
    pub orders_failure: Option<(StatusCode, String)>,
    pub payment: PaymentBehavior,
    /// How long `POST /payments/process` takes to answer.
    pub payment_delay: Option<Duration>,
    pub order_creation: OrderBehavior,
    /// Bodies received on `POST /payments/process`.
    pub payment_requests: Vec<Value>,
    /// Bodies received on `POST /orders`.
    pub order_requests: Vec<Value>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            products: vec![
                json!({
                    "id": 1,
                    "name": "Mechanical Keyboard",
                    "price": 49.99,
                    "stock": 3,
                    "image": "https://cdn.example.org/keyboard.png"
                }),
                json!({"_id": 2, "name": "Travel Mug", "price": "12.5", "stock": 10}),
                json!({"id": 3, "name": "Sold Out Mouse", "price": 19.0, "stock": 0}),
            ],
            orders: Vec::new(),
            orders_failure: None,
            payment: PaymentBehavior::Approve {
                transaction_id: "txn_test_001".to_string(),
            },
            payment_delay: None,
            order_creation: OrderBehavior::Create { order_id: 101 },
            payment_requests: Vec::new(),
            order_requests: Vec::new(),
        }
    }
}

/// In-process stand-in for the backend API.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the mock state to configure or inspect it.
    ///
    /// # Panics
    ///
    /// Panics if a handler panicked while holding the lock.
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("mock backend state poisoned")
    }

    fn router(self) -> Router {
        Router::new()
            .route("/auth/me", get(me))
            .route("/products", get(list_products))
            .route("/products/{id}", get(get_product))
            .route("/payments/process", post(process_payment))
            .route("/orders", post(create_order).get(list_orders))
            .with_state(self)
    }

    /// Serve the mock on an ephemeral port and return its base URL.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn(&self) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Mock backend has no address");
        let router = self.clone().router();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Mock backend error");
        });
        Url::parse(&format!("http://{addr}/")).expect("Mock backend URL is valid")
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {VALID_TOKEN}"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"success": false, "message": "Invalid token"})),
    )
        .into_response()
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "success": true,
        "user": {"name": "Ada Lovelace", "email": "ada@example.org"}
    }))
    .into_response()
}

async fn list_products(State(mock): State<MockBackend>) -> Json<Value> {
    Json(json!({"products": mock.state().products.clone()}))
}

async fn get_product(State(mock): State<MockBackend>, Path(id): Path<i64>) -> Response {
    let state = mock.state();
    let product = state.products.iter().find(|p| {
        p.get("id")
            .or_else(|| p.get("_id"))
            .and_then(Value::as_i64)
            == Some(id)
    });
    match product {
        Some(product) => Json(json!({"product": product})).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Product not found"})),
        )
            .into_response(),
    }
}

async fn process_payment(
    State(mock): State<MockBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    mock.state().payment_requests.push(body);
    let delay = mock.state().payment_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let behavior = mock.state().payment.clone();
    match behavior {
        PaymentBehavior::Approve { transaction_id } => Json(json!({
            "success": true,
            "message": "Payment processed",
            "transactionId": transaction_id
        }))
        .into_response(),
        PaymentBehavior::Decline { message } => {
            Json(json!({"success": false, "message": message})).into_response()
        }
        PaymentBehavior::Fail { status, message } => {
            (status, Json(json!({"message": message}))).into_response()
        }
    }
}

async fn create_order(
    State(mock): State<MockBackend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = mock.state();
    let response = match state.order_creation.clone() {
        OrderBehavior::Create { order_id } => json!({
            "success": true,
            "order": {
                "id": order_id,
                "items": body["items"].clone(),
                "orderStatus": "Pending",
                "totalAmount": 99.98,
                "transactionId": body["transactionId"].clone(),
                "createdAt": "2026-10-17T09:30:00Z"
            }
        }),
        OrderBehavior::Reject { message } => json!({"success": false, "message": message}),
    };
    state.order_requests.push(body);
    Json(response).into_response()
}

async fn list_orders(State(mock): State<MockBackend>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let state = mock.state();
    if let Some((status, message)) = &state.orders_failure {
        return (*status, Json(json!({"message": message}))).into_response();
    }
    Json(json!({"orders": state.orders.clone()})).into_response()
}

// =============================================================================
// Storefront Under Test
// =============================================================================

/// Storefront configuration pointing at `backend_url`.
#[must_use]
pub fn test_config(backend_url: Url) -> StorefrontConfig {
    StorefrontConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        login_url: "/login".to_string(),
        session_secret: SecretString::from(TEST_SESSION_SECRET),
        backend: BackendConfig {
            base_url: backend_url,
            timeout: Duration::from_secs(5),
        },
        sentry: SentryConfig::default(),
    }
}

/// A running storefront plus a client bound to it.
pub struct TestApp {
    pub base_url: String,
    pub client: Client,
    pub backend: MockBackend,
}

impl TestApp {
    /// Start a storefront against a fresh default mock backend.
    pub async fn spawn() -> Self {
        Self::spawn_with(MockBackend::new()).await
    }

    /// Start a storefront against `backend`.
    ///
    /// # Panics
    ///
    /// Panics if a server cannot start.
    pub async fn spawn_with(backend: MockBackend) -> Self {
        let backend_url = backend.spawn().await;
        Self::spawn_against(backend, backend_url).await
    }

    /// Start a storefront whose backend lives at `backend_url`.
    ///
    /// # Panics
    ///
    /// Panics if the storefront cannot start.
    pub async fn spawn_against(backend: MockBackend, backend_url: Url) -> Self {
        let state = AppState::new(test_config(backend_url)).expect("Failed to build state");
        let app = fsad_storefront::app(state).expect("Failed to build storefront");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind storefront");
        let addr = listener.local_addr().expect("Storefront has no address");
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .expect("Storefront error");
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: format!("http://{addr}"),
            client,
            backend,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    /// # Panics
    ///
    /// Panics if the request fails.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST request failed")
    }

    /// GET `path` and return the body, asserting a 200.
    ///
    /// # Panics
    ///
    /// Panics if the response is not 200 OK.
    pub async fn page(&self, path: &str) -> String {
        let response = self.get(path).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK, "GET {path}");
        response.text().await.expect("Failed to read body")
    }

    /// Sign in through the token hand-off.
    ///
    /// # Panics
    ///
    /// Panics if the hand-off does not land on the catalog.
    pub async fn sign_in(&self) {
        let response = self
            .get(&format!("/auth/handoff?token={VALID_TOKEN}"))
            .await;
        assert_eq!(location(&response), Some("/dashboard"));
    }

    /// Sign in and put `quantity` of product `product_id` in the cart.
    ///
    /// # Panics
    ///
    /// Panics if adding to the cart fails.
    pub async fn sign_in_with_cart(&self, product_id: i64, quantity: u32) {
        self.sign_in().await;
        let product_id = product_id.to_string();
        let quantity = quantity.to_string();
        let response = self
            .post_form(
                "/cart/add",
                &[("product_id", product_id.as_str()), ("quantity", quantity.as_str())],
            )
            .await;
        assert_eq!(
            location(&response),
            Some("/dashboard?success=Added%20to%20cart")
        );
    }

    /// Walk the wizard to the payment step with a valid address.
    ///
    /// # Panics
    ///
    /// Panics if a step does not redirect back to `/checkout`.
    pub async fn reach_payment_step(&self) {
        let response = self.post_form("/checkout/cart", &[]).await;
        assert_eq!(location(&response), Some("/checkout"));
        let response = self.post_form("/checkout/shipping", &valid_shipping()).await;
        assert_eq!(location(&response), Some("/checkout"));
    }
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// A shipping form that passes validation.
#[must_use]
pub fn valid_shipping() -> Vec<(&'static str, &'static str)> {
    vec![
        ("full_name", "Ada Lovelace"),
        ("address_line1", "12 St James's Square"),
        ("address_line2", ""),
        ("city", "London"),
        ("state", "Greater London"),
        ("zip_code", "SW1Y 4JH"),
        ("country", "United Kingdom"),
        ("phone", "+44 20 7946 0958"),
    ]
}

/// A payment form that passes validation until the end of 2099.
#[must_use]
pub fn valid_payment() -> Vec<(&'static str, &'static str)> {
    vec![
        ("payment_method", "Credit Card"),
        ("card_number", "4242 4242 4242 4242"),
        ("cardholder_name", "Ada Lovelace"),
        ("expiry_date", "12/99"),
        ("cvv", "123"),
    ]
}
