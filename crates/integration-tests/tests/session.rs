//! Integration tests for sign-in hand-off, access control and the
//! middleware stack.

use std::io;
use std::sync::{Arc, Mutex};

use fsad_integration_tests::{MockBackend, TestApp, location};
use reqwest::StatusCode;

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::spawn().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("body"), "ok");

    assert_eq!(app.get("/health/ready").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_fails_without_backend() {
    // Bind and immediately release a port so nothing listens on it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let backend_url = url::Url::parse(&format!("http://{addr}/")).expect("url");
    let app = TestApp::spawn_against(MockBackend::new(), backend_url).await;

    assert_eq!(app.get("/health").await.status(), StatusCode::OK);
    assert_eq!(
        app.get("/health/ready").await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

// ============================================================================
// Access Control
// ============================================================================

#[tokio::test]
async fn test_signed_out_visitors_are_sent_to_login() {
    let app = TestApp::spawn().await;

    for path in ["/dashboard", "/checkout", "/orders", "/order-confirmation"] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), Some("/login"), "{path}");
    }

    let response = app.post_form("/checkout/payment", &[]).await;
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_root_redirects_to_catalog() {
    let app = TestApp::spawn().await;
    let response = app.get("/").await;
    assert_eq!(location(&response), Some("/dashboard"));
}

// ============================================================================
// Hand-off & Header
// ============================================================================

#[tokio::test]
async fn test_rejected_token_returns_to_login() {
    let app = TestApp::spawn().await;

    let response = app.get("/auth/handoff?token=forged").await;
    assert_eq!(location(&response), Some("/login"));

    let response = app.get("/auth/handoff").await;
    assert_eq!(location(&response), Some("/login"));

    assert_eq!(location(&app.get("/dashboard").await), Some("/login"));
}

#[tokio::test]
async fn test_handoff_signs_in_and_renders_header() {
    let app = TestApp::spawn().await;
    app.sign_in().await;

    let body = app.page("/dashboard").await;
    assert!(body.contains("Linux FSAD ecommerce"));
    assert!(body.contains("Welcome, Ada Lovelace"));
    assert!(body.contains("My Orders"));
    assert!(body.contains("Mechanical Keyboard"));
    assert!(!body.contains("nav-link active"));
}

#[tokio::test]
async fn test_login_page_has_no_header() {
    let app = TestApp::spawn().await;

    let body = app.page("/login").await;
    assert!(body.contains("Access token"));

    app.sign_in().await;
    let body = app.page("/login").await;
    assert!(!body.contains("Welcome,"));
    assert!(body.contains("already signed in"));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::spawn_with(MockBackend::new()).await;
    app.sign_in_with_cart(2, 1).await;

    let response = app.post_form("/auth/logout", &[]).await;
    assert_eq!(location(&response), Some("/login"));

    assert_eq!(location(&app.get("/orders").await), Some("/login"));

    // The cart went with the session
    app.sign_in().await;
    assert_eq!(location(&app.get("/checkout").await), Some("/dashboard"));
}

// ============================================================================
// Middleware
// ============================================================================

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let app = TestApp::spawn().await;
    let response = app.get("/health").await;
    let headers = response.headers();

    assert_eq!(headers.get("x-frame-options").expect("xfo"), "DENY");
    assert_eq!(headers.get("x-content-type-options").expect("xcto"), "nosniff");
    assert_eq!(
        headers.get("cache-control").expect("cache-control"),
        "no-store, max-age=0"
    );
    let csp = headers
        .get("content-security-policy")
        .and_then(|v| v.to_str().ok())
        .expect("csp");
    assert!(csp.contains("script-src 'none'"));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_upstream_request_id_is_echoed() {
    let app = TestApp::spawn().await;
    let response = app
        .client
        .get(app.url("/health"))
        .header("x-request-id", "req-abc-123")
        .send()
        .await
        .expect("request");
    assert_eq!(
        response.headers().get("x-request-id").expect("request id"),
        "req-abc-123"
    );
}

#[tokio::test]
async fn test_session_cookie_is_http_only() {
    let app = TestApp::spawn().await;
    let response = app
        .get(&format!(
            "/auth/handoff?token={}",
            fsad_integration_tests::VALID_TOKEN
        ))
        .await;
    let cookie = response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("session cookie");
    assert!(cookie.starts_with("fsad_session="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_handoff_token_stays_out_of_request_logs() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    // Single-threaded test runtime: storefront tasks run under this subscriber
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = TestApp::spawn().await;
    app.sign_in().await;

    let output = String::from_utf8(logs.0.lock().expect("log buffer").clone()).expect("utf-8");
    assert!(output.contains("path=/auth/handoff"), "{output}");
    assert!(!output.contains(fsad_integration_tests::VALID_TOKEN), "{output}");
}
