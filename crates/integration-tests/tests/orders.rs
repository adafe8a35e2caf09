//! Integration tests for the order history page.

use fsad_integration_tests::{MockBackend, TestApp};
use reqwest::StatusCode;
use serde_json::{Value, json};

fn order_history() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "items": [{
                "product": {"id": 1, "name": "Mechanical Keyboard"},
                "quantity": 1,
                "price": 49.99
            }],
            "orderStatus": "Delivered",
            "totalAmount": 49.99,
            "transactionId": "txn_b",
            "createdAt": "2024-02-10T10:00:00Z"
        }),
        json!({
            "_id": 2,
            "items": [{
                "product": {"_id": 2, "name": "Travel Mug", "image": ""},
                "quantity": 2,
                "price": "12.5"
            }],
            "shippingAddress": {
                "street": "221B Baker Street",
                "city": "London",
                "state": "Greater London",
                "zipCode": "NW1 6XE",
                "country": "United Kingdom"
            },
            "paymentMethod": "UPI",
            "transactionId": "txn_a",
            "paymentStatus": "Completed",
            "orderStatus": "Shipped",
            "totalAmount": "25",
            "createdAt": "2024-03-05T12:00:00Z"
        }),
        json!({
            "id": 3,
            "items": [{"quantity": 1}]
        }),
    ]
}

async fn app_with_history() -> TestApp {
    let backend = MockBackend::new();
    backend.state().orders = order_history();
    let app = TestApp::spawn_with(backend).await;
    app.sign_in().await;
    app
}

fn position(body: &str, needle: &str) -> usize {
    body.find(needle)
        .unwrap_or_else(|| panic!("{needle} not found in page"))
}

#[tokio::test]
async fn test_orders_sorted_newest_first() {
    let app = app_with_history().await;
    let body = app.page("/orders").await;

    let newest = position(&body, "#ORD-000002");
    let older = position(&body, "#ORD-000001");
    let undated = position(&body, "#ORD-000003");
    assert!(newest < older && older < undated);

    assert!(body.contains("Mar 5, 2024"));
    assert!(body.contains("Feb 10, 2024"));
    assert!(body.contains("Unknown date"));
    assert!(body.contains("$25.00"));
    assert!(body.contains("1 item"));
    assert!(body.contains("Placed on Mar 5, 2024"));
    // Collapsed cards hide details and the timeline
    assert!(!body.contains("txn_a"));
    assert!(!body.contains("Order Timeline"));
    assert!(!body.contains("timeline-step"));
}

#[tokio::test]
async fn test_status_filter() {
    let app = app_with_history().await;

    let body = app.page("/orders?status=Shipped").await;
    assert!(body.contains("#ORD-000002"));
    assert!(!body.contains("#ORD-000001"));
    assert!(!body.contains("#ORD-000003"));
    assert!(body.contains(r#"class="filter-tab active">Shipped</a>"#));

    // Only orders the service marked Pending; a missing status is not matched
    let body = app.page("/orders?status=Pending").await;
    assert!(!body.contains("#ORD-000003"));
    assert!(!body.contains("#ORD-000002"));
    assert!(body.contains("You haven't placed any orders yet"));

    let body = app.page("/orders?status=Cancelled").await;
    assert!(body.contains("You haven't placed any orders yet"));
    assert!(body.contains("Start Shopping"));

    // Unknown filters show everything
    let body = app.page("/orders?status=Lost").await;
    assert!(body.contains("#ORD-000001"));
    assert!(body.contains(r#"class="filter-tab active">All</a>"#));
}

#[tokio::test]
async fn test_expanded_order_details() {
    let app = app_with_history().await;
    let body = app.page("/orders?expanded=2").await;

    assert!(body.contains("txn_a"));
    assert!(body.contains("Travel Mug"));
    assert!(body.contains(r#"href="/products/2""#));
    assert!(body.contains("/placeholder.svg"));
    assert!(body.contains("Qty: 2"));
    assert!(body.contains("$12.50"));
    assert!(body.contains("221B Baker Street"));
    assert!(body.contains("London, Greater London NW1 6XE"));
    assert!(body.contains("Method: UPI"));
    assert!(body.contains("Payment Status: Completed"));
    assert!(body.contains("Hide Details"));
    assert!(body.contains("View Details"));
    assert!(body.contains("Order Timeline"));
    assert!(body.contains(r#"<li class="timeline-step active">Shipped</li>"#));
    assert!(body.contains(r#"<li class="timeline-step">Delivered</li>"#));
    assert!(body.contains("Track Order"));
    // Other cards stay collapsed
    assert!(!body.contains("txn_b"));
}

#[tokio::test]
async fn test_expanded_order_fallbacks() {
    let app = app_with_history().await;
    let body = app.page("/orders?expanded=3").await;

    assert!(body.contains(r#"class="order-item-name">Product</span>"#));
    assert!(body.contains(r#"src="/placeholder.svg""#));
    assert!(body.contains("Method: N/A"));
    assert!(body.contains("Transaction ID: N/A"));
    assert!(body.contains("Payment Status: Pending"));
    assert!(!body.contains("<h4>Shipping Address</h4>"));
}

#[tokio::test]
async fn test_toggle_links_keep_filter() {
    let app = app_with_history().await;

    let body = app.page("/orders?status=Shipped").await;
    assert!(body.contains(r#"href="/orders?status=Shipped&amp;expanded=2""#));

    let body = app.page("/orders?status=Shipped&expanded=2").await;
    assert!(body.contains(r#"href="/orders?status=Shipped" class="toggle""#));
    // Switching filters keeps the expanded set
    assert!(body.contains(r#"href="/orders?status=Delivered&amp;expanded=2""#));
}

#[tokio::test]
async fn test_unrecognised_status_keeps_its_label() {
    let backend = MockBackend::new();
    backend.state().orders = vec![json!({
        "id": 7,
        "orderStatus": "Returned",
        "createdAt": "2024-01-01T00:00:00Z"
    })];
    let app = TestApp::spawn_with(backend).await;
    app.sign_in().await;

    let body = app.page("/orders").await;
    assert!(body.contains("#ORD-000007"));
    assert!(body.contains(">Returned</span>"));
    assert!(!body.contains(">Unknown</span>"));
    assert!(body.contains("#94a3b8"));
}

#[tokio::test]
async fn test_loosely_typed_history_still_renders() {
    let backend = MockBackend::new();
    backend.state().orders = vec![
        json!({
            "_id": "65f1c2a9e4b0a1b2c3d4e5f6",
            "items": [{"product": "65f1c2a9e4b0a1b2c3d4e000", "quantity": null}],
            "shippingAddress": {"street": null, "city": "Leeds", "zipCode": null},
            "orderStatus": "Processing",
            "createdAt": "2024-04-02T09:00:00Z"
        }),
        json!({"id": 8, "items": null, "createdAt": "2024-01-15T09:00:00Z"}),
        json!({"id": 9, "items": "corrupted"}),
    ];
    let app = TestApp::spawn_with(backend).await;
    app.sign_in().await;

    let body = app.page("/orders").await;
    assert!(!body.contains("Failed to load orders"));
    assert!(body.contains("#ORD-65f1c2a9e4b0a1b2c3d4e5f6"));
    assert!(body.contains("#ORD-000008"));
    assert!(!body.contains("#ORD-000009"));

    let body = app
        .page("/orders?expanded=65f1c2a9e4b0a1b2c3d4e5f6")
        .await;
    assert!(body.contains(r#"href="/products/65f1c2a9e4b0a1b2c3d4e000""#));
    assert!(body.contains("Qty: 0"));
    assert!(body.contains("Leeds"));
}

#[tokio::test]
async fn test_empty_history() {
    let app = TestApp::spawn().await;
    app.sign_in().await;

    let body = app.page("/orders").await;
    assert!(body.contains("Start Shopping"));
    assert!(body.contains(r#"class="nav-link active""#));
}

#[tokio::test]
async fn test_backend_failure_shows_message() {
    let backend = MockBackend::new();
    backend.state().orders_failure = Some((
        StatusCode::SERVICE_UNAVAILABLE,
        "Order service unavailable".to_string(),
    ));
    let app = TestApp::spawn_with(backend).await;
    app.sign_in().await;

    let body = app.page("/orders").await;
    assert!(body.contains("Order service unavailable"));

    app.backend.state().orders_failure =
        Some((StatusCode::INTERNAL_SERVER_ERROR, String::new()));
    let body = app.page("/orders").await;
    assert!(body.contains("Failed to load orders. Please try again."));
}
