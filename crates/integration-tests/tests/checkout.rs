//! Integration tests for the cart and the checkout wizard.

use std::time::Duration;

use fsad_integration_tests::{
    MockBackend, OrderBehavior, PaymentBehavior, TestApp, location, valid_payment,
    valid_shipping,
};
use reqwest::StatusCode;

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_empty_cart_redirects_to_catalog() {
    let app = TestApp::spawn().await;
    app.sign_in().await;

    assert_eq!(location(&app.get("/checkout").await), Some("/dashboard"));
    assert_eq!(
        location(&app.post_form("/checkout/cart", &[]).await),
        Some("/dashboard")
    );
}

#[tokio::test]
async fn test_add_rejects_unavailable_products() {
    let app = TestApp::spawn().await;
    app.sign_in().await;

    let response = app
        .post_form("/cart/add", &[("product_id", "3"), ("quantity", "1")])
        .await;
    assert_eq!(
        location(&response),
        Some("/dashboard?error=Sold%20Out%20Mouse%20is%20out%20of%20stock")
    );

    let response = app.post_form("/cart/add", &[("product_id", "99")]).await;
    assert_eq!(
        location(&response),
        Some("/dashboard?error=Product%20not%20found")
    );

    let body = app.page("/dashboard?error=Product%20not%20found").await;
    assert!(body.contains("Product not found"));
}

#[tokio::test]
async fn test_add_is_capped_at_stock() {
    let app = TestApp::spawn().await;
    app.sign_in_with_cart(1, 5).await;

    let body = app.page("/checkout").await;
    assert!(body.contains("Review Your Cart"));
    assert!(body.contains("Max stock reached"));
    assert!(body.contains("Subtotal (3 items)"));
}

#[tokio::test]
async fn test_quantity_changes() {
    let app = TestApp::spawn().await;
    app.sign_in_with_cart(1, 2).await;

    // Above stock is ignored
    let response = app
        .post_form("/cart/quantity", &[("product_id", "1"), ("quantity", "4")])
        .await;
    assert_eq!(location(&response), Some("/checkout"));
    let body = app.page("/checkout").await;
    assert!(body.contains("Subtotal (2 items)"));
    assert!(body.contains("$99.98"));
    assert!(!body.contains("Max stock reached"));

    // Up to stock is applied
    app.post_form("/cart/quantity", &[("product_id", "1"), ("quantity", "3")])
        .await;
    let body = app.page("/checkout").await;
    assert!(body.contains("Subtotal (3 items)"));
    assert!(body.contains("Max stock reached"));

    // Below one removes the line
    app.post_form("/cart/quantity", &[("product_id", "1"), ("quantity", "0")])
        .await;
    assert_eq!(location(&app.get("/checkout").await), Some("/dashboard"));
}

#[tokio::test]
async fn test_remove_line() {
    let app = TestApp::spawn().await;
    app.sign_in_with_cart(1, 1).await;
    app.post_form("/cart/add", &[("product_id", "2"), ("quantity", "2")])
        .await;

    let response = app.post_form("/cart/remove", &[("product_id", "1")]).await;
    assert_eq!(location(&response), Some("/checkout"));

    let body = app.page("/checkout").await;
    assert!(!body.contains("Mechanical Keyboard"));
    assert!(body.contains("Travel Mug"));
    assert!(body.contains("$25.00"));
}

// ============================================================================
// Wizard Navigation
// ============================================================================

#[tokio::test]
async fn test_shipping_validation_errors_rerender_step() {
    let app = TestApp::spawn().await;
    app.sign_in_with_cart(2, 1).await;
    app.post_form("/checkout/cart", &[]).await;

    let body = app.page("/checkout").await;
    assert!(body.contains("Shipping Address"));

    let response = app
        .post_form(
            "/checkout/shipping",
            &[("full_name", "Ada"), ("phone", "123"), ("zip_code", "!!")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("body");
    assert!(body.contains("City is required"));
    assert!(body.contains("Phone number must be 10 to 15 digits"));
    assert!(body.contains("Invalid ZIP code"));
    assert!(!body.contains("Full name is required"));
    assert!(body.contains(r#"value="Ada""#));
}

#[tokio::test]
async fn test_back_navigation_keeps_shipping() {
    let app = TestApp::spawn().await;
    app.sign_in_with_cart(2, 1).await;
    app.reach_payment_step().await;

    let body = app.page("/checkout").await;
    assert!(body.contains("Shipping to"));
    assert!(body.contains("Pay $12.50"));

    let response = app.post_form("/checkout/back/shipping", &[]).await;
    assert_eq!(location(&response), Some("/checkout"));
    let body = app.page("/checkout").await;
    assert!(body.contains(r#"value="London""#));

    app.post_form("/checkout/back/cart", &[]).await;
    let body = app.page("/checkout").await;
    assert!(body.contains("Review Your Cart"));
    assert!(body.contains("step active"));
}

#[tokio::test]
async fn test_payment_requires_shipping() {
    let app = TestApp::spawn().await;
    app.sign_in_with_cart(2, 1).await;

    let response = app.post_form("/checkout/payment", &valid_payment()).await;
    assert_eq!(location(&response), Some("/checkout"));

    let body = app.page("/checkout").await;
    assert!(body.contains("Shipping Address"));
    assert!(app.backend.state().payment_requests.is_empty());
}

// ============================================================================
// Payment Submission
// ============================================================================

#[tokio::test]
async fn test_payment_validation_errors() {
    let app = TestApp::spawn().await;
    app.sign_in_with_cart(2, 1).await;
    app.reach_payment_step().await;

    let response = app
        .post_form(
            "/checkout/payment",
            &[
                ("payment_method", "UPI"),
                ("card_number", "4242 4242"),
                ("cardholder_name", "Al"),
                ("expiry_date", "1330"),
                ("cvv", "12a"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.expect("body");

    assert!(body.contains("Card number must be 16 digits"));
    assert!(body.contains("Name must be at least 3 characters"));
    assert!(body.contains("Invalid month"));
    assert!(body.contains("CVV must be 3 or 4 digits"));
    assert!(body.contains(r#"value="13/30""#));
    assert!(body.contains(r#"value="12""#));
    assert!(body.contains(r#"value="UPI" checked"#));
    assert!(app.backend.state().payment_requests.is_empty());
}

#[tokio::test]
async fn test_successful_checkout() {
    let app = TestApp::spawn().await;
    app.sign_in_with_cart(1, 2).await;
    app.reach_payment_step().await;

    let response = app.post_form("/checkout/payment", &valid_payment()).await;
    assert_eq!(location(&response), Some("/order-confirmation"));

    {
        let state = app.backend.state();
        let payment = state.payment_requests.first().expect("payment request");
        assert_eq!(payment["amount"], 99.98);
        assert_eq!(payment["paymentMethod"], "Credit Card");
        assert_eq!(payment["cardDetails"]["cardNumber"], "4242424242424242");
        assert_eq!(payment["cardDetails"]["expiryDate"], "12/99");

        let order = state.order_requests.first().expect("order request");
        assert_eq!(order["transactionId"], "txn_test_001");
        assert_eq!(order["items"][0]["productId"], 1);
        assert_eq!(order["items"][0]["quantity"], 2);
        assert_eq!(order["shippingAddress"]["street"], "12 St James's Square");
        assert_eq!(order["shippingAddress"]["zipCode"], "SW1Y 4JH");
    }

    let body = app.page("/order-confirmation").await;
    assert!(body.contains("#ORD-000101"));
    assert!(body.contains("txn_test_001"));
    assert!(body.contains("$99.98"));

    // Shown once, and the cart is gone
    assert_eq!(location(&app.get("/order-confirmation").await), Some("/orders"));
    assert_eq!(location(&app.get("/checkout").await), Some("/dashboard"));
}

#[tokio::test]
async fn test_declined_payment_shows_banner() {
    let backend = MockBackend::new();
    backend.state().payment = PaymentBehavior::Decline {
        message: Some("Insufficient funds".to_string()),
    };
    let app = TestApp::spawn_with(backend).await;
    app.sign_in_with_cart(2, 1).await;
    app.reach_payment_step().await;

    let response = app.post_form("/checkout/payment", &valid_payment()).await;
    assert_eq!(location(&response), Some("/checkout"));

    let body = app.page("/checkout").await;
    assert!(body.contains("Insufficient funds"));
    assert!(body.contains("Pay $12.50"));
    assert!(app.backend.state().order_requests.is_empty());

    app.post_form("/checkout/error/dismiss", &[]).await;
    let body = app.page("/checkout").await;
    assert!(!body.contains("Insufficient funds"));
}

#[tokio::test]
async fn test_decline_without_message_uses_default() {
    let backend = MockBackend::new();
    backend.state().payment = PaymentBehavior::Decline { message: None };
    let app = TestApp::spawn_with(backend).await;
    app.sign_in_with_cart(2, 1).await;
    app.reach_payment_step().await;

    app.post_form("/checkout/payment", &valid_payment()).await;
    let body = app.page("/checkout").await;
    assert!(body.contains("Payment failed"));
}

#[tokio::test]
async fn test_backend_failure_messages() {
    let backend = MockBackend::new();
    backend.state().payment = PaymentBehavior::Fail {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: None,
    };
    let app = TestApp::spawn_with(backend).await;
    app.sign_in_with_cart(2, 1).await;
    app.reach_payment_step().await;

    app.post_form("/checkout/payment", &valid_payment()).await;
    let body = app.page("/checkout").await;
    assert!(body.contains("Failed to process your order. Please try again."));

    app.backend.state().payment = PaymentBehavior::Fail {
        status: StatusCode::BAD_REQUEST,
        message: Some("Card network unavailable".to_string()),
    };
    app.post_form("/checkout/payment", &valid_payment()).await;
    let body = app.page("/checkout").await;
    assert!(body.contains("Card network unavailable"));
}

#[tokio::test]
async fn test_order_rejection_after_payment() {
    let backend = MockBackend::new();
    backend.state().order_creation = OrderBehavior::Reject { message: None };
    let app = TestApp::spawn_with(backend).await;
    app.sign_in_with_cart(2, 1).await;
    app.reach_payment_step().await;

    let response = app.post_form("/checkout/payment", &valid_payment()).await;
    assert_eq!(location(&response), Some("/checkout"));

    let body = app.page("/checkout").await;
    assert!(body.contains("Order creation failed"));
    assert_eq!(app.backend.state().payment_requests.len(), 1);
    // Cart is kept so the customer can retry
    assert!(body.contains("Travel Mug"));
}

#[tokio::test]
async fn test_second_submission_while_paying_is_ignored() {
    let backend = MockBackend::new();
    backend.state().payment_delay = Some(Duration::from_millis(800));
    let app = TestApp::spawn_with(backend).await;
    app.sign_in_with_cart(2, 1).await;
    app.reach_payment_step().await;

    let first_payment = valid_payment();
    let first = app.post_form("/checkout/payment", &first_payment);
    let second = async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        let response = app.post_form("/checkout/payment", &valid_payment()).await;
        let page = app.page("/checkout").await;
        (response, page)
    };
    let (first, (second, page)) = tokio::join!(first, second);

    assert_eq!(location(&second), Some("/checkout"));
    assert!(page.contains(r#"class="btn-primary pay-button" disabled>Processing...</button>"#));
    assert!(!page.contains("Pay $12.50"));

    assert_eq!(location(&first), Some("/order-confirmation"));
    assert_eq!(app.backend.state().payment_requests.len(), 1);
    assert_eq!(app.backend.state().order_requests.len(), 1);
}

#[tokio::test]
async fn test_failed_payment_releases_the_pay_button() {
    let backend = MockBackend::new();
    backend.state().payment = PaymentBehavior::Decline { message: None };
    let app = TestApp::spawn_with(backend).await;
    app.sign_in_with_cart(2, 1).await;
    app.reach_payment_step().await;

    app.post_form("/checkout/payment", &valid_payment()).await;
    let body = app.page("/checkout").await;
    assert!(body.contains("Pay $12.50"));
    assert!(!body.contains("Processing..."));

    app.post_form("/checkout/payment", &valid_payment()).await;
    assert_eq!(app.backend.state().payment_requests.len(), 2);
}

#[tokio::test]
async fn test_payment_endpoint_is_rate_limited() {
    let app = TestApp::spawn().await;
    app.sign_in_with_cart(2, 1).await;
    app.reach_payment_step().await;

    for attempt in 0..5 {
        let response = app.post_form("/checkout/payment", &[]).await;
        assert_eq!(response.status(), StatusCode::OK, "attempt {attempt}");
    }

    let response = app.post_form("/checkout/payment", &[]).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_shipping_form_is_accepted_as_submitted() {
    let app = TestApp::spawn().await;
    app.sign_in_with_cart(2, 1).await;
    app.post_form("/checkout/cart", &[]).await;

    let response = app.post_form("/checkout/shipping", &valid_shipping()).await;
    assert_eq!(location(&response), Some("/checkout"));
    let body = app.page("/checkout").await;
    assert!(body.contains("Ada Lovelace"));
    assert!(body.contains("SW1Y 4JH"));
}
