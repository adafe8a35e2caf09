//! Checkout wizard route handlers.
//!
//! Wizard state lives in the session; every post redirects back to
//! `GET /checkout` except validation failures, which re-render the step
//! with field errors. Backend failures land in the error banner.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use fsad_core::{Cart, CartItem, Order, PLACEHOLDER_IMAGE, PaymentForm, ProductId, ShippingForm};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::components::{HeaderView, PaymentFormView, ShippingFormView};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CheckoutState, CheckoutStep, CurrentUser};
use crate::services::cart as cart_store;
use crate::services::{CheckoutError, CheckoutService};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Step indicator entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub number: u8,
    pub label: &'static str,
    pub active: bool,
    pub completed: bool,
}

impl StepView {
    fn indicator(current: CheckoutStep) -> Vec<Self> {
        CheckoutStep::ALL
            .into_iter()
            .map(|step| Self {
                number: step.number(),
                label: step.label(),
                active: step == current,
                completed: step < current,
            })
            .collect()
    }
}

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub price: String,
    pub line_total: String,
    pub quantity: u32,
    pub decrease_to: i64,
    pub increase_to: i64,
    pub at_max_stock: bool,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        let quantity = i64::from(item.quantity);
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            image: item
                .image
                .clone()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            price: item.price.display(),
            line_total: item.line_total().display(),
            quantity: item.quantity,
            decrease_to: quantity - 1,
            increase_to: quantity + 1,
            at_max_stock: item.at_max_stock(),
        }
    }
}

/// Order summary sidebar.
#[derive(Debug, Clone)]
pub struct SummaryView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub subtotal: String,
    pub total: String,
}

impl From<&Cart> for SummaryView {
    fn from(cart: &Cart) -> Self {
        let totals = cart.totals();
        Self {
            lines: cart.items().iter().map(CartLineView::from).collect(),
            item_count: totals.item_count,
            subtotal: totals.subtotal.display(),
            total: totals.total.display(),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub header: Option<HeaderView>,
    pub steps: Vec<StepView>,
    pub step_number: u8,
    pub error: Option<String>,
    pub summary: SummaryView,
    pub shipping: ShippingFormView,
    /// Stored address shown above the payment form.
    pub ship_to: Option<ShippingForm>,
    pub payment: PaymentFormView,
    /// A payment from this session is in flight; the Pay button is disabled.
    pub processing: bool,
}

impl CheckoutTemplate {
    fn new(user: &CurrentUser, cart: &Cart, state: &CheckoutState) -> Self {
        Self {
            header: HeaderView::for_request(Some(user), "/checkout"),
            steps: StepView::indicator(state.step),
            step_number: state.step.number(),
            error: state.error.clone(),
            summary: SummaryView::from(cart),
            shipping: ShippingFormView::prefilled(state.shipping.clone().unwrap_or_default()),
            ship_to: state.shipping.clone(),
            payment: PaymentFormView::empty(),
            processing: state.is_processing(Utc::now()),
        }
    }
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub header: Option<HeaderView>,
    pub order_number: Option<String>,
    pub total: Option<String>,
    pub transaction_id: String,
    pub item_count: usize,
}

impl ConfirmationTemplate {
    fn new(user: &CurrentUser, order: Option<&Order>, transaction_id: String) -> Self {
        Self {
            header: HeaderView::for_request(Some(user), "/order-confirmation"),
            order_number: order.filter(|o| o.id.is_some()).map(Order::number),
            total: order.map(|o| format!("${}", o.total_string())),
            transaction_id,
            item_count: order.map_or(0, |o| o.items.len()),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Apply `change` to the wizard state and redirect back to the wizard.
///
/// An empty cart short-circuits to the catalog.
async fn transition(session: &Session, change: impl FnOnce(&mut CheckoutState)) -> Result<Redirect> {
    if cart_store::load_cart(session).await.is_empty() {
        return Ok(Redirect::to("/dashboard"));
    }

    let mut state = cart_store::load_checkout(session).await;
    change(&mut state);
    cart_store::save_checkout(session, &state).await?;
    Ok(Redirect::to("/checkout"))
}

/// Display the current wizard step.
#[instrument(skip_all)]
pub async fn show(RequireAuth(user): RequireAuth, session: Session) -> Result<Response> {
    let cart = cart_store::load_cart(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let state = cart_store::load_checkout(&session).await;
    Ok(CheckoutTemplate::new(&user, &cart, &state).into_response())
}

/// Step 1 -> 2.
#[instrument(skip_all)]
pub async fn continue_to_shipping(
    RequireAuth(_user): RequireAuth,
    session: Session,
) -> Result<Redirect> {
    transition(&session, |state| state.go_to(CheckoutStep::Shipping)).await
}

/// Back to step 1.
#[instrument(skip_all)]
pub async fn back_to_cart(RequireAuth(_user): RequireAuth, session: Session) -> Result<Redirect> {
    transition(&session, |state| state.go_to(CheckoutStep::CartReview)).await
}

/// Back to step 2; the stored address pre-fills the form.
#[instrument(skip_all)]
pub async fn back_to_shipping(
    RequireAuth(_user): RequireAuth,
    session: Session,
) -> Result<Redirect> {
    transition(&session, |state| state.go_to(CheckoutStep::Shipping)).await
}

/// Hide the error banner.
#[instrument(skip_all)]
pub async fn dismiss_error(RequireAuth(_user): RequireAuth, session: Session) -> Result<Redirect> {
    transition(&session, |state| state.error = None).await
}

/// Validate and store the shipping address, then move to payment.
#[instrument(skip_all)]
pub async fn submit_shipping(
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<ShippingForm>,
) -> Result<Response> {
    let cart = cart_store::load_cart(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let form = form.trimmed();
    let mut state = cart_store::load_checkout(&session).await;

    match form.validate() {
        Ok(()) => {
            state.complete_shipping(form);
            cart_store::save_checkout(&session, &state).await?;
            add_breadcrumb("checkout", "Shipping saved", None);
            Ok(Redirect::to("/checkout").into_response())
        }
        Err(errors) => {
            state.go_to(CheckoutStep::Shipping);
            let mut page = CheckoutTemplate::new(&user, &cart, &state);
            page.shipping = ShippingFormView::with_errors(form, &errors);
            Ok(page.into_response())
        }
    }
}

/// Validate the payment form, charge, and create the order.
///
/// Card details only live for the duration of this request. A submission
/// arriving while another one is in flight goes back to the wizard without
/// touching the backend.
#[instrument(skip_all)]
pub async fn submit_payment(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<PaymentForm>,
) -> Result<Response> {
    let cart = cart_store::load_cart(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/dashboard").into_response());
    }

    let mut checkout = cart_store::load_checkout(&session).await;
    let Some(shipping) = checkout.shipping.clone() else {
        checkout.go_to(CheckoutStep::Shipping);
        cart_store::save_checkout(&session, &checkout).await?;
        return Ok(Redirect::to("/checkout").into_response());
    };

    let now = Utc::now();
    if checkout.is_processing(now) {
        warn!("Duplicate payment submission ignored");
        return Ok(Redirect::to("/checkout").into_response());
    }

    let form = form.normalize();
    let payment = match form.validate(now.date_naive()) {
        Ok(payment) => payment,
        Err(errors) => {
            checkout.go_to(CheckoutStep::Payment);
            let mut page = CheckoutTemplate::new(&user, &cart, &checkout);
            page.payment = PaymentFormView::from_form(&form, &errors);
            return Ok(page.into_response());
        }
    };

    if !checkout.start_processing(now) {
        return Ok(Redirect::to("/checkout").into_response());
    }
    cart_store::save_checkout_now(&session, &checkout).await?;

    let result = CheckoutService::new(state.backend())
        .place_order(&user.access_token, &cart, &shipping, &payment)
        .await;

    match result {
        Ok(placed) => {
            info!(transaction_id = %placed.transaction_id, "Checkout complete");
            cart_store::finish_checkout(&session, &placed).await?;
            Ok(Redirect::to("/order-confirmation").into_response())
        }
        Err(err) => {
            report_failure(&err);
            checkout.stop_processing();
            checkout.go_to(CheckoutStep::Payment);
            checkout.fail(err.user_message());
            cart_store::save_checkout(&session, &checkout).await?;
            Ok(Redirect::to("/checkout").into_response())
        }
    }
}

fn report_failure(err: &CheckoutError) {
    match err {
        CheckoutError::Backend(_) => {
            let event_id = sentry::capture_error(err);
            tracing::error!(error = %err, sentry_event_id = %event_id, "Checkout failed");
        }
        CheckoutError::OrderRejected(_) => {
            tracing::error!(error = %err, "Order rejected after payment was captured");
        }
        CheckoutError::PaymentDeclined(_) | CheckoutError::EmptyCart => {
            warn!(error = %err, "Checkout failed");
        }
    }
}

/// Show the order just placed. Only available once per checkout.
#[instrument(skip_all)]
pub async fn confirmation(RequireAuth(user): RequireAuth, session: Session) -> Result<Response> {
    let Some(placed) = cart_store::take_confirmation(&session).await? else {
        return Ok(Redirect::to("/orders").into_response());
    };

    Ok(
        ConfirmationTemplate::new(&user, placed.order.as_ref(), placed.transaction_id)
            .into_response(),
    )
}
