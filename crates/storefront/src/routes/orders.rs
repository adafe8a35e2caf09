//! Order history route handler.
//!
//! The filter and the set of expanded cards live in the query string, so
//! every toggle is a plain link.

use std::collections::BTreeSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use fsad_core::{Order, OrderAddress, OrderId, StatusFilter, TimelineStep, sort_newest_first};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::components::HeaderView;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;

const LOAD_FAILURE_MESSAGE: &str = "Failed to load orders. Please try again.";

/// Query parameters of the orders page.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
    /// Comma-separated ids of expanded orders.
    pub expanded: Option<String>,
}

/// Page state decoded from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdersView {
    pub filter: StatusFilter,
    pub expanded: BTreeSet<OrderId>,
}

impl OrdersView {
    /// Decode the query; unknown filters fall back to `All` and unparsable
    /// ids are dropped.
    #[must_use]
    pub fn from_query(query: &OrdersQuery) -> Self {
        Self {
            filter: query
                .status
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            expanded: query
                .expanded
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .filter_map(|id| id.parse().ok())
                .collect(),
        }
    }

    /// Link to the page with `filter` and `expanded`.
    fn href(filter: StatusFilter, expanded: &BTreeSet<OrderId>) -> String {
        let mut params = Vec::new();
        if filter != StatusFilter::All {
            params.push(format!("status={}", urlencoding::encode(filter.label())));
        }
        if !expanded.is_empty() {
            let ids: Vec<String> = expanded
                .iter()
                .map(|id| urlencoding::encode(&id.to_string()).into_owned())
                .collect();
            params.push(format!("expanded={}", ids.join(",")));
        }

        if params.is_empty() {
            "/orders".to_string()
        } else {
            format!("/orders?{}", params.join("&"))
        }
    }

    /// Link that switches the filter, keeping expanded cards.
    #[must_use]
    pub fn filter_href(&self, filter: StatusFilter) -> String {
        Self::href(filter, &self.expanded)
    }

    /// Link that expands or collapses one card, keeping the filter.
    #[must_use]
    pub fn toggle_href(&self, id: &OrderId) -> String {
        let mut expanded = self.expanded.clone();
        if !expanded.remove(id) {
            expanded.insert(id.clone());
        }
        Self::href(self.filter, &expanded)
    }
}

/// Filter tab display data.
#[derive(Debug, Clone)]
pub struct FilterTab {
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

/// Order line display data.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub name: String,
    pub image: String,
    pub href: Option<String>,
    pub quantity: u32,
    pub price: String,
}

/// Order card display data.
#[derive(Debug, Clone)]
pub struct OrderCardView {
    pub number: String,
    pub date: String,
    pub total: String,
    /// The service's status string, or `Pending` when it sent none.
    pub status: String,
    pub status_color: &'static str,
    pub item_count: usize,
    pub expanded: bool,
    /// `None` when the order has no id to key the toggle on.
    pub toggle_href: Option<String>,
    pub timeline: Vec<TimelineStep>,
    pub items: Vec<OrderItemView>,
    pub shipping_address: Option<OrderAddress>,
    pub payment_method: String,
    pub transaction_id: String,
    pub payment_status: String,
}

impl OrderCardView {
    fn new(order: &Order, view: &OrdersView) -> Self {
        let status = order.status();
        Self {
            number: order.number(),
            date: order.created_date_string(),
            total: order.total_string(),
            status: order.status_label().to_string(),
            status_color: status.color(),
            item_count: order.items.len(),
            expanded: order.id.as_ref().is_some_and(|id| view.expanded.contains(id)),
            toggle_href: order.id.as_ref().map(|id| view.toggle_href(id)),
            timeline: order.timeline(),
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    name: item.name().to_string(),
                    image: item.image().to_string(),
                    href: item
                        .linked_product_id()
                        .map(|id| format!("/products/{}", urlencoding::encode(&id.to_string()))),
                    quantity: item.quantity,
                    price: item.price_string(),
                })
                .collect(),
            shipping_address: order.shipping_address.clone(),
            payment_method: order.payment_method_or_default().to_string(),
            transaction_id: order.transaction_id_or_default().to_string(),
            payment_status: order.payment_status_or_default().to_string(),
        }
    }
}

/// Orders page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub header: Option<HeaderView>,
    pub tabs: Vec<FilterTab>,
    pub orders: Vec<OrderCardView>,
    pub error: Option<String>,
}

/// Sort, filter and render the cards for `orders`.
#[must_use]
pub fn order_cards(mut orders: Vec<Order>, view: &OrdersView) -> Vec<OrderCardView> {
    sort_newest_first(&mut orders);
    orders
        .iter()
        .filter(|order| view.filter.matches(order))
        .map(|order| OrderCardView::new(order, view))
        .collect()
}

/// Display the signed-in customer's order history.
#[instrument(skip_all, fields(status = ?query.status))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<OrdersQuery>,
) -> OrdersTemplate {
    let view = OrdersView::from_query(&query);

    let (orders, error) = match state.backend().list_orders(&user.access_token).await {
        Ok(orders) => (order_cards(orders, &view), None),
        Err(e) => {
            warn!(error = %e, "Failed to load orders");
            let message = e.backend_message().unwrap_or(LOAD_FAILURE_MESSAGE).to_string();
            (Vec::new(), Some(message))
        }
    };

    OrdersTemplate {
        header: HeaderView::for_request(Some(&user), "/orders"),
        tabs: StatusFilter::options()
            .into_iter()
            .map(|filter| FilterTab {
                label: filter.label(),
                href: view.filter_href(filter),
                active: filter == view.filter,
            })
            .collect(),
        orders,
        error,
    }
}
