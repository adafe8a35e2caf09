//! Catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use fsad_core::{PLACEHOLDER_IMAGE, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::backend::Product;
use crate::components::HeaderView;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::services::cart as cart_store;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: ProductId,
    pub name: String,
    pub price: String,
    pub stock: u32,
    pub in_stock: bool,
    pub image: String,
    pub description: Option<String>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            price: product.price_string(),
            in_stock: product.in_stock(),
            id: product.id,
            name: product.name,
            stock: product.stock,
            image: product
                .image
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            description: product.description,
        }
    }
}

/// Query parameters for flash messages after a cart post.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub header: Option<HeaderView>,
    pub products: Vec<ProductView>,
    pub cart_count: u32,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub header: Option<HeaderView>,
    pub product: ProductView,
    pub cart_count: u32,
}

/// Display the catalog.
#[instrument(skip(state, user, session))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> DashboardTemplate {
    let cart_count = cart_store::load_cart(&session).await.totals().item_count;

    let (products, load_error) = match state.backend().list_products().await {
        Ok(products) => (products.into_iter().map(ProductView::from).collect(), None),
        Err(e) => {
            warn!(error = %e, "Failed to load catalog");
            (
                Vec::new(),
                Some("Failed to load products. Please try again.".to_string()),
            )
        }
    };

    DashboardTemplate {
        header: HeaderView::for_request(Some(&user), "/dashboard"),
        products,
        cart_count,
        error: load_error.or(query.error),
        success: query.success,
    }
}

/// Display one product.
#[instrument(skip(state, user, session))]
pub async fn product(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(id): Path<ProductId>,
) -> Result<ProductTemplate> {
    let product = state.backend().get_product(&id).await?;
    let cart_count = cart_store::load_cart(&session).await.totals().item_count;

    Ok(ProductTemplate {
        header: HeaderView::for_request(Some(&user), &format!("/products/{id}")),
        product: ProductView::from(product),
        cart_count,
    })
}
