//! Cart route handlers.
//!
//! Each shopper's cart lives in their [`CartSession`](crate::carts::CartSession).
//! Mutations answer with the new cart summary and an `HX-Trigger:
//! cart-changed` header so every cart widget on the page refreshes itself.

use almed_core::ProductId;
use almed_core::cart::{CART_CHANGED_EVENT, CartPanel, CartState};
use axum::{
    Form, Json,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::routes::HX_TRIGGER;
use crate::session::RequireUser;
use crate::state::AppState;

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart panel plus badge state.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub count: usize,
    pub open: bool,
    pub panel: CartPanel,
}

/// Cart badge.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: usize,
}

fn cart_view(state: &AppState, user: &RequireUser) -> CartView {
    let session = state.carts().session(&user.0.id);
    CartView {
        count: session.indicator.badge_count(),
        open: session.indicator.is_open(),
        panel: session.indicator.panel(),
    }
}

/// Display the cart panel.
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn show(State(state): State<AppState>, user: RequireUser) -> Json<CartView> {
    Json(cart_view(&state, &user))
}

/// Get cart count badge.
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn count(State(state): State<AppState>, user: RequireUser) -> Json<CartCount> {
    let session = state.carts().session(&user.0.id);
    Json(CartCount {
        count: session.indicator.badge_count(),
    })
}

/// Add a product to the cart.
///
/// The product is looked up in the catalog so the cart keeps a full
/// snapshot of it. Adding a product already in the cart adds another line.
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn add(
    State(state): State<AppState>,
    user: RequireUser,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = form.quantity.unwrap_or(1);
    let product_id = ProductId::new(form.product_id);

    let product = state
        .api()
        .products()
        .await?
        .into_iter()
        .find(|p| p.id == product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    state
        .carts()
        .session(&user.0.id)
        .store
        .add(product, quantity)?;

    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product_id.as_str())]),
    );

    Ok((
        AppendHeaders([(HX_TRIGGER, CART_CHANGED_EVENT)]),
        Json(cart_view(&state, &user)),
    )
        .into_response())
}

/// Remove every line of a product from the cart.
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn remove(
    State(state): State<AppState>,
    user: RequireUser,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);
    let cart_state = state
        .carts()
        .session(&user.0.id)
        .store
        .remove(&product_id)?;

    if cart_state == CartState::Empty {
        tracing::debug!("Cart is now empty");
    }

    Ok((
        AppendHeaders([(HX_TRIGGER, CART_CHANGED_EVENT)]),
        Json(cart_view(&state, &user)),
    )
        .into_response())
}
