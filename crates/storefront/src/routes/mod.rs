//! HTTP route handlers for storefront.
//!
//! Every page answers with a JSON view model; rendering is up to the client.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (marketplace API reachable)
//!
//! # Catalog
//! GET  /                       - Home: featured, categories, newest
//! GET  /list                   - Filtered and sorted product list
//! GET  /products/{slug}        - Product detail
//!
//! # Cart (requires user, mutations send HX-Trigger: cart-changed)
//! GET  /cart                   - Cart panel
//! GET  /cart/count             - Cart badge count
//! POST /cart/add               - Add a product
//! POST /cart/remove            - Remove every line of a product
//!
//! # Checkout (requires user)
//! GET  /checkout               - Payment options and cart summary
//! POST /checkout               - Place the order
//!
//! # Account (requires user)
//! GET  /transactions           - Transaction history
//! GET  /account                - Profile
//! POST /logout                 - Sign out
//! ```

pub mod account;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod home;
pub mod list;
pub mod products;
pub mod transactions;

use almed_core::{Category, Product};
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Header carrying client-side events for HTMX.
pub const HX_TRIGGER: &str = "HX-Trigger";

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Catalog
        .route("/", get(home::home))
        .route("/list", get(list::list))
        .route("/products/{slug}", get(products::show))
        // Cart
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::submit))
        // Account
        .route("/transactions", get(transactions::index))
        .route("/account", get(account::show))
        .route("/logout", post(account::logout))
}

/// Products and categories for a page, or nothing if the API is down.
#[derive(Debug, Default)]
pub struct Catalog {
    pub available: bool,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
}

/// Fetch products and categories concurrently.
///
/// Either fetch failing makes the whole catalog unavailable; the error is
/// logged and the page renders its empty state.
pub async fn load_catalog(state: &AppState) -> Catalog {
    let (products, categories) = tokio::join!(state.api().products(), state.api().categories());

    match (products, categories) {
        (Ok(products), Ok(categories)) => Catalog {
            available: true,
            products,
            categories,
        },
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to load catalog: {e}");
            Catalog::default()
        }
    }
}
