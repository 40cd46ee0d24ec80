//! Home page route handler.

use almed_core::catalog::CatalogQuery;
use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::routes::load_catalog;
use crate::session::OptionalUser;
use crate::state::AppState;
use crate::views::{CategoryLink, ProductCard, cards};

/// Home page view.
#[derive(Debug, Serialize)]
pub struct HomeView {
    /// False when the catalog could not be loaded.
    pub available: bool,
    pub featured: Vec<ProductCard>,
    pub categories: Vec<CategoryLink>,
    pub newest: Vec<ProductCard>,
    /// Badge count for a signed-in shopper.
    pub cart_count: Option<usize>,
}

/// Display home page.
#[instrument(skip(state, user))]
pub async fn home(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
) -> Json<HomeView> {
    let catalog = load_catalog(&state).await;

    let featured = CatalogQuery {
        featured_only: true,
        ..CatalogQuery::default()
    };
    let newest = CatalogQuery {
        newest_only: true,
        ..CatalogQuery::default()
    };

    Json(HomeView {
        available: catalog.available,
        featured: cards(featured.apply(&catalog.products)),
        categories: catalog.categories.iter().map(CategoryLink::from).collect(),
        newest: cards(newest.apply(&catalog.products)),
        cart_count: user.map(|u| state.carts().session(&u.id).indicator.badge_count()),
    })
}
