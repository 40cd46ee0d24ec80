//! Product list page.

use almed_core::catalog::{CatalogQuery, SortKey};
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::routes::load_catalog;
use crate::session::OptionalUser;
use crate::state::AppState;
use crate::views::{CategoryLink, ProductCard, cards};

/// List page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Name search.
    pub name: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
}

/// List page view.
#[derive(Debug, Serialize)]
pub struct ListView {
    pub available: bool,
    pub products: Vec<ProductCard>,
    /// Filter options.
    pub categories: Vec<CategoryLink>,
    pub sort: Option<SortKey>,
    /// Set when `products` is empty.
    pub empty_message: Option<String>,
    pub cart_count: Option<usize>,
}

impl ListQuery {
    /// Catalog query for these parameters. The list page sorts newest first
    /// unless told otherwise.
    #[must_use]
    pub fn to_catalog_query(&self) -> CatalogQuery {
        let sort = self
            .sort
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(SortKey::Newest.as_str());

        CatalogQuery::from_params(
            self.name.as_deref(),
            self.category.as_deref(),
            Some(sort),
            self.min.as_deref(),
            self.max.as_deref(),
        )
    }
}

/// Display the filtered product list.
#[instrument(skip(state, user))]
pub async fn list(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(params): Query<ListQuery>,
) -> Json<ListView> {
    let catalog = load_catalog(&state).await;
    let query = params.to_catalog_query();
    let products = cards(query.apply(&catalog.products));

    tracing::debug!(shown = products.len(), total = catalog.products.len(), "Product list");

    Json(ListView {
        available: catalog.available,
        empty_message: products.is_empty().then(|| query.empty_message()),
        products,
        categories: catalog.categories.iter().map(CategoryLink::from).collect(),
        sort: query.sort,
        cart_count: user.map(|u| state.carts().session(&u.id).indicator.badge_count()),
    })
}
