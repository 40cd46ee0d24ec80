//! Product detail route handler.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::instrument;

use crate::state::AppState;
use crate::views::{ProductDetail, slugify};

/// Product page view.
#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub available: bool,
    pub product: Option<ProductDetail>,
}

/// Display a product by the slug of its name.
///
/// When several products share a slug the first one in catalog order wins.
#[instrument(skip(state), fields(slug = %slug))]
pub async fn show(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let products = match state.api().products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::error!("Failed to fetch products: {e}");
            return Json(ProductPage {
                available: false,
                product: None,
            })
            .into_response();
        }
    };

    let wanted = slugify(&slug);
    match products.iter().find(|p| slugify(&p.name) == wanted) {
        Some(product) => Json(ProductPage {
            available: true,
            product: Some(ProductDetail::from(product)),
        })
        .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ProductPage {
                available: true,
                product: None,
            }),
        )
            .into_response(),
    }
}
