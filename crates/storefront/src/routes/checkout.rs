//! Checkout route handlers.

use almed_core::PaymentMethod;
use almed_core::cart::{CART_CHANGED_EVENT, CartPanel};
use almed_core::checkout::{CheckoutForm, NewTransaction};
use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Serialize;
use tracing::instrument;

use crate::api::ApiError;
use crate::error::add_breadcrumb;
use crate::routes::HX_TRIGGER;
use crate::session::RequireUser;
use crate::state::AppState;

/// Where shoppers land after placing an order.
pub const TRANSACTIONS_PATH: &str = "/transactions";

/// A payment option.
#[derive(Debug, Serialize)]
pub struct PaymentOption {
    pub method: PaymentMethod,
    pub label: &'static str,
    pub description: &'static str,
}

/// Checkout page view.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub methods: Vec<PaymentOption>,
    /// Chat link for Whatsapp payments, if the store has a number.
    pub whatsapp_url: Option<String>,
    pub cart: CartPanel,
}

/// Checkout failure: what went wrong plus the submitted form, so it can be
/// shown again for another try.
#[derive(Debug, Serialize)]
pub struct CheckoutFailure {
    pub message: String,
    pub form: CheckoutForm,
}

fn failure(status: StatusCode, message: String, form: CheckoutForm) -> Response {
    (status, Json(CheckoutFailure { message, form })).into_response()
}

/// Chat link for a store number like `+62 821-4651-0812`.
#[must_use]
pub fn whatsapp_url(number: &str) -> Option<String> {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    (!digits.is_empty()).then(|| format!("https://wa.me/{digits}"))
}

/// Display payment options and the cart being paid for.
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn show(State(state): State<AppState>, user: RequireUser) -> Json<CheckoutView> {
    let session = state.carts().session(&user.0.id);

    Json(CheckoutView {
        methods: PaymentMethod::ALL
            .iter()
            .map(|&method| PaymentOption {
                method,
                label: method.label(),
                description: method.description(),
            })
            .collect(),
        whatsapp_url: state
            .config()
            .whatsapp_number
            .as_deref()
            .and_then(whatsapp_url),
        cart: CartPanel::for_lines(&session.store.read_all()),
    })
}

/// Place the order.
///
/// On success the catalog cache is dropped, the cart is cleared and the
/// shopper is redirected to their transactions. Validation failures and API
/// rejections answer with the message and the submitted form.
#[instrument(skip(state, user, form), fields(user_id = %user.0.id))]
pub async fn submit(
    State(state): State<AppState>,
    user: RequireUser,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let session = state.carts().session(&user.0.id);
    let lines = session.store.read_all();

    let payload = match NewTransaction::build(&form, user.0.id.clone(), &lines) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!(error = %e, "Checkout form refused");
            return failure(StatusCode::UNPROCESSABLE_ENTITY, e.to_string(), form);
        }
    };

    if let Err(e) = state.api().create_transaction(&payload).await {
        return match e {
            ApiError::Rejected(message) => {
                failure(StatusCode::UNPROCESSABLE_ENTITY, message, form)
            }
            other => {
                tracing::error!("Failed to submit transaction: {other}");
                failure(
                    StatusCode::BAD_GATEWAY,
                    "Checkout is unavailable right now, please try again".to_string(),
                    form,
                )
            }
        };
    }

    add_breadcrumb(
        "checkout",
        "Transaction created",
        Some(&[("payment_method", payload.payment_method.as_str())]),
    );

    // Stock moved, so cached catalog pages are stale.
    state.api().invalidate_catalog().await;

    // The order is already placed, so a failed clear does not fail checkout.
    if let Err(e) = session.store.clear() {
        tracing::error!("Failed to clear cart after checkout: {e}");
    }

    (
        AppendHeaders([(HX_TRIGGER, CART_CHANGED_EVENT)]),
        Redirect::to(TRANSACTIONS_PATH),
    )
        .into_response()
}
