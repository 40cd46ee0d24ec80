//! Transaction history route handler.

use almed_core::transactions::TransactionFilter;
use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::session::RequireUser;
use crate::state::AppState;
use crate::views::TransactionRow;

/// History query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    /// Search text.
    pub q: Option<String>,
    /// `paid` or `unpaid`.
    pub paid: Option<String>,
}

/// Transaction history view.
#[derive(Debug, Serialize)]
pub struct TransactionsView {
    pub available: bool,
    pub transactions: Vec<TransactionRow>,
    pub shown: usize,
    pub total: usize,
    /// "Showing X of Y".
    pub summary: String,
}

/// Display the shopper's transactions.
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn index(
    State(state): State<AppState>,
    user: RequireUser,
    Query(params): Query<TransactionsQuery>,
) -> Json<TransactionsView> {
    let (available, history) = match state.api().transactions(&user.0.id).await {
        Ok(history) => (true, history),
        Err(e) => {
            tracing::error!("Failed to fetch transactions: {e}");
            (false, Vec::new())
        }
    };

    let filter = TransactionFilter::from_params(params.q.as_deref(), params.paid.as_deref());
    let result = filter.apply(&history);

    Json(TransactionsView {
        available,
        summary: result.summary(),
        shown: result.shown,
        total: result.total,
        transactions: result
            .transactions
            .iter()
            .map(|tx| TransactionRow::from(*tx))
            .collect(),
    })
}
