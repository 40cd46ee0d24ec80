//! Transaction history filtering.

use serde::Serialize;

use crate::types::{PaymentStatus, Transaction};

/// Search and paid-status filter for a shopper's transaction history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Case-insensitive text matched against the transaction id, the
    /// payment method and the names of ordered products.
    pub search: Option<String>,
    pub paid: Option<PaymentStatus>,
}

/// Result of [`TransactionFilter::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilteredTransactions<'a> {
    pub transactions: Vec<&'a Transaction>,
    pub shown: usize,
    pub total: usize,
}

impl FilteredTransactions<'_> {
    /// "Showing X of Y" summary line.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("Showing {} of {}", self.shown, self.total)
    }
}

impl TransactionFilter {
    /// Build a filter from raw query parameters. Blank search text means no
    /// search; `paid` accepts `paid`/`true` and `unpaid`/`false`, anything
    /// else means both.
    #[must_use]
    pub fn from_params(search: Option<&str>, paid: Option<&str>) -> Self {
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        let paid = match paid.map(|p| p.trim().to_ascii_lowercase()).as_deref() {
            Some("paid" | "true") => Some(PaymentStatus::Paid),
            Some("unpaid" | "false") => Some(PaymentStatus::Unpaid),
            _ => None,
        };

        Self { search, paid }
    }

    /// Whether `tx` passes both filters.
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.paid.is_some_and(|paid| paid != tx.payment_status()) {
            return false;
        }

        let Some(search) = &self.search else {
            return true;
        };
        let needle = search.to_lowercase();

        tx.id.as_str().to_lowercase().contains(&needle)
            || tx.payment_method.as_str().to_lowercase().contains(&needle)
            || tx
                .order_items
                .iter()
                .any(|item| item.product.name.to_lowercase().contains(&needle))
    }

    /// Matching transactions in their original order, with counts.
    #[must_use]
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> FilteredTransactions<'a> {
        let matched: Vec<&Transaction> = transactions
            .iter()
            .filter(|tx| self.matches(tx))
            .collect();
        FilteredTransactions {
            shown: matched.len(),
            total: transactions.len(),
            transactions: matched,
        }
    }
}
