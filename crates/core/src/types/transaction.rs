//! Transactions (orders) as returned by the marketplace API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{OrderItemId, ProductId, StoreId, TransactionId, UserId};
use super::price::Price;
use super::product::Product;
use super::status::{PaymentMethod, PaymentStatus};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<StoreId>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub post_code: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_proof_url: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Transaction {
    /// Total as a rupiah price.
    #[must_use]
    pub const fn total(&self) -> Price {
        Price::idr(self.total_amount)
    }

    /// Paid or unpaid.
    #[must_use]
    pub fn payment_status(&self) -> PaymentStatus {
        PaymentStatus::from(self.is_paid)
    }
}

/// One product line of a transaction, with the price it was sold at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderItemId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,
    pub product_id: ProductId,
    /// Snapshot of the product at the time of the order.
    pub product: Product,
    pub quantity: u32,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}
