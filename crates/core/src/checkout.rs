//! Checkout form validation and the order payload sent to the marketplace.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::cart::{CartLineItem, subtotal};
use crate::types::{PaymentMethod, ProductId, UserId};

/// Why a checkout form was refused before anything was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Choose a payment method")]
    MissingPaymentMethod,

    #[error("Your cart is empty")]
    EmptyCart,

    #[error("Please fill in the {0} field")]
    MissingField(&'static str),

    #[error("Contact us on Whatsapp before placing a Whatsapp order")]
    WhatsappNotContacted,
}

/// What the shopper typed into the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub post_code: String,
    #[serde(default)]
    pub payment_proof_url: String,
    /// The shopper opened the Whatsapp chat with the store.
    #[serde(default, deserialize_with = "checkbox")]
    pub whatsapp_contacted: bool,
}

impl CheckoutForm {
    /// Check the form against the cart it would pay for.
    ///
    /// # Errors
    ///
    /// Checks run in order and the first failure is returned: payment
    /// method chosen, cart not empty, required fields filled, and for
    /// Whatsapp orders that the shopper has contacted the store.
    pub fn validate(&self, lines: &[CartLineItem]) -> Result<PaymentMethod, CheckoutError> {
        let method = self.payment_method.ok_or(CheckoutError::MissingPaymentMethod)?;

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        for (field, value) in [
            ("name", &self.name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("post code", &self.post_code),
        ] {
            if value.trim().is_empty() {
                return Err(CheckoutError::MissingField(field));
            }
        }

        if method == PaymentMethod::Whatsapp && !self.whatsapp_contacted {
            return Err(CheckoutError::WhatsappNotContacted);
        }

        Ok(method)
    }
}

/// One ordered product in a [`NewTransaction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of the create-transaction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub post_code: String,
    pub user_id: UserId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_pay: Decimal,
    pub payment_method: PaymentMethod,
    pub payment_proof_url: String,
    pub order_items: Vec<NewOrderItem>,
}

impl NewTransaction {
    /// Validate `form` and build the payload for `user_id`'s cart.
    ///
    /// The total is the cart subtotal; order items follow cart order.
    ///
    /// # Errors
    ///
    /// Returns the first [`CheckoutError`] from [`CheckoutForm::validate`].
    pub fn build(
        form: &CheckoutForm,
        user_id: UserId,
        lines: &[CartLineItem],
    ) -> Result<Self, CheckoutError> {
        let payment_method = form.validate(lines)?;

        Ok(Self {
            name: form.name.trim().to_owned(),
            phone: form.phone.trim().to_owned(),
            address: form.address.trim().to_owned(),
            post_code: form.post_code.trim().to_owned(),
            user_id,
            total_pay: subtotal(lines).amount,
            payment_method,
            payment_proof_url: form.payment_proof_url.trim().to_owned(),
            order_items: lines
                .iter()
                .map(|line| NewOrderItem {
                    product_id: line.product.id.clone(),
                    quantity: line.quantity,
                })
                .collect(),
        })
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<PaymentMethod>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// HTML checkboxes submit `on`; JSON clients send a boolean.
fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Text(text) => matches!(text.trim(), "on" | "true" | "1" | "yes"),
    })
}
