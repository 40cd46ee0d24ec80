//! Status enums for transactions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A payment method name that is not `COD` or `WHATSAPP`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

/// How the shopper pays for a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cod,
    /// Payment arranged over WhatsApp, with proof sent by message.
    Whatsapp,
}

impl PaymentMethod {
    /// All methods, in the order they are offered at checkout.
    pub const ALL: [Self; 2] = [Self::Cod, Self::Whatsapp];

    /// Wire name used by the marketplace API.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::Whatsapp => "WHATSAPP",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cod => "Cash On Delivery",
            Self::Whatsapp => "Whatsapp",
        }
    }

    /// Short explanation shown next to the option.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Cod => "Pay when the order arrives",
            Self::Whatsapp => "Pay by transfer and send the proof over Whatsapp",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "COD" => Ok(Self::Cod),
            "WHATSAPP" => Ok(Self::Whatsapp),
            _ => Err(UnknownPaymentMethod(s.to_string())),
        }
    }
}

/// Payment state of a transaction, as shown in the history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl From<bool> for PaymentStatus {
    fn from(is_paid: bool) -> Self {
        if is_paid { Self::Paid } else { Self::Unpaid }
    }
}
