//! Type-safe price representation using decimal arithmetic.
//!
//! The marketplace API sends prices as text (`"10000"`, `"12500.50"`). A
//! [`Price`] is what that text becomes once it parses; text that does not
//! parse never becomes a price and callers decide how to treat it.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (rupiah, not sen).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a rupiah price.
    #[must_use]
    pub const fn idr(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::IDR)
    }

    /// Parse a price transmitted as text.
    ///
    /// Surrounding whitespace is ignored. Empty or non-numeric text yields
    /// `None`.
    ///
    /// ```
    /// use almed_core::Price;
    ///
    /// assert!(Price::parse(" 10000 ").is_some());
    /// assert!(Price::parse("").is_none());
    /// assert!(Price::parse("sepuluh ribu").is_none());
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .ok()
            .map(Self::idr)
    }

    /// Format for display, e.g. `Rp 30.000` or `Rp 12.500,50`.
    ///
    /// Uses `.` to group thousands and `,` before the fraction. The fraction
    /// is rounded to the currency's two minor digits and omitted when zero.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.amount.round_dp(2).normalize();
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let digits = rounded.abs().to_string();
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (digits.as_str(), None),
        };

        let mut out = format!("{sign}{} {}", self.currency_code.symbol(), group_thousands(whole));
        if let Some(fraction) = fraction {
            out.push(',');
            out.push_str(fraction);
            for _ in fraction.len()..2 {
                out.push('0');
            }
        }
        out
    }
}

/// Insert `.` between every group of three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    IDR,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::IDR => "Rp",
        }
    }
}
