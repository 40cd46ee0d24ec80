//! Core types for the AlMed storefront.
//!
//! This module provides type-safe wrappers for ids and prices, and the
//! entities exchanged with the marketplace API.

pub mod id;
pub mod price;
pub mod product;
pub mod status;
pub mod transaction;
pub mod user;

pub use id::*;
pub use price::{CurrencyCode, Price};
pub use product::{Category, Image, Product, parse_timestamp};
pub use status::{PaymentMethod, PaymentStatus, UnknownPaymentMethod};
pub use transaction::{OrderItem, Transaction};
pub use user::{SessionUser, UserProfile};
