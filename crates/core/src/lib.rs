//! AlMed Core - Shared storefront library.
//!
//! This crate holds everything the storefront needs that does not talk to
//! the network:
//! - [`types`] - Type-safe ids, prices and the marketplace API entities
//! - [`catalog`] - The catalog view engine (filter, sort, search, price range)
//! - [`cart`] - The shopper's cart store, its storage seam and change notifications
//! - [`transactions`] - Filtering for the transaction history view
//! - [`checkout`] - Checkout form validation and the order payload
//!
//! # Architecture
//!
//! Storage is injected through [`cart::KeyValueStorage`], so the cart can be
//! exercised entirely in memory. The HTTP client and the file-backed storage
//! live in the storefront crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod transactions;
pub mod types;

pub use types::*;
