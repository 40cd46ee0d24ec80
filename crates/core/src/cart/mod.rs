//! Shopper cart store.
//!
//! The cart is an ordered list of [`CartLineItem`]s persisted as JSON in one
//! slot ([`CART_STORAGE_KEY`]) of a [`KeyValueStorage`]. Every mutation writes
//! the slot and then fires a single `cart-changed` notification. Listeners
//! carry no data and re-read the cart through a [`CartReader`].
//!
//! # Duplicate products
//!
//! [`CartStore::add`] appends. Adding a product that is already in the cart
//! creates a second line; [`CartStore::remove`] drops every line for the
//! product. Callers that want one line per product merge before adding.

mod indicator;
mod notifier;
mod storage;

use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Price, Product, ProductId};

pub use indicator::{CartIndicator, CartPanel, EMPTY_CART_MESSAGE, PanelLine};
pub use notifier::{ListenerId, Notifier};
pub use storage::{KeyValueStorage, MemoryStorage, StorageError};

/// Storage slot holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "cart";

/// Name of the invalidation event fired after every cart mutation.
pub const CART_CHANGED_EVENT: &str = "cart-changed";

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantities start at one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The cart could not be serialized.
    #[error("failed to encode cart: {0}")]
    Encode(#[from] serde_json::Error),

    /// The storage backend failed.
    #[error("cart storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A product and how many of it the shopper wants.
///
/// Serialized as the product object with an extra `quantity` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartLineItem {
    /// Line total, `None` if the product price is malformed or the product
    /// of price and quantity does not fit a `Decimal`.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.product
            .price_value()?
            .amount
            .checked_mul(Decimal::from(self.quantity))
    }
}

/// Whether the cart holds anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CartState {
    Empty,
    Filled { lines: usize },
}

impl CartState {
    fn of(lines: &[CartLineItem]) -> Self {
        if lines.is_empty() {
            Self::Empty
        } else {
            Self::Filled { lines: lines.len() }
        }
    }

    /// True for [`CartState::Empty`].
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Sum of price × quantity over `lines`.
///
/// Lines whose total cannot be computed (unparseable price, or an amount
/// too large for a `Decimal`) add nothing, as does a line that would
/// overflow the running sum.
#[must_use]
pub fn subtotal(lines: &[CartLineItem]) -> Price {
    let amount = lines.iter().fold(Decimal::ZERO, |sum, line| {
        let Some(total) = line.line_total() else {
            tracing::warn!(
                product_id = %line.product.id,
                price = %line.product.price,
                quantity = line.quantity,
                "cart line has no usable total"
            );
            return sum;
        };
        sum.checked_add(total).unwrap_or_else(|| {
            tracing::warn!(
                product_id = %line.product.id,
                "cart subtotal overflowed, skipping line"
            );
            sum
        })
    });
    Price::idr(amount)
}

/// Read-only view of a persisted cart.
///
/// Cheap to clone; shares the storage with the [`CartStore`] it came from.
#[derive(Debug)]
pub struct CartReader<S> {
    storage: Arc<S>,
}

impl<S> Clone for CartReader<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: KeyValueStorage> CartReader<S> {
    /// Current line items.
    ///
    /// Never fails: a missing slot, a storage failure or data that does not
    /// decode all read as an empty cart.
    #[must_use]
    pub fn read_all(&self) -> Vec<CartLineItem> {
        let raw = match self.storage.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read cart, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(error = %e, "stored cart is malformed, treating as empty");
                Vec::new()
            }
        }
    }
}

/// The shopper's cart.
pub struct CartStore<S> {
    reader: CartReader<S>,
    notifier: Notifier,
    write_lock: Mutex<()>,
}

impl<S> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStorage> CartStore<S> {
    /// Create a store over `storage`.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::from_shared(Arc::new(storage))
    }

    /// Create a store over storage that is shared with other owners.
    #[must_use]
    pub fn from_shared(storage: Arc<S>) -> Self {
        Self {
            reader: CartReader { storage },
            notifier: Notifier::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// A read-only handle for listeners.
    #[must_use]
    pub fn reader(&self) -> CartReader<S> {
        self.reader.clone()
    }

    /// Current line items. See [`CartReader::read_all`].
    #[must_use]
    pub fn read_all(&self) -> Vec<CartLineItem> {
        self.reader.read_all()
    }

    /// Empty or filled.
    #[must_use]
    pub fn state(&self) -> CartState {
        CartState::of(&self.read_all())
    }

    /// Register a `cart-changed` listener.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(listener)
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Append a line for `product`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity, or an
    /// error if the cart cannot be written. Nothing is notified on error.
    pub fn add(&self, product: Product, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let product_id = product.id.clone();
        {
            let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
            let mut lines = self.read_all();
            lines.push(CartLineItem { product, quantity });
            self.persist(&lines)?;
        }

        tracing::debug!(%product_id, quantity, "added to cart");
        self.notifier.notify();
        Ok(())
    }

    /// Drop every line for `product_id` and report what is left.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written. Nothing is notified
    /// on error.
    pub fn remove(&self, product_id: &ProductId) -> Result<CartState, CartError> {
        let state = {
            let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
            let mut lines = self.read_all();
            lines.retain(|line| line.product.id != *product_id);
            self.persist(&lines)?;
            CartState::of(&lines)
        };

        tracing::debug!(%product_id, ?state, "removed from cart");
        self.notifier.notify();
        Ok(state)
    }

    /// Delete the stored cart entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage slot cannot be removed. Nothing is
    /// notified on error.
    pub fn clear(&self) -> Result<(), CartError> {
        {
            let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.reader.storage.remove(CART_STORAGE_KEY)?;
        }

        tracing::debug!("cart cleared");
        self.notifier.notify();
        Ok(())
    }

    fn persist(&self, lines: &[CartLineItem]) -> Result<(), CartError> {
        let encoded = serde_json::to_string(lines)?;
        self.reader.storage.set(CART_STORAGE_KEY, &encoded)?;
        Ok(())
    }
}
