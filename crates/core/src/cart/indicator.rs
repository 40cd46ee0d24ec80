//! Header cart indicator: badge count and slide-out panel.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use super::{CartLineItem, CartReader, CartStore, KeyValueStorage, ListenerId, subtotal};

/// Shown in the panel when the cart holds nothing.
pub const EMPTY_CART_MESSAGE: &str = "Your cart is empty";

#[derive(Debug, Default)]
struct IndicatorState {
    lines: Vec<CartLineItem>,
    panel_open: bool,
}

/// Badge and panel state that follows the cart.
///
/// On every `cart-changed` notification the indicator re-reads the cart,
/// opens the panel when anything is in it and closes it when it is empty.
pub struct CartIndicator<S> {
    reader: CartReader<S>,
    state: Arc<RwLock<IndicatorState>>,
    listener: ListenerId,
}

impl<S> std::fmt::Debug for CartIndicator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartIndicator")
            .field("listener", &self.listener)
            .finish_non_exhaustive()
    }
}

/// One row in the cart panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelLine {
    pub product_id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub price: String,
}

/// What the cart panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartPanel {
    Empty { message: &'static str },
    Items { lines: Vec<PanelLine>, subtotal: String },
}

impl CartPanel {
    /// Build the panel for `lines`.
    #[must_use]
    pub fn for_lines(lines: &[CartLineItem]) -> Self {
        if lines.is_empty() {
            return Self::Empty {
                message: EMPTY_CART_MESSAGE,
            };
        }

        let rows = lines
            .iter()
            .map(|line| PanelLine {
                product_id: line.product.id.to_string(),
                name: line.product.name.clone(),
                image_url: line.product.images.first().map(|i| i.url.clone()),
                quantity: line.quantity,
                price: line
                    .product
                    .price_value()
                    .map_or_else(|| line.product.price.clone(), |p| p.display()),
            })
            .collect();

        Self::Items {
            lines: rows,
            subtotal: subtotal(lines).display(),
        }
    }
}

impl<S: KeyValueStorage + 'static> CartIndicator<S> {
    /// Attach an indicator to `store`. The panel starts closed.
    #[must_use]
    pub fn attach(store: &CartStore<S>) -> Self {
        let reader = store.reader();
        let state = Arc::new(RwLock::new(IndicatorState {
            lines: reader.read_all(),
            panel_open: false,
        }));

        let listener_reader = reader.clone();
        let listener_state = Arc::clone(&state);
        let listener = store.subscribe(move || {
            let lines = listener_reader.read_all();
            let mut state = listener_state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            state.panel_open = !lines.is_empty();
            state.lines = lines;
        });

        Self {
            reader,
            state,
            listener,
        }
    }

    /// Stop following `store`.
    pub fn detach(self, store: &CartStore<S>) {
        store.unsubscribe(self.listener);
    }

    /// Number of line items, as shown on the badge.
    #[must_use]
    pub fn badge_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .lines
            .len()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .panel_open
    }

    /// Open or close the panel by hand. Opening re-reads the cart.
    pub fn toggle(&self) {
        let lines = self.reader.read_all();
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.panel_open = !state.panel_open;
        state.lines = lines;
    }

    pub fn close(&self) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .panel_open = false;
    }

    /// Current panel contents.
    #[must_use]
    pub fn panel(&self) -> CartPanel {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        CartPanel::for_lines(&state.lines)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::MemoryStorage;
    use crate::types::{Product, ProductId};

    fn product(id: &str, price: &str) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("Produk {id}"),
            "price": price,
            "images": [{"url": format!("https://img.example/{id}.jpg")}],
        }))
        .unwrap()
    }

    #[test]
    fn test_starts_closed_with_current_count() {
        let store = CartStore::new(MemoryStorage::new());
        store.add(product("p1", "10000"), 1).unwrap();

        let indicator = CartIndicator::attach(&store);
        assert_eq!(indicator.badge_count(), 1);
        assert!(!indicator.is_open());
    }

    #[test]
    fn test_add_opens_panel_with_subtotal() {
        let store = CartStore::new(MemoryStorage::new());
        let indicator = CartIndicator::attach(&store);

        store.add(product("p1", "10000"), 3).unwrap();

        assert!(indicator.is_open());
        assert_eq!(indicator.badge_count(), 1);
        match indicator.panel() {
            CartPanel::Items { lines, subtotal } => {
                assert_eq!(subtotal, "Rp 30.000");
                assert_eq!(lines[0].quantity, 3);
                assert_eq!(lines[0].price, "Rp 10.000");
                assert_eq!(
                    lines[0].image_url.as_deref(),
                    Some("https://img.example/p1.jpg")
                );
            }
            CartPanel::Empty { .. } => panic!("expected items"),
        }
    }

    #[test]
    fn test_removing_last_item_closes_panel_and_shows_empty_message() {
        let store = CartStore::new(MemoryStorage::new());
        let indicator = CartIndicator::attach(&store);
        store.add(product("p1", "10000"), 1).unwrap();
        assert!(indicator.is_open());

        store.remove(&ProductId::new("p1")).unwrap();

        assert!(!indicator.is_open());
        assert_eq!(indicator.badge_count(), 0);
        assert_eq!(
            indicator.panel(),
            CartPanel::Empty {
                message: EMPTY_CART_MESSAGE
            }
        );
    }

    #[test]
    fn test_badge_counts_lines_not_units() {
        let store = CartStore::new(MemoryStorage::new());
        let indicator = CartIndicator::attach(&store);
        store.add(product("p1", "10000"), 5).unwrap();
        store.add(product("p2", "10000"), 2).unwrap();
        assert_eq!(indicator.badge_count(), 2);
    }

    #[test]
    fn test_toggle_and_close() {
        let store = CartStore::new(MemoryStorage::new());
        let indicator = CartIndicator::attach(&store);
        indicator.toggle();
        assert!(indicator.is_open());
        indicator.close();
        assert!(!indicator.is_open());
    }

    #[test]
    fn test_detach_stops_updates() {
        let store = CartStore::new(MemoryStorage::new());
        let indicator = CartIndicator::attach(&store);
        let state = Arc::clone(&indicator.state);
        indicator.detach(&store);

        store.add(product("p1", "10000"), 1).unwrap();
        assert!(state.read().unwrap().lines.is_empty());
    }
}
