//! Per-shopper carts.
//!
//! Every shopper gets a [`CartSession`]: a [`CartStore`] over their own cart
//! directory plus a [`CartIndicator`] subscribed to it. Sessions live in a
//! `moka` cache and are dropped after sitting idle; the cart itself is on
//! disk, so an evicted session is rebuilt from the same files.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use almed_core::UserId;
use almed_core::cart::{CartIndicator, CartStore};
use moka::sync::Cache;

use crate::storage::FileStorage;

/// How long an unused session stays in memory.
const SESSION_IDLE: Duration = Duration::from_secs(30 * 60);

/// A shopper's cart and the indicator that follows it.
#[derive(Debug)]
pub struct CartSession {
    pub store: CartStore<FileStorage>,
    pub indicator: CartIndicator<FileStorage>,
}

impl CartSession {
    fn open(dir: PathBuf) -> Self {
        let store = CartStore::new(FileStorage::new(dir));
        let indicator = CartIndicator::attach(&store);
        Self { store, indicator }
    }
}

/// All live cart sessions.
#[derive(Clone)]
pub struct CartRegistry {
    root: PathBuf,
    sessions: Cache<UserId, Arc<CartSession>>,
}

impl std::fmt::Debug for CartRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartRegistry")
            .field("root", &self.root)
            .field("sessions", &self.sessions.entry_count())
            .finish()
    }
}

impl CartRegistry {
    /// Registry storing carts under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sessions: Cache::builder()
                .max_capacity(10_000)
                .time_to_idle(SESSION_IDLE)
                .build(),
        }
    }

    /// The cart session for `user_id`, opening it if needed.
    #[must_use]
    pub fn session(&self, user_id: &UserId) -> Arc<CartSession> {
        self.sessions.get_with(user_id.clone(), || {
            tracing::debug!(%user_id, "opening cart session");
            Arc::new(CartSession::open(self.dir_for(user_id)))
        })
    }

    /// Directory holding `user_id`'s cart.
    #[must_use]
    pub fn dir_for(&self, user_id: &UserId) -> PathBuf {
        // Dots stay encoded so ids like ".." cannot leave the root.
        let name = urlencoding::encode(user_id.as_str()).replace('.', "%2E");
        self.root.join(name)
    }
}
