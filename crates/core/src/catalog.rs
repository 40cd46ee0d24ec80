//! Catalog view engine.
//!
//! Turns the full product collection into the list a shopper sees, given the
//! filters and sort order picked on the page. The pipeline always runs in the
//! same order:
//!
//! 1. newest-only: keep the first [`NEWEST_LIMIT`] products as delivered
//! 2. featured-only
//! 3. category (exact, case-sensitive name match)
//! 4. sort (stable, ties keep collection order)
//! 5. name search (case-insensitive substring)
//! 6. price range (inclusive)
//!
//! Every stage is skipped when its parameter is absent. An empty result is a
//! normal outcome, not an error.

use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Price, Product};

/// How many products the newest-only view keeps.
pub const NEWEST_LIMIT: usize = 4;

/// Category parameter value meaning "every category".
pub const ALL_CATEGORIES: &str = "all";

/// Sort order for a product view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Most recently created first.
    Newest,
    /// Least recently created first.
    Oldest,
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
}

impl SortKey {
    /// Parameter value for this key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Newest => compare_present_first(a.created_at_value(), b.created_at_value(), true),
            Self::Oldest => {
                compare_present_first(a.created_at_value(), b.created_at_value(), false)
            }
            Self::PriceAsc => compare_present_first(price_of(a), price_of(b), false),
            Self::PriceDesc => compare_present_first(price_of(a), price_of(b), true),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sort parameter that names no [`SortKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid sort key: {0}")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            _ => Err(UnknownSortKey(s.to_string())),
        }
    }
}

fn price_of(product: &Product) -> Option<Decimal> {
    product.price_value().map(|p| p.amount)
}

/// Order two optional keys so that parseable keys come first.
///
/// Keys that failed to parse compare equal to each other and greater than any
/// parsed key, whatever the direction, which keeps the ordering total.
fn compare_present_first<T: Ord>(a: Option<T>, b: Option<T>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Inclusive price bounds. Either bound may be left open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl PriceRange {
    /// Create a range from optional bounds.
    #[must_use]
    pub const fn new(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Self { min, max }
    }

    /// True when neither bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Whether `amount` lies within the bounds.
    #[must_use]
    pub fn contains(&self, amount: Decimal) -> bool {
        self.min.is_none_or(|min| amount >= min) && self.max.is_none_or(|max| amount <= max)
    }
}

/// Filters and ordering for one catalog view.
///
/// `CatalogQuery::default()` is the identity view: every field is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Keep only the first [`NEWEST_LIMIT`] products of the collection.
    pub newest_only: bool,
    /// Keep only featured products.
    pub featured_only: bool,
    /// Exact category name to keep. Empty means no filter.
    pub category: Option<String>,
    pub sort: Option<SortKey>,
    /// Case-insensitive substring of the product name. Empty means no filter.
    pub search: Option<String>,
    pub price_range: Option<PriceRange>,
}

impl CatalogQuery {
    /// Build a query from list-page parameters.
    ///
    /// `category` of [`ALL_CATEGORIES`] means no category filter and an
    /// unknown `sort` means no sorting. Price bounds that are not numbers are
    /// ignored.
    #[must_use]
    pub fn from_params(
        search: Option<&str>,
        category: Option<&str>,
        sort: Option<&str>,
        min: Option<&str>,
        max: Option<&str>,
    ) -> Self {
        let category = non_empty(category)
            .filter(|c| *c != ALL_CATEGORIES)
            .map(str::to_owned);
        let sort = non_empty(sort).and_then(|s| match s.parse::<SortKey>() {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring sort parameter");
                None
            }
        });
        let range = PriceRange::new(parse_bound("min", min), parse_bound("max", max));

        Self {
            newest_only: false,
            featured_only: false,
            category,
            sort,
            search: non_empty(search).map(str::to_owned),
            price_range: (!range.is_unbounded()).then_some(range),
        }
    }

    /// Run the view pipeline over `products`.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let mut view: Vec<&Product> = if self.newest_only {
            products.iter().take(NEWEST_LIMIT).collect()
        } else {
            products.iter().collect()
        };

        if self.featured_only {
            view.retain(|p| p.is_featured);
        }

        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            view.retain(|p| p.category_name() == Some(category));
        }

        if let Some(sort) = self.sort {
            // `sort_by` is stable, so equal keys keep collection order.
            view.sort_by(|a, b| sort.compare(a, b));
        }

        if let Some(needle) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = needle.to_lowercase();
            view.retain(|p| p.name.to_lowercase().contains(&needle));
        }

        if let Some(range) = self.price_range.filter(|r| !r.is_unbounded()) {
            view.retain(|p| price_of(p).is_some_and(|amount| range.contains(amount)));
        }

        view
    }

    /// Message for an empty view, naming the filter most likely to blame.
    #[must_use]
    pub fn empty_message(&self) -> String {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            format!("No products match \"{search}\"")
        } else if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            format!("No products in category \"{category}\"")
        } else if self.price_range.is_some_and(|r| !r.is_unbounded()) {
            "No products in the selected price range".to_string()
        } else {
            "No products are available right now".to_string()
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_bound(name: &str, value: Option<&str>) -> Option<Decimal> {
    let text = non_empty(value)?;
    let parsed = Price::parse(text).map(|p| p.amount);
    if parsed.is_none() {
        tracing::warn!(bound = name, value = text, "ignoring malformed price bound");
    }
    parsed
}
