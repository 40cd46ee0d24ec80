//! JSON view models returned by the page routes.

use almed_core::{Category, PaymentMethod, Product, Transaction};
use serde::Serialize;

/// Image shown for products that have none.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.png";

/// URL slug for a product name: lowercase ASCII letters and digits, with
/// every other run of characters collapsed to one `-`.
///
/// ```
/// use almed_storefront::views::slugify;
///
/// assert_eq!(slugify("Masker Medis 3-Ply (50 pcs)"), "masker-medis-3-ply-50-pcs");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// A product as shown in a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub href: String,
    pub description: String,
    /// Formatted price, or the raw text if it does not parse.
    pub price: String,
    pub category: Option<String>,
    pub image_url: String,
    /// Shown on hover: the second image, or the first when there is only one.
    pub hover_image_url: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        let first = product.images.first().map(|i| i.url.clone());
        let second = product.images.get(1).map(|i| i.url.clone());
        let image_url = first.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());
        let slug = slugify(&product.name);

        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            href: format!("/products/{slug}"),
            slug,
            description: product.description.clone(),
            price: display_price(product),
            category: product.category_name().map(str::to_owned),
            hover_image_url: second.unwrap_or_else(|| image_url.clone()),
            image_url,
        }
    }
}

/// Cards for a product view.
#[must_use]
pub fn cards<'a>(products: impl IntoIterator<Item = &'a Product>) -> Vec<ProductCard> {
    products.into_iter().map(ProductCard::from).collect()
}

/// Formatted price, falling back to the raw text.
#[must_use]
pub fn display_price(product: &Product) -> String {
    product
        .price_value()
        .map_or_else(|| product.price.clone(), |p| p.display())
}

/// A category link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLink {
    pub id: String,
    pub name: String,
    pub href: String,
}

impl From<&Category> for CategoryLink {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            href: format!("/list?category={}", urlencoding::encode(&category.name)),
        }
    }
}

/// Full product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub card: ProductCard,
    pub stock: String,
    pub images: Vec<String>,
}

impl From<&Product> for ProductDetail {
    fn from(product: &Product) -> Self {
        let images: Vec<String> = product.images.iter().map(|i| i.url.clone()).collect();
        Self {
            card: ProductCard::from(product),
            stock: product.stock.clone(),
            images: if images.is_empty() {
                vec![PLACEHOLDER_IMAGE.to_string()]
            } else {
                images
            },
        }
    }
}

/// One row of the transaction history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub payment_method: PaymentMethod,
    pub payment_method_label: &'static str,
    pub paid: bool,
    pub total: String,
    pub created_at: String,
    pub items: Vec<TransactionItemRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionItemRow {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id.to_string(),
            payment_method: tx.payment_method,
            payment_method_label: tx.payment_method.label(),
            paid: tx.is_paid,
            total: tx.total().display(),
            created_at: tx.created_at.clone(),
            items: tx
                .order_items
                .iter()
                .map(|item| TransactionItemRow {
                    product_id: item.product_id.to_string(),
                    name: item.product.name.clone(),
                    quantity: item.quantity,
                    price: almed_core::Price::idr(item.price).display(),
                })
                .collect(),
        }
    }
}
