//! Catalog entities as delivered by the marketplace API.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::id::{BannerId, CategoryId, ImageId, ProductId, StoreId};
use super::price::Price;

/// A product listed in the marketplace.
///
/// `price` and `stock` are kept as the text the API sent. Use
/// [`Product::price_value`] to get a number out of the price; text that does
/// not parse is tolerated here and handled by whoever needs the number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<StoreId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub stock: String,
    /// Empty when the API sent `null` or no price at all.
    #[serde(default, deserialize_with = "text_or_number")]
    pub price: String,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    /// Ordered product images. Missing in the payload means no images.
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Product {
    /// Parsed price, or `None` if the price text is malformed.
    #[must_use]
    pub fn price_value(&self) -> Option<Price> {
        Price::parse(&self.price)
    }

    /// Parsed creation timestamp, or `None` if it cannot be read.
    #[must_use]
    pub fn created_at_value(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    /// Name of the owning category, if the payload carried one.
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

/// A product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ImageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    pub url: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// A product category. Categories are flat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_id: Option<StoreId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_id: Option<BannerId>,
    pub name: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Parse an API timestamp.
///
/// Accepts RFC 3339 (`2024-05-01T08:30:00.000Z`) and naive timestamps
/// without an offset, which are read as UTC.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Accept either a JSON string or a JSON number and keep it as text. `null`
/// becomes empty text.
pub(crate) fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        Some(TextOrNumber::Text(text)) => text,
        Some(TextOrNumber::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_api_json() {
        let json = r#"{
            "id": "p1",
            "storeId": "s1",
            "categoryId": "c1",
            "name": "Masker Medis 3 Ply",
            "description": "Isi 50",
            "stock": "120",
            "price": "35000",
            "isFeatured": true,
            "isArchived": false,
            "createdAt": "2024-05-01T08:30:00.000Z",
            "updatedAt": "2024-05-02T08:30:00.000Z",
            "images": [
                {"id": "i1", "productId": "p1", "url": "https://cdn/x.jpg"}
            ],
            "category": {"id": "c1", "storeId": "s1", "bannerId": "b1", "name": "Masker"}
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert_eq!(product.category_name(), Some("Masker"));
        assert_eq!(product.images.len(), 1);
        assert_eq!(product.price_value().unwrap().display(), "Rp 35.000");
        assert!(product.created_at_value().is_some());
    }

    #[test]
    fn test_product_tolerates_missing_images_and_numeric_price() {
        let json = r#"{"id": "p2", "name": "Termometer", "price": 52000, "stock": 3}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.images.is_empty());
        assert!(product.category.is_none());
        assert_eq!(product.price, "52000");
        assert_eq!(product.stock, "3");
    }

    #[test]
    fn test_malformed_price_is_kept_as_text() {
        let json = r#"{"id": "p3", "name": "Kasa", "price": "gratis"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, "gratis");
        assert!(product.price_value().is_none());
    }

    #[test]
    fn test_null_or_missing_price_does_not_sink_the_list() {
        let json = r#"[
            {"id": "p1", "name": "Masker", "price": "1000"},
            {"id": "p2", "name": "Kasa", "price": null},
            {"id": "p3", "name": "Plester"}
        ]"#;
        let products: Vec<Product> = serde_json::from_str(json).unwrap();
        assert_eq!(products.len(), 3);
        assert!(products.iter().skip(1).all(|p| p.price.is_empty()));
        assert!(products.iter().skip(1).all(|p| p.price_value().is_none()));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-05-01T08:30:00Z").is_some());
        assert!(parse_timestamp("2024-05-01T08:30:00.123+07:00").is_some());
        assert!(parse_timestamp("2024-05-01T08:30:00").is_some());
        assert!(parse_timestamp("kemarin").is_none());
        assert!(parse_timestamp("").is_none());
    }
}
