//! End-to-end tests of the storefront against a fake marketplace API.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use std::time::Duration;

use almed_integration_tests::{FakeApi, TestContext, product};
use reqwest::StatusCode;
use serde_json::{Value, json};

async fn json_of(resp: reqwest::Response) -> Value {
    resp.json().await.expect("response should be JSON")
}

fn names(cards: &Value) -> Vec<String> {
    cards
        .as_array()
        .expect("cards array")
        .iter()
        .map(|c| c["name"].as_str().unwrap_or_default().to_string())
        .collect()
}

fn location(resp: &reqwest::Response) -> Option<&str> {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let resp = ctx.get("/health").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let resp = ctx.get("/health/ready").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    ctx.api().down = true;
    let resp = ctx.get("/health/ready").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ============================================================================
// Catalog pages
// ============================================================================

#[tokio::test]
async fn test_home_shows_featured_and_newest() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let view = json_of(ctx.get("/").send().await.unwrap()).await;
    assert_eq!(view["available"], true);
    assert_eq!(
        names(&view["featured"]),
        vec!["Masker Bedah 3-Ply", "Masker N95"]
    );
    assert_eq!(names(&view["newest"]).len(), 4);
    assert_eq!(view["categories"].as_array().unwrap().len(), 3);
    assert!(view["cart_count"].is_null());
}

#[tokio::test]
async fn test_list_filters_by_category() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let view = json_of(
        ctx.get("/list?category=Masker&sort=price_asc")
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(
        names(&view["products"]),
        vec!["Masker Bedah 3-Ply", "Masker N95"]
    );
    assert!(view["empty_message"].is_null());
}

#[tokio::test]
async fn test_list_sorts_newest_by_default() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let view = json_of(ctx.get("/list").send().await.unwrap()).await;
    assert_eq!(
        names(&view["products"]),
        vec![
            "Kasa Steril",
            "Tensimeter",
            "Termometer Digital",
            "Masker N95",
            "Masker Bedah 3-Ply"
        ]
    );
}

#[tokio::test]
async fn test_list_sorts_by_price_descending() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let view = json_of(ctx.get("/list?sort=price_desc").send().await.unwrap()).await;
    let products = names(&view["products"]);
    assert_eq!(products.first().map(String::as_str), Some("Tensimeter"));
    assert_eq!(products.last().map(String::as_str), Some("Kasa Steril"));
}

#[tokio::test]
async fn test_list_price_range_and_search() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let view = json_of(
        ctx.get("/list?min=50000&max=150000&sort=price_asc")
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(
        names(&view["products"]),
        vec!["Termometer Digital", "Masker N95"]
    );

    let view = json_of(ctx.get("/list?name=n95").send().await.unwrap()).await;
    assert_eq!(names(&view["products"]), vec!["Masker N95"]);
}

#[tokio::test]
async fn test_list_explains_empty_results() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let view = json_of(ctx.get("/list?name=stetoskop").send().await.unwrap()).await;
    assert_eq!(view["products"], json!([]));
    assert_eq!(view["empty_message"], "No products match \"stetoskop\"");
}

#[tokio::test]
async fn test_list_degrades_when_api_is_down() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;
    ctx.api().down = true;

    let resp = ctx.get("/list").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let view = json_of(resp).await;
    assert_eq!(view["available"], false);
    assert_eq!(view["products"], json!([]));
}

#[tokio::test]
async fn test_list_survives_a_product_without_price() {
    let mut fake = FakeApi::with_catalog();
    let mut unpriced = product(
        "p6",
        "Plester Luka",
        "0",
        "Perban",
        false,
        "2024-05-06T08:00:00.000Z",
    );
    unpriced["price"] = Value::Null;
    fake.products.push(unpriced);
    let ctx = TestContext::start(fake).await;

    let view = json_of(ctx.get("/list").send().await.unwrap()).await;
    assert_eq!(view["available"], true);
    assert_eq!(names(&view["products"]).len(), 6);

    let view = json_of(ctx.get("/list?min=0").send().await.unwrap()).await;
    assert!(!names(&view["products"]).contains(&"Plester Luka".to_string()));
}

#[tokio::test]
async fn test_product_page_by_slug() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let resp = ctx.get("/products/masker-n95").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let page = json_of(resp).await;
    assert_eq!(page["product"]["name"], "Masker N95");
    assert_eq!(page["product"]["images"].as_array().unwrap().len(), 2);

    let resp = ctx.get("/products/stetoskop").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_cart_requires_sign_in() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let resp = ctx.get("/cart").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/login"));
}

#[tokio::test]
async fn test_add_to_cart_triggers_refresh() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let resp = ctx
        .post_as("u1", "/cart/add", &[("product_id", "p3"), ("quantity", "2")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("hx-trigger").and_then(|v| v.to_str().ok()),
        Some("cart-changed")
    );

    let view = json_of(resp).await;
    assert_eq!(view["count"], 1);
    assert_eq!(view["open"], true);
    assert_eq!(view["panel"]["kind"], "items");
    assert_eq!(view["panel"]["lines"][0]["quantity"], 2);

    let count = json_of(ctx.get_as("u1", "/cart/count").send().await.unwrap()).await;
    assert_eq!(count["count"], 1);

    let home = json_of(ctx.get_as("u1", "/").send().await.unwrap()).await;
    assert_eq!(home["cart_count"], 1);
}

#[tokio::test]
async fn test_carts_are_per_shopper() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    ctx.post_as("u1", "/cart/add", &[("product_id", "p1")])
        .send()
        .await
        .unwrap();

    let count = json_of(ctx.get_as("u2", "/cart/count").send().await.unwrap()).await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn test_add_unknown_product_is_not_found() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let resp = ctx
        .post_as("u1", "/cart/add", &[("product_id", "nope")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_zero_quantity_is_rejected() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let resp = ctx
        .post_as("u1", "/cart/add", &[("product_id", "p1"), ("quantity", "0")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_removing_last_item_empties_cart() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    ctx.post_as("u1", "/cart/add", &[("product_id", "p1")])
        .send()
        .await
        .unwrap();
    let resp = ctx
        .post_as("u1", "/cart/remove", &[("product_id", "p1")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let view = json_of(resp).await;
    assert_eq!(view["count"], 0);
    assert_eq!(view["open"], false);
    assert_eq!(view["panel"]["kind"], "empty");
    assert_eq!(view["panel"]["message"], "Your cart is empty");
}

// ============================================================================
// Checkout
// ============================================================================

const DELIVERY: [(&str, &str); 5] = [
    ("payment_method", "COD"),
    ("name", "Siti Aminah"),
    ("phone", "081234567890"),
    ("address", "Jl. Kenanga 12, Bandung"),
    ("post_code", "40115"),
];

#[tokio::test]
async fn test_checkout_page_lists_payment_methods() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let view = json_of(ctx.get_as("u1", "/checkout").send().await.unwrap()).await;
    assert_eq!(view["methods"].as_array().unwrap().len(), 2);
    assert_eq!(view["whatsapp_url"], "https://wa.me/6282146510812");
    assert_eq!(view["cart"]["kind"], "empty");
}

#[tokio::test]
async fn test_checkout_with_empty_cart_fails() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let resp = ctx.post_as("u1", "/checkout", &DELIVERY).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let failure = json_of(resp).await;
    assert_eq!(failure["message"], "Your cart is empty");
    assert!(ctx.api().received.is_empty());
}

#[tokio::test]
async fn test_checkout_places_order_and_clears_cart() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    ctx.post_as("u1", "/cart/add", &[("product_id", "p1"), ("quantity", "2")])
        .send()
        .await
        .unwrap();
    ctx.post_as("u1", "/cart/add", &[("product_id", "p2")])
        .send()
        .await
        .unwrap();

    let resp = ctx.post_as("u1", "/checkout", &DELIVERY).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/transactions"));

    {
        let api = ctx.api();
        assert_eq!(api.received.len(), 1);
        let payload = &api.received[0];
        assert_eq!(payload["userId"], "u1");
        assert_eq!(payload["paymentMethod"], "COD");
        assert_eq!(payload["postCode"], "40115");
        assert_eq!(payload["totalPay"].as_f64(), Some(155_000.0));
        assert_eq!(
            payload["orderItems"],
            json!([
                {"productId": "p1", "quantity": 2},
                {"productId": "p2", "quantity": 1}
            ])
        );
    }

    let count = json_of(ctx.get_as("u1", "/cart/count").send().await.unwrap()).await;
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn test_checkout_refreshes_cached_catalog() {
    let ctx =
        TestContext::start_with_cache(FakeApi::with_catalog(), Duration::from_secs(300)).await;

    let view = json_of(ctx.get("/list").send().await.unwrap()).await;
    assert_eq!(names(&view["products"]).len(), 5);

    // Sold out elsewhere; the cached catalog does not know yet.
    ctx.api().products.retain(|p| p["id"] != "p5");
    let view = json_of(ctx.get("/list").send().await.unwrap()).await;
    assert_eq!(names(&view["products"]).len(), 5);

    ctx.post_as("u1", "/cart/add", &[("product_id", "p1")])
        .send()
        .await
        .unwrap();
    let resp = ctx.post_as("u1", "/checkout", &DELIVERY).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let view = json_of(ctx.get("/list").send().await.unwrap()).await;
    assert!(!names(&view["products"]).contains(&"Tensimeter".to_string()));
    assert_eq!(names(&view["products"]).len(), 4);
}

#[tokio::test]
async fn test_checkout_shows_api_rejection() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;
    ctx.api().reject_with = Some("Stok tidak mencukupi".to_string());

    ctx.post_as("u1", "/cart/add", &[("product_id", "p1")])
        .send()
        .await
        .unwrap();

    let resp = ctx.post_as("u1", "/checkout", &DELIVERY).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let failure = json_of(resp).await;
    assert_eq!(failure["message"], "Stok tidak mencukupi");
    assert_eq!(failure["form"]["name"], "Siti Aminah");

    let count = json_of(ctx.get_as("u1", "/cart/count").send().await.unwrap()).await;
    assert_eq!(count["count"], 1);
}

// ============================================================================
// Transactions and account
// ============================================================================

fn transaction(id: &str, user_id: &str, method: &str, paid: bool, product_name: &str) -> Value {
    json!({
        "id": id,
        "storeId": "store-1",
        "userId": user_id,
        "name": "Siti Aminah",
        "phone": "081234567890",
        "address": "Jl. Kenanga 12",
        "postCode": "40115",
        "paymentMethod": method,
        "isPaid": paid,
        "totalAmount": "35000",
        "createdAt": "2024-05-06T08:00:00.000Z",
        "updatedAt": "2024-05-06T08:00:00.000Z",
        "orderItems": [{
            "productId": "p1",
            "product": product(
                "p1",
                product_name,
                "35000",
                "Masker",
                true,
                "2024-05-01T08:00:00.000Z"
            ),
            "quantity": 1,
            "price": "35000"
        }]
    })
}

#[tokio::test]
async fn test_transactions_filter_and_summary() {
    let mut fake = FakeApi::with_catalog();
    fake.transactions = vec![
        transaction("trx-1", "u1", "COD", true, "Masker Bedah 3-Ply"),
        transaction("trx-2", "u1", "WHATSAPP", false, "Kasa Steril"),
        transaction("trx-3", "u2", "COD", false, "Tensimeter"),
    ];
    let ctx = TestContext::start(fake).await;

    let view = json_of(ctx.get_as("u1", "/transactions").send().await.unwrap()).await;
    assert_eq!(view["total"], 2);
    assert_eq!(view["summary"], "Showing 2 of 2");

    let view = json_of(
        ctx.get_as("u1", "/transactions?paid=unpaid")
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(view["summary"], "Showing 1 of 2");
    assert_eq!(view["transactions"][0]["id"], "trx-2");

    let view = json_of(
        ctx.get_as("u1", "/transactions?q=masker")
            .send()
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(view["transactions"][0]["id"], "trx-1");
}

#[tokio::test]
async fn test_account_shows_profile() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let view = json_of(ctx.get_as("u1", "/account").send().await.unwrap()).await;
    assert_eq!(view["name"], "siti aminah");
    assert_eq!(view["initial"], "S");
}

#[tokio::test]
async fn test_unknown_account_is_sent_to_register() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let resp = ctx.get_as("ghost", "/account").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/register"));

    let cleared = resp
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with("user="));
    assert!(cleared, "user cookie should be expired");
}

#[tokio::test]
async fn test_logout_redirects_to_login() {
    let ctx = TestContext::start(FakeApi::with_catalog()).await;

    let resp = ctx.post_as("u1", "/logout", &[]).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), Some("/login"));
}
