//! Integration tests for the cart and checkout flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront running (cargo run -p tangelo-storefront)
//!
//! Run with: cargo test -p tangelo-integration-tests -- --ignored

use reqwest::{Client, StatusCode, redirect::Policy};

use tangelo_integration_tests::storefront_base_url;

/// Create a client that keeps session cookies and does not follow redirects,
/// so guard behavior is observable.
fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Add one item to the cart through the HTMX endpoint.
async fn add_test_item(client: &Client) {
    let base_url = storefront_base_url();
    let resp = client
        .post(format!("{base_url}/cart/add"))
        .form(&[
            ("sku", "TEA-001"),
            ("name", "Green Tea"),
            ("unit_price", "4.50"),
            ("quantity", "2"),
        ])
        .send()
        .await
        .expect("Failed to add item to cart");

    assert!(resp.status().is_success());
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn health_endpoints_respond() {
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to get health");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .expect("Failed to get readiness");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn cart_page_shows_added_item() {
    let client = client();
    let base_url = storefront_base_url();

    add_test_item(&client).await;

    let resp = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to get cart page");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read response");
    assert!(body.contains("Green Tea"));
    assert!(body.contains("$9.00"));
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn anonymous_checkout_redirects_to_login_with_return_path() {
    let client = client();
    let base_url = storefront_base_url();

    // Even with items in the cart, no session identity means login first.
    add_test_item(&client).await;

    let resp = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to get checkout");

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("redirect has a location header");
    assert_eq!(location, "/auth/login?return_to=%2Fcheckout");
}

#[tokio::test]
#[ignore = "Requires running storefront, database, and a logged-in session"]
async fn checkout_with_empty_cart_redirects_to_cart() {
    // Needs the auth service in front to establish a session identity;
    // with one present, GET /checkout on an empty cart must answer with a
    // redirect to /cart.
    let client = client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to get checkout");

    assert!(resp.status().is_redirection());
}
