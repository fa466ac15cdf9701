//! Cart mutations and the reconciled cart page.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use shopfront_integration_tests::{FakePostgrest, TestApp, location};

#[tokio::test]
async fn test_add_remove_and_count() {
    let app = TestApp::spawn().await;
    assert_eq!(app.cart_count().await, 0);

    let response = app
        .post_form("/cart/add", &[("id", "1"), ("return_to", "/")])
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/"));

    app.post_form("/cart/add", &[("id", "1")]).await;
    app.post_form("/cart/add", &[("id", "2")]).await;
    assert_eq!(app.cart_count().await, 3);

    app.post_form("/cart/remove", &[("id", "1")]).await;
    assert_eq!(app.cart_count().await, 2);

    // Quantity 1 removes the entry entirely
    app.post_form("/cart/remove", &[("id", "1")]).await;
    app.post_form("/cart/remove", &[("id", "1")]).await;
    assert_eq!(app.cart_count().await, 1);
}

#[tokio::test]
async fn test_set_quantity() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/cart/set",
            &[("id", "1"), ("quantity", "5"), ("return_to", "/cart")],
        )
        .await;
    assert_eq!(location(&response), Some("/cart"));
    assert_eq!(app.cart_count().await, 5);

    app.post_form("/cart/set", &[("id", "1"), ("quantity", "0")])
        .await;
    assert_eq!(app.cart_count().await, 0);

    let response = app
        .post_form("/cart/set", &[("id", "1"), ("quantity", "lots")])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_offsite_return_to_is_ignored() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/cart/add",
            &[("id", "1"), ("return_to", "https://evil.example/")],
        )
        .await;
    assert_eq!(location(&response), Some("/"));

    let response = app
        .post_form("/cart/add", &[("id", "1"), ("return_to", "//evil.example")])
        .await;
    assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
async fn test_empty_cart_makes_no_remote_call() {
    let app = TestApp::spawn().await;

    let page = app.get_page("/cart").await;
    assert!(page.contains("Your cart is empty"));
    assert!(app.remote.requests().is_empty());
}

#[tokio::test]
async fn test_cart_page_reconciles_in_insertion_order() {
    let remote = FakePostgrest::new();
    let saree = remote.add_item("Silk Saree", "", None);
    let kurta = remote.add_item("Cotton Kurta", "", Some("M"));
    let app = TestApp::spawn_with(remote).await;

    app.post_form("/cart/add", &[("id", &kurta)]).await;
    app.post_form("/cart/add", &[("id", &saree)]).await;
    app.post_form("/cart/add", &[("id", &saree)]).await;

    let page = app.get_page("/cart").await;
    let kurta_at = page.find("Cotton Kurta").unwrap();
    let saree_at = page.find("Silk Saree").unwrap();
    assert!(kurta_at < saree_at);
    assert!(page.contains(r#"name="quantity" value="2""#));
    assert!(page.contains(r#"name="quantity" value="1""#));

    // Only the carted ids were requested
    assert_eq!(app.remote.requests(), vec!["GET items".to_string()]);
}

#[tokio::test]
async fn test_missing_item_falls_back_to_id() {
    let remote = FakePostgrest::new();
    let saree = remote.add_item("Silk Saree", "", None);
    let app = TestApp::spawn_with(remote).await;

    app.post_form("/cart/add", &[("id", &saree)]).await;
    app.post_form("/cart/add", &[("id", "gone-42")]).await;

    let page = app.get_page("/cart").await;
    assert!(page.contains("Silk Saree"));
    assert!(page.contains("gone-42"));

    // Deleted remotely after being carted
    app.remote.remove_item(&saree);
    let page = app.get_page("/cart").await;
    assert!(!page.contains("Silk Saree"));
    assert!(page.contains(&format!(r#"name="id" value="{saree}""#)));
}

#[tokio::test]
async fn test_cart_page_degrades_on_remote_failure() {
    let remote = FakePostgrest::new();
    let saree = remote.add_item("Silk Saree", "", None);
    let app = TestApp::spawn_with(remote).await;

    app.post_form("/cart/add", &[("id", &saree)]).await;
    app.remote.fail_items(true);

    let page = app.get_page("/cart").await;
    assert!(page.contains("Item details could not be loaded"));
    assert!(!page.contains("Silk Saree"));
    assert!(page.contains(&format!(r#"name="id" value="{saree}""#)));
}

#[tokio::test]
async fn test_home_shows_carted_quantity() {
    let remote = FakePostgrest::new();
    let saree = remote.add_item("Silk Saree", "", None);
    let app = TestApp::spawn_with(remote).await;

    app.post_form("/cart/set", &[("id", &saree), ("quantity", "4")])
        .await;

    let page = app.get_page("/").await;
    assert!(page.contains("<span>4</span>"));
    assert!(page.contains(r#"<span class="badge">4</span>"#));
}
