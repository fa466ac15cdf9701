//! Admin login gate and catalog management.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use shopfront_integration_tests::{FakePostgrest, TestApp, location};

fn remote_with_admin() -> FakePostgrest {
    let remote = FakePostgrest::new();
    remote.add_admin("owner", "letmein");
    remote
}

#[tokio::test]
async fn test_admin_pages_require_login() {
    let app = TestApp::spawn_with(remote_with_admin()).await;

    for path in ["/admin", "/admin/items/new", "/admin/items/1/edit", "/admin/items/1/delete"] {
        let response = app.get(path).await;
        assert_eq!(location(&response), Some("/admin/login"), "GET {path}");
    }

    let response = app.post_form("/admin/items", &[("name", "Sneaky")]).await;
    assert_eq!(location(&response), Some("/admin/login"));
    assert!(app.remote.items().is_empty());
}

#[tokio::test]
async fn test_login_outcomes() {
    let app = TestApp::spawn_with(remote_with_admin()).await;

    let page = app.get_page("/admin/login").await;
    assert!(!page.contains("Logout"));

    let response = app
        .post_form("/admin/login", &[("username", "owner"), ("password", "nope")])
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.text().await.unwrap().contains("Invalid credentials"));

    let response = app
        .post_form("/admin/login", &[("username", "stranger"), ("password", "x")])
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.text().await.unwrap().contains("Login failed"));

    // Still locked out
    assert_eq!(location(&app.get("/admin").await), Some("/admin/login"));

    app.login("owner", "letmein").await;
    let page = app.get_page("/admin").await;
    assert!(page.contains("Add first item"));
    assert!(page.contains("Logout"));
    assert!(page.contains(r#"href="/admin/items/new""#));

    // Login page bounces an admin straight to the dashboard
    assert_eq!(location(&app.get("/admin/login").await), Some("/admin"));
}

#[tokio::test]
async fn test_login_fails_when_remote_is_down() {
    let app = TestApp::spawn_with(remote_with_admin()).await;
    app.remote.fail_admins(true);

    let response = app
        .post_form("/admin/login", &[("username", "owner"), ("password", "letmein")])
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.text().await.unwrap().contains("Login failed"));
    assert_eq!(location(&app.get("/admin").await), Some("/admin/login"));
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = TestApp::spawn_with(remote_with_admin()).await;

    let response = app
        .post_form("/admin/login", &[("username", "owner"), ("password", "")])
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Username and password are required")
    );
}

#[tokio::test]
async fn test_logout_clears_flag() {
    let app = TestApp::spawn_with(remote_with_admin()).await;
    app.login("owner", "letmein").await;

    let response = app.post_form("/admin/logout", &[]).await;
    assert_eq!(location(&response), Some("/admin/login"));
    assert_eq!(location(&app.get("/admin").await), Some("/admin/login"));
}

#[tokio::test]
async fn test_add_edit_delete_item() {
    let app = TestApp::spawn_with(remote_with_admin()).await;
    app.login("owner", "letmein").await;

    // Add
    let page = app.get_page("/admin/items/new").await;
    assert!(page.contains("Add Item"));

    let response = app
        .post_form(
            "/admin/items",
            &[
                ("name", " Silk Saree "),
                ("description", "Handwoven"),
                ("image", ""),
                ("sizes", " S, ,M ,"),
            ],
        )
        .await;
    assert_eq!(location(&response), Some("/admin"));

    let items = app.remote.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "Silk Saree");
    assert_eq!(items[0]["sizes"], "S,M");
    assert_eq!(items[0]["image"], "");
    let id = items[0]["id"].to_string();

    let page = app.get_page("/admin").await;
    assert!(page.contains("Silk Saree"));
    assert!(page.contains(&format!("/admin/items/{id}/edit")));

    // Edit
    let page = app.get_page(&format!("/admin/items/{id}/edit")).await;
    assert!(page.contains(r#"value="Silk Saree""#));
    assert!(page.contains(r#"value="S,M""#));

    let response = app
        .post_form(
            &format!("/admin/items/{id}"),
            &[
                ("name", "Silk Saree (Red)"),
                ("description", "Handwoven"),
                ("image", "https://img.example/saree.jpg"),
                ("sizes", ""),
            ],
        )
        .await;
    assert_eq!(location(&response), Some("/admin"));

    let items = app.remote.items();
    assert_eq!(items[0]["name"], "Silk Saree (Red)");
    assert!(items[0]["sizes"].is_null());
    assert_eq!(items[0]["image"], "https://img.example/saree.jpg");

    // Delete asks first
    let page = app.get_page(&format!("/admin/items/{id}/delete")).await;
    assert!(page.contains("Delete this item?"));
    assert!(page.contains("Silk Saree (Red)"));
    assert_eq!(app.remote.items().len(), 1);

    let response = app
        .post_form(&format!("/admin/items/{id}/delete"), &[])
        .await;
    assert_eq!(location(&response), Some("/admin"));
    assert!(app.remote.items().is_empty());
}

#[tokio::test]
async fn test_blank_item_name_is_rejected() {
    let app = TestApp::spawn_with(remote_with_admin()).await;
    app.login("owner", "letmein").await;

    let response = app
        .post_form("/admin/items", &[("name", "  "), ("description", "x")])
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().await.unwrap().contains("item name cannot be empty"));
    assert!(app.remote.items().is_empty());
}

#[tokio::test]
async fn test_failed_mutations_flash_once() {
    let remote = remote_with_admin();
    let id = remote.add_item("Silk Saree", "", None);
    let app = TestApp::spawn_with(remote).await;
    app.login("owner", "letmein").await;

    app.remote.fail_writes(true);

    let response = app
        .post_form(&format!("/admin/items/{id}/delete"), &[])
        .await;
    assert_eq!(location(&response), Some("/admin"));
    let page = app.get_page("/admin").await;
    assert!(page.contains("Delete failed"));
    assert!(page.contains("Silk Saree"));

    // One-shot
    let page = app.get_page("/admin").await;
    assert!(!page.contains("Delete failed"));

    app.post_form("/admin/items", &[("name", "Cotton Kurta")])
        .await;
    assert!(app.get_page("/admin").await.contains("Add failed"));

    app.post_form(&format!("/admin/items/{id}"), &[("name", "Renamed")])
        .await;
    assert!(app.get_page("/admin").await.contains("Update failed"));

    assert_eq!(app.remote.items().len(), 1);
}

#[tokio::test]
async fn test_login_with_hashed_password() {
    let remote = FakePostgrest::new();
    let hash = shopfront_storefront::services::auth::hash_password("s3cret-phrase").unwrap();
    remote.add_admin("owner", &hash);
    let app = TestApp::spawn_with(remote).await;

    let response = app
        .post_form("/admin/login", &[("username", "owner"), ("password", &hash)])
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    app.login("owner", "s3cret-phrase").await;
    assert_eq!(app.get("/admin").await.status(), StatusCode::OK);
}
