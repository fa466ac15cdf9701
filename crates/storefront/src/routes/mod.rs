//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                           - Catalog with customer banner/form
//! POST /customer                   - Save customer details
//! POST /customer/clear             - Forget customer details ("Change")
//!
//! # Cart
//! GET  /cart                       - Reconciled cart lines
//! POST /cart/add                   - Increment quantity, redirect back
//! POST /cart/remove                - Decrement quantity, redirect back
//! POST /cart/set                   - Set quantity, redirect back
//! GET  /cart/count                 - Badge count (plain text)
//!
//! # Admin
//! GET  /admin/login                - Login page
//! POST /admin/login                - Login action (rate limited)
//! POST /admin/logout               - Logout action
//! GET  /admin                      - Catalog management
//! GET  /admin/items/new            - Add-item form
//! POST /admin/items                - Create item
//! GET  /admin/items/{id}/edit      - Edit-item form
//! POST /admin/items/{id}           - Update item
//! GET  /admin/items/{id}/delete    - Delete confirmation
//! POST /admin/items/{id}/delete    - Delete item
//! ```

pub mod auth;
pub mod cart;
pub mod home;
pub mod items;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use shopfront_core::Cart;

use crate::config::StorefrontConfig;
use crate::middleware::admin_login_rate_limiter;
use crate::state::AppState;

/// Header data rendered by `base.html` on every page.
pub struct Chrome {
    pub shop_name: String,
    pub contact: Option<String>,
    pub cart_count: u64,
    /// Page belongs to the admin area.
    pub admin: bool,
    /// Visitor holds the admin flag.
    pub logged_in: bool,
    pub flash: Option<String>,
}

impl Chrome {
    /// Header for shopper-facing pages.
    #[must_use]
    pub fn public(config: &StorefrontConfig, cart: &Cart) -> Self {
        Self {
            shop_name: config.shop.name.clone(),
            contact: config.shop.contact.clone(),
            cart_count: cart.total_quantity(),
            admin: false,
            logged_in: false,
            flash: None,
        }
    }

    /// Header for the admin panel.
    #[must_use]
    pub fn admin(config: &StorefrontConfig, flash: Option<String>) -> Self {
        Self {
            shop_name: config.shop.name.clone(),
            contact: config.shop.contact.clone(),
            cart_count: 0,
            admin: true,
            logged_in: true,
            flash,
        }
    }

    /// Header for the admin login page.
    #[must_use]
    pub fn login(config: &StorefrontConfig) -> Self {
        Self {
            logged_in: false,
            ..Self::admin(config, None)
        }
    }
}

/// Resolve a `return_to` form field to a same-site redirect.
///
/// Only local paths are honored; anything else (absolute URLs,
/// protocol-relative `//host` paths, missing values) goes to `/`.
#[must_use]
pub fn redirect_back(return_to: Option<&str>) -> Redirect {
    Redirect::to(local_path(return_to))
}

fn local_path(return_to: Option<&str>) -> &str {
    match return_to {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/set", post(cart::set))
        .route("/count", get(cart::count))
}

/// Create the admin routes router.
pub fn admin_routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(items::dashboard))
        .route(
            "/login",
            get(auth::login_page).merge(
                post(auth::login).layer(admin_login_rate_limiter(config.trust_proxy_headers)),
            ),
        )
        .route("/logout", post(auth::logout))
        .route("/items", post(items::create))
        .route("/items/new", get(items::new_item))
        .route("/items/{id}", post(items::update))
        .route("/items/{id}/edit", get(items::edit))
        .route(
            "/items/{id}/delete",
            get(items::confirm_delete).post(items::delete),
        )
}

/// Create all routes for the storefront.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/customer", post(home::save_customer))
        .route("/customer/clear", post(home::clear_customer))
        .nest("/cart", cart_routes())
        .nest("/admin", admin_routes(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_accepts_site_paths() {
        assert_eq!(local_path(Some("/cart")), "/cart");
        assert_eq!(local_path(Some("/?page=2")), "/?page=2");
    }

    #[test]
    fn test_local_path_rejects_offsite_targets() {
        assert_eq!(local_path(None), "/");
        assert_eq!(local_path(Some("")), "/");
        assert_eq!(local_path(Some("https://evil.example")), "/");
        assert_eq!(local_path(Some("//evil.example")), "/");
        assert_eq!(local_path(Some("/\\evil.example")), "/");
    }
}
