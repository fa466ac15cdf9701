//! Cart route handlers.
//!
//! The cart lives in the visitor's session as an ordered `{id: quantity}`
//! map. Every mutation is a plain form post that redirects back to the page
//! it came from.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{Cart, Customer, ItemId, LineItem, ShopState, reconcile};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::SessionStore;
use crate::routes::{Chrome, redirect_back};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Add/remove form data.
#[derive(Debug, Deserialize)]
pub struct CartItemForm {
    pub id: String,
    pub return_to: Option<String>,
}

/// Set-quantity form data.
#[derive(Debug, Deserialize)]
pub struct SetQuantityForm {
    pub id: String,
    pub quantity: String,
    pub return_to: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub chrome: Chrome,
    pub customer: Option<Customer>,
    pub lines: Vec<LineItem>,
    pub details_unavailable: bool,
}

// =============================================================================
// Helpers
// =============================================================================

/// Load the shop state, apply `change` to the cart and save it back.
async fn update_cart<F>(session: Session, change: F) -> Result<()>
where
    F: FnOnce(&mut Cart),
{
    let store = SessionStore::new(session);
    let mut shop = ShopState::load(&store).await?;
    change(&mut shop.cart);
    shop.save(&store).await?;
    Ok(())
}

fn parse_quantity(raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("invalid quantity: {raw:?}")))
}

// =============================================================================
// Routes
// =============================================================================

/// Display the cart.
///
/// Line items whose record can't be fetched still show, by id.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<CartTemplate> {
    let shop = ShopState::load(&SessionStore::new(session)).await?;

    let (items, details_unavailable) = if shop.cart.is_empty() {
        (Vec::new(), false)
    } else {
        match state.catalog().get_many(shop.cart.ids()).await {
            Ok(items) => (items, false),
            Err(e) => {
                tracing::warn!("Failed to fetch cart items: {e}");
                (Vec::new(), true)
            }
        }
    };

    Ok(CartTemplate {
        chrome: Chrome::public(state.config(), &shop.cart),
        lines: reconcile(&shop.cart, items),
        customer: shop.customer,
        details_unavailable,
    })
}

/// Add one of an item.
#[instrument(skip(session))]
pub async fn add(session: Session, Form(form): Form<CartItemForm>) -> Result<Redirect> {
    let id = ItemId::new(form.id);
    update_cart(session, |cart| {
        cart.increment(&id);
    })
    .await?;
    add_breadcrumb("cart", "Added item", Some(&[("item_id", id.as_str())]));
    Ok(redirect_back(form.return_to.as_deref()))
}

/// Remove one of an item.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<CartItemForm>) -> Result<Redirect> {
    let id = ItemId::new(form.id);
    update_cart(session, |cart| {
        cart.decrement(&id);
    })
    .await?;
    add_breadcrumb("cart", "Removed item", Some(&[("item_id", id.as_str())]));
    Ok(redirect_back(form.return_to.as_deref()))
}

/// Set an item's quantity; zero or less removes it.
#[instrument(skip(session))]
pub async fn set(session: Session, Form(form): Form<SetQuantityForm>) -> Result<Redirect> {
    let id = ItemId::new(form.id);
    let quantity = parse_quantity(&form.quantity)?;
    update_cart(session, |cart| {
        cart.set_quantity(&id, quantity);
    })
    .await?;
    Ok(redirect_back(form.return_to.as_deref()))
}

/// Cart badge count.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<impl IntoResponse> {
    let shop = ShopState::load(&SessionStore::new(session)).await?;
    Ok(shop.cart.total_quantity().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert!(matches!(parse_quantity(" 3 "), Ok(3)));
        assert!(matches!(parse_quantity("-1"), Ok(-1)));
        assert!(matches!(parse_quantity("two"), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_quantity(""), Err(AppError::BadRequest(_))));
    }
}
