//! Home page route handlers: the catalog and the customer banner.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{Customer, Item, ShopState};

use crate::error::{Result, add_breadcrumb};
use crate::models::SessionStore;
use crate::routes::Chrome;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Customer details form data.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub number: String,
}

// =============================================================================
// Templates
// =============================================================================

/// A catalog item with the quantity already in the visitor's cart.
pub struct CatalogEntry {
    pub item: Item,
    pub quantity: u32,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub chrome: Chrome,
    pub customer: Option<Customer>,
    pub customer_error: Option<String>,
    pub form: CustomerForm,
    pub entries: Vec<CatalogEntry>,
    pub catalog_unavailable: bool,
}

async fn render_home(
    state: &AppState,
    shop: ShopState,
    form: CustomerForm,
    customer_error: Option<String>,
) -> HomeTemplate {
    let (items, catalog_unavailable) = match state.catalog().list().await {
        Ok(items) => (items, false),
        Err(e) => {
            tracing::warn!("Failed to fetch catalog: {e}");
            (Vec::new(), true)
        }
    };

    let entries = items
        .into_iter()
        .map(|item| CatalogEntry {
            quantity: shop.cart.quantity(&item.id),
            item,
        })
        .collect();

    HomeTemplate {
        chrome: Chrome::public(state.config(), &shop.cart),
        customer: shop.customer,
        customer_error,
        form,
        entries,
        catalog_unavailable,
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Display the catalog.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<HomeTemplate> {
    let shop = ShopState::load(&SessionStore::new(session)).await?;
    Ok(render_home(&state, shop, CustomerForm::default(), None).await)
}

/// Save the customer's name and number.
///
/// Blank fields re-render the page with an error and store nothing.
#[instrument(skip(state, session, form))]
pub async fn save_customer(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CustomerForm>,
) -> Result<Response> {
    let store = SessionStore::new(session);
    let mut shop = ShopState::load(&store).await?;

    match Customer::parse(&form.name, &form.number) {
        Ok(customer) => {
            shop.customer = Some(customer);
            shop.save(&store).await?;
            add_breadcrumb("customer", "Saved customer details", None);
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            let page = render_home(&state, shop, form, Some(e.to_string())).await;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
    }
}

/// Forget the customer's details so they can enter new ones.
#[instrument(skip(session))]
pub async fn clear_customer(session: Session) -> Result<Redirect> {
    let store = SessionStore::new(session);
    let mut shop = ShopState::load(&store).await?;
    shop.customer = None;
    shop.save(&store).await?;
    Ok(Redirect::to("/"))
}
