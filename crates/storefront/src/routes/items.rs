//! Admin catalog management handlers.
//!
//! Every handler sits behind [`RequireAdmin`]. Mutations are direct calls to
//! the hosted `items` table followed by a redirect to the dashboard; remote
//! failures become a one-shot flash message there.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{Item, ItemDraft, ItemId};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAdmin;
use crate::models::{set_flash, take_flash};
use crate::routes::Chrome;
use crate::state::AppState;

const ADD_FAILED: &str = "Add failed";
const UPDATE_FAILED: &str = "Update failed";
const DELETE_FAILED: &str = "Delete failed";
const LOAD_FAILED: &str = "Could not load item";

// =============================================================================
// Form Types
// =============================================================================

/// Add/edit item form data.
#[derive(Debug, Default, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub sizes: String,
}

impl ItemForm {
    fn from_item(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone(),
            image: item.image.clone().unwrap_or_default(),
            sizes: item.sizes.clone().unwrap_or_default(),
        }
    }

    fn draft(&self) -> std::result::Result<ItemDraft, shopfront_core::ItemError> {
        ItemDraft::parse(&self.name, &self.description, &self.image, &self.sizes)
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Catalog management page.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub chrome: Chrome,
    pub items: Vec<Item>,
    pub catalog_unavailable: bool,
}

/// Add/edit item form.
#[derive(Template, WebTemplate)]
#[template(path = "admin/item_form.html")]
pub struct ItemFormTemplate {
    pub chrome: Chrome,
    pub heading: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    pub form: ItemForm,
    pub error: Option<String>,
}

/// Delete confirmation page.
#[derive(Template, WebTemplate)]
#[template(path = "admin/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub chrome: Chrome,
    pub id: ItemId,
    pub label: String,
}

fn add_form(state: &AppState, form: ItemForm, error: Option<String>) -> ItemFormTemplate {
    ItemFormTemplate {
        chrome: Chrome::admin(state.config(), None),
        heading: "Add Item",
        action: "/admin/items".to_string(),
        submit_label: "Add",
        form,
        error,
    }
}

fn edit_form(state: &AppState, id: &ItemId, form: ItemForm, error: Option<String>) -> ItemFormTemplate {
    ItemFormTemplate {
        chrome: Chrome::admin(state.config(), None),
        heading: "Edit Item",
        action: format!("/admin/items/{id}"),
        submit_label: "Save",
        form,
        error,
    }
}

/// Queue `message` and send the admin back to the dashboard.
async fn back_to_dashboard(session: &Session, message: &str) -> Result<Response> {
    set_flash(session, message).await?;
    Ok(Redirect::to("/admin").into_response())
}

// =============================================================================
// Routes
// =============================================================================

/// List the catalog with edit/delete actions.
#[instrument(skip(state, session))]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
) -> DashboardTemplate {
    let flash = take_flash(&session).await;

    let (items, catalog_unavailable) = match state.catalog().list().await {
        Ok(items) => (items, false),
        Err(e) => {
            tracing::warn!("Failed to fetch catalog for admin: {e}");
            (Vec::new(), true)
        }
    };

    DashboardTemplate {
        chrome: Chrome::admin(state.config(), flash),
        items,
        catalog_unavailable,
    }
}

/// Display the add-item form.
pub async fn new_item(State(state): State<AppState>, _admin: RequireAdmin) -> ItemFormTemplate {
    add_form(&state, ItemForm::default(), None)
}

/// Insert a new item.
#[instrument(skip(state, session))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Form(form): Form<ItemForm>,
) -> Result<Response> {
    let draft = match form.draft() {
        Ok(draft) => draft,
        Err(e) => {
            let page = add_form(&state, form, Some(e.to_string()));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    match state.catalog().create(&draft).await {
        Ok(item) => {
            add_breadcrumb("admin", "Added item", Some(&[("item_id", item.id.as_str())]));
            tracing::info!(item_id = %item.id, "Item added");
            Ok(Redirect::to("/admin").into_response())
        }
        Err(e) => {
            tracing::error!("Failed to add item: {e}");
            back_to_dashboard(&session, ADD_FAILED).await
        }
    }
}

/// Display the edit form, prefilled with the stored row.
#[instrument(skip(state, session))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = ItemId::new(id);

    match state.catalog().get(&id).await {
        Ok(Some(item)) => Ok(edit_form(&state, &id, ItemForm::from_item(&item), None).into_response()),
        Ok(None) => back_to_dashboard(&session, LOAD_FAILED).await,
        Err(e) => {
            tracing::warn!(item_id = %id, "Failed to load item for editing: {e}");
            back_to_dashboard(&session, LOAD_FAILED).await
        }
    }
}

/// Overwrite an item.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Path(id): Path<String>,
    Form(form): Form<ItemForm>,
) -> Result<Response> {
    let id = ItemId::new(id);

    let draft = match form.draft() {
        Ok(draft) => draft,
        Err(e) => {
            let page = edit_form(&state, &id, form, Some(e.to_string()));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    match state.catalog().update(&id, &draft).await {
        Ok(_) => {
            add_breadcrumb("admin", "Updated item", Some(&[("item_id", id.as_str())]));
            tracing::info!(item_id = %id, "Item updated");
            Ok(Redirect::to("/admin").into_response())
        }
        Err(e) => {
            tracing::error!(item_id = %id, "Failed to update item: {e}");
            back_to_dashboard(&session, UPDATE_FAILED).await
        }
    }
}

/// Ask before deleting.
#[instrument(skip(state, _admin))]
pub async fn confirm_delete(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> ConfirmDeleteTemplate {
    let id = ItemId::new(id);

    // The name is only cosmetic; fall back to the id.
    let label = match state.catalog().get(&id).await {
        Ok(Some(item)) if !item.name.is_empty() => item.name,
        Ok(_) => id.to_string(),
        Err(e) => {
            tracing::warn!(item_id = %id, "Failed to load item for delete confirmation: {e}");
            id.to_string()
        }
    };

    ConfirmDeleteTemplate {
        chrome: Chrome::admin(state.config(), None),
        id,
        label,
    }
}

/// Delete an item.
#[instrument(skip(state, session))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(session): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Response> {
    let id = ItemId::new(id);

    match state.catalog().delete(&id).await {
        Ok(()) => {
            add_breadcrumb("admin", "Deleted item", Some(&[("item_id", id.as_str())]));
            tracing::info!(item_id = %id, "Item deleted");
            Ok(Redirect::to("/admin").into_response())
        }
        Err(e) => {
            tracing::error!(item_id = %id, "Failed to delete item: {e}");
            back_to_dashboard(&session, DELETE_FAILED).await
        }
    }
}
