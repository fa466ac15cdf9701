//! Admin gate extractor.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use shopfront_core::storage;

use crate::models::SessionStore;

/// Extractor that requires the admin flag in the visitor's session.
///
/// If the flag is missing, returns a redirect to the admin login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAdmin(session): RequireAdmin) -> impl IntoResponse {
///     "catalog management"
/// }
/// ```
pub struct RequireAdmin(pub Session);

/// Error returned when the admin gate is not passed.
pub enum AdminRejection {
    /// Redirect to the admin login page.
    RedirectToLogin,
    /// No session layer is installed.
    MissingSession,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/admin/login").into_response(),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminRejection::MissingSession)?;

        let is_admin = storage::is_admin(&SessionStore::new(session.clone()))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to read admin flag from session: {e}");
                false
            });

        if is_admin {
            Ok(Self(session))
        } else {
            Err(AdminRejection::RedirectToLogin)
        }
    }
}
