//! Admin login and logout handlers.

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

use shopfront_core::storage;

use crate::error::{Result, add_breadcrumb};
use crate::models::SessionStore;
use crate::routes::Chrome;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Admin login page template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub chrome: Chrome,
    pub error: Option<String>,
    pub username: String,
}

/// User-facing message for a failed login.
const fn login_error_message(err: &AuthError) -> &'static str {
    match err {
        AuthError::MissingCredentials => "Username and password are required",
        AuthError::InvalidCredentials => "Invalid credentials",
        AuthError::Lookup(_) | AuthError::PasswordHash => "Login failed",
    }
}

/// Display the login page.
pub async fn login_page(State(state): State<AppState>, session: Session) -> Response {
    let already_admin = storage::is_admin(&SessionStore::new(session))
        .await
        .unwrap_or(false);
    if already_admin {
        return Redirect::to("/admin").into_response();
    }

    LoginTemplate {
        chrome: Chrome::login(state.config()),
        error: None,
        username: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
///
/// Looks the username up in the `admins` table and sets the admin flag on a
/// matching password.
#[instrument(skip(state, session))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match state.auth().login(&form.username, &form.password).await {
        Ok(()) => {
            // New session ID on privilege change
            session.cycle_id().await?;
            storage::grant_admin(&SessionStore::new(session)).await?;
            add_breadcrumb("auth", "Admin logged in", None);
            tracing::info!(username = %form.username.trim(), "Admin logged in");
            Ok(Redirect::to("/admin").into_response())
        }
        Err(e) => {
            match &e {
                AuthError::Lookup(_) | AuthError::PasswordHash => {
                    tracing::warn!("Admin login failed: {e}");
                }
                AuthError::MissingCredentials | AuthError::InvalidCredentials => {
                    tracing::info!("Admin login rejected: {e}");
                }
            }

            let page = LoginTemplate {
                chrome: Chrome::login(state.config()),
                error: Some(login_error_message(&e).to_string()),
                username: form.username,
            };
            Ok((StatusCode::UNAUTHORIZED, page).into_response())
        }
    }
}

/// Clear the admin flag.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    storage::revoke_admin(&SessionStore::new(session)).await?;
    add_breadcrumb("auth", "Admin logged out", None);
    Ok(Redirect::to("/admin/login"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supabase::SupabaseError;

    #[test]
    fn test_login_error_messages() {
        assert_eq!(
            login_error_message(&AuthError::InvalidCredentials),
            "Invalid credentials"
        );
        assert_eq!(
            login_error_message(&AuthError::Lookup(SupabaseError::NotFound(
                "admins".to_string()
            ))),
            "Login failed"
        );
        assert_eq!(
            login_error_message(&AuthError::Lookup(SupabaseError::RateLimited(1))),
            "Login failed"
        );
    }

    #[test]
    fn test_login_form_debug_redacts_password() {
        let form = LoginForm {
            username: "owner".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{form:?}");
        assert!(debug.contains("owner"));
        assert!(!debug.contains("hunter2"));
    }
}
