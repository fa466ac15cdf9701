//! Integration tests for Shopfront.
//!
//! Each test spawns two servers on ephemeral ports:
//!
//! - [`FakePostgrest`]: an in-process stand-in for the hosted database's
//!   REST endpoint, serving the `items` and `admins` tables from memory
//! - the real storefront router, configured to talk to the fake
//!
//! and drives the storefront with a cookie-keeping `reqwest` client that does
//! not follow redirects, so tests can assert on them.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use secrecy::SecretString;
use serde_json::{Map, Value, json};
use url::Url;

use shopfront_storefront::config::{ShopConfig, StorefrontConfig, SupabaseConfig};
use shopfront_storefront::state::AppState;

/// API key the fake endpoint accepts.
pub const TEST_ANON_KEY: &str = "test-anon-key-9f3b2c7d1e8a4f60b5c2d9e7a1f3b8c4";

// =============================================================================
// Fake PostgREST
// =============================================================================

#[derive(Default)]
struct RemoteInner {
    items: Mutex<Vec<Value>>,
    admins: Mutex<HashMap<String, String>>,
    next_id: AtomicI64,
    fail_items: AtomicBool,
    fail_admins: AtomicBool,
    fail_writes: AtomicBool,
    requests: Mutex<Vec<String>>,
}

/// In-memory PostgREST stand-in.
#[derive(Clone, Default)]
pub struct FakePostgrest {
    inner: Arc<RemoteInner>,
}

impl FakePostgrest {
    /// Empty tables.
    #[must_use]
    pub fn new() -> Self {
        let remote = Self::default();
        remote.inner.next_id.store(1, Ordering::SeqCst);
        remote
    }

    /// Add a row to `items`, assigning the next numeric id. Returns the id.
    pub fn add_item(&self, name: &str, description: &str, sizes: Option<&str>) -> String {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        self.lock_items().push(json!({
            "id": id,
            "name": name,
            "description": description,
            "image": "",
            "sizes": sizes,
        }));
        id.to_string()
    }

    /// Add a row to `admins`.
    pub fn add_admin(&self, username: &str, password: &str) {
        self.inner
            .admins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(username.to_string(), password.to_string());
    }

    /// Make every `items` request fail with a 500.
    pub fn fail_items(&self, fail: bool) {
        self.inner.fail_items.store(fail, Ordering::SeqCst);
    }

    /// Make every `admins` request fail with a 500.
    pub fn fail_admins(&self, fail: bool) {
        self.inner.fail_admins.store(fail, Ordering::SeqCst);
    }

    /// Make inserts, updates and deletes fail with a 500.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the `items` table.
    #[must_use]
    pub fn items(&self) -> Vec<Value> {
        self.lock_items().clone()
    }

    /// Remove a row behind the storefront's back.
    pub fn remove_item(&self, id: &str) {
        self.lock_items().retain(|row| id_of(row) != id);
    }

    /// Requests received so far, as `"METHOD table"`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.inner
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_items(&self) -> std::sync::MutexGuard<'_, Vec<Value>> {
        self.inner.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn router(&self) -> Router {
        Router::new()
            .route(
                "/rest/v1/{table}",
                get(handle_table)
                    .post(handle_table)
                    .patch(handle_table)
                    .delete(handle_table),
            )
            .with_state(self.clone())
    }

    /// Serve on an ephemeral port and return the project URL.
    pub async fn spawn(&self) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = self.router();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{addr}")).unwrap()
    }
}

fn id_of(row: &Value) -> String {
    match row.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn api_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message, "details": null }))).into_response()
}

/// Parse `in.("a","b")` into its values.
fn parse_in_list(filter: &str) -> Option<Vec<String>> {
    let inner = filter.strip_prefix("in.(")?.strip_suffix(')')?;
    let mut values = Vec::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                let mut value = String::new();
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => value.extend(chars.next()),
                        '"' => break,
                        c => value.push(c),
                    }
                }
                values.push(value);
            }
            ',' => {}
            c => {
                let mut value = c.to_string();
                for c in chars.by_ref() {
                    if c == ',' {
                        break;
                    }
                    value.push(c);
                }
                values.push(value);
            }
        }
    }
    Some(values)
}

fn project(row: &Value, select: Option<&str>) -> Value {
    match select {
        None | Some("*") => row.clone(),
        Some(columns) => {
            let mut out = Map::new();
            for column in columns.split(',') {
                if let Some(value) = row.get(column) {
                    out.insert(column.to_string(), value.clone());
                }
            }
            Value::Object(out)
        }
    }
}

async fn handle_table(
    State(remote): State<FakePostgrest>,
    method: Method,
    headers: HeaderMap,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: axum::body::Bytes,
) -> Response {
    remote
        .inner
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(format!("{method} {table}"));

    let expected_bearer = format!("Bearer {TEST_ANON_KEY}");
    let authorized = headers.get("apikey").is_some_and(|v| v == TEST_ANON_KEY)
        && headers
            .get("authorization")
            .is_some_and(|v| v == expected_bearer.as_str());
    if !authorized {
        return api_error(StatusCode::UNAUTHORIZED, "Invalid API key");
    }

    match table.as_str() {
        "items" => handle_items(&remote, &method, &query, &body),
        "admins" => handle_admins(&remote, &query),
        _ => api_error(StatusCode::NOT_FOUND, "relation does not exist"),
    }
}

fn handle_items(
    remote: &FakePostgrest,
    method: &Method,
    query: &HashMap<String, String>,
    body: &[u8],
) -> Response {
    if remote.inner.fail_items.load(Ordering::SeqCst)
        || (*method != Method::GET && remote.inner.fail_writes.load(Ordering::SeqCst))
    {
        return api_error(StatusCode::INTERNAL_SERVER_ERROR, "simulated failure");
    }

    let id_filter = query.get("id").map(String::as_str);
    let matches = |row: &Value| -> bool {
        match id_filter {
            None => true,
            Some(filter) => {
                let id = id_of(row);
                if let Some(value) = filter.strip_prefix("eq.") {
                    id == value
                } else {
                    parse_in_list(filter).is_some_and(|values| values.contains(&id))
                }
            }
        }
    };

    let mut items = remote.lock_items();

    match *method {
        Method::GET => {
            let limit = query
                .get("limit")
                .and_then(|l| l.parse::<usize>().ok())
                .unwrap_or(usize::MAX);
            let rows: Vec<Value> = items
                .iter()
                .filter(|row| matches(row))
                .take(limit)
                .map(|row| project(row, query.get("select").map(String::as_str)))
                .collect();
            Json(rows).into_response()
        }
        Method::POST => {
            let Ok(Value::Array(payload)) = serde_json::from_slice::<Value>(body) else {
                return api_error(StatusCode::BAD_REQUEST, "expected an array");
            };
            let mut created = Vec::new();
            for row in payload {
                let Value::Object(mut fields) = row else {
                    return api_error(StatusCode::BAD_REQUEST, "expected objects");
                };
                let id = remote.inner.next_id.fetch_add(1, Ordering::SeqCst);
                fields.insert("id".to_string(), json!(id));
                let row = Value::Object(fields);
                items.push(row.clone());
                created.push(row);
            }
            (StatusCode::CREATED, Json(created)).into_response()
        }
        Method::PATCH => {
            let Ok(Value::Object(patch)) = serde_json::from_slice::<Value>(body) else {
                return api_error(StatusCode::BAD_REQUEST, "expected an object");
            };
            let mut updated = Vec::new();
            for row in items.iter_mut().filter(|row| matches(row)) {
                if let Value::Object(fields) = row {
                    for (key, value) in &patch {
                        fields.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
            Json(updated).into_response()
        }
        Method::DELETE => {
            items.retain(|row| !matches(row));
            StatusCode::NO_CONTENT.into_response()
        }
        _ => api_error(StatusCode::METHOD_NOT_ALLOWED, "unsupported"),
    }
}

fn handle_admins(remote: &FakePostgrest, query: &HashMap<String, String>) -> Response {
    if remote.inner.fail_admins.load(Ordering::SeqCst) {
        return api_error(StatusCode::INTERNAL_SERVER_ERROR, "simulated failure");
    }

    let admins = remote
        .inner
        .admins
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    let rows: Vec<Value> = query
        .get("username")
        .and_then(|filter| filter.strip_prefix("eq."))
        .and_then(|username| admins.get(username))
        .map(|password| project(&json!({ "password": password }), query.get("select").map(String::as_str)))
        .into_iter()
        .collect();

    Json(rows).into_response()
}

// =============================================================================
// Test Application
// =============================================================================

/// A running storefront wired to a [`FakePostgrest`].
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub remote: FakePostgrest,
}

impl TestApp {
    /// Spawn the storefront against an empty fake remote.
    pub async fn spawn() -> Self {
        Self::spawn_with(FakePostgrest::new()).await
    }

    /// Spawn the storefront against a prepared fake remote.
    pub async fn spawn_with(remote: FakePostgrest) -> Self {
        let project_url = remote.spawn().await;

        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            shop: ShopConfig::default(),
            trust_proxy_headers: false,
            supabase: SupabaseConfig {
                url: project_url,
                anon_key: SecretString::from(TEST_ANON_KEY),
                timeout: Duration::from_secs(5),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let state = AppState::new(config).unwrap();
        let app = shopfront_storefront::app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            base_url: format!("http://{addr}"),
            client,
            remote,
        }
    }

    /// `GET path`.
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .unwrap()
    }

    /// `GET path` and return the body, asserting a 200.
    pub async fn get_page(&self, path: &str) -> String {
        let response = self.get(path).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK, "GET {path}");
        response.text().await.unwrap()
    }

    /// `POST path` with a url-encoded form.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// Log in as `username`, asserting success.
    pub async fn login(&self, username: &str, password: &str) {
        let response = self
            .post_form(
                "/admin/login",
                &[("username", username), ("password", password)],
            )
            .await;
        assert_eq!(location(&response), Some("/admin"));
    }

    /// Current cart badge count.
    pub async fn cart_count(&self) -> u64 {
        self.get_page("/cart/count").await.parse().unwrap()
    }
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<&str> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_in_list() {
        assert_eq!(
            parse_in_list(r#"in.("1","a,b","x\"y")"#).unwrap(),
            vec!["1", "a,b", "x\"y"]
        );
        assert_eq!(parse_in_list("in.(1,2)").unwrap(), vec!["1", "2"]);
        assert!(parse_in_list("eq.1").is_none());
    }
}
