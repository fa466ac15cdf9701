//! Generic table operations over PostgREST.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::{SupabaseError, filter};
use crate::config::SupabaseConfig;

/// Characters of a response body kept in logs and error messages.
const BODY_SNIPPET_LEN: usize = 200;

/// Client for the hosted database's REST endpoint.
///
/// Cheaply cloneable; the underlying connection pool is shared.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    rest_url: String,
    api_key: SecretString,
}

/// Error body returned by PostgREST.
#[derive(serde::Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    details: Option<String>,
}

impl SupabaseClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Http` if the HTTP client cannot be built.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let rest_url = format!("{}/rest/v1", config.url.as_str().trim_end_matches('/'));

        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                client,
                rest_url,
                api_key: config.anon_key.clone(),
            }),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let key = self.inner.api_key.expose_secret();
        self.inner
            .client
            .request(method, format!("{}/{table}", self.inner.rest_url))
            .header("apikey", key)
            .bearer_auth(key)
    }

    /// Send a request and decode the JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SupabaseError> {
        let text = self.send(request).await?;
        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %snippet(&text),
                "Failed to parse REST response"
            );
            SupabaseError::Parse(e)
        })
    }

    /// Send a request, returning the raw body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, SupabaseError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(SupabaseError::RateLimited(retry_after));
        }

        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %snippet(&text),
                "REST endpoint returned non-success status"
            );
            return Err(SupabaseError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        Ok(text)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// `SELECT * FROM table`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or rows cannot be decoded.
    #[instrument(skip(self))]
    pub async fn select_all<T: DeserializeOwned>(&self, table: &str) -> Result<Vec<T>, SupabaseError> {
        let request = self.request(Method::GET, table).query(&[("select", "*")]);
        self.execute(request).await
    }

    /// `SELECT * FROM table WHERE column IN (values)`.
    ///
    /// An empty value set returns no rows without a round trip.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or rows cannot be decoded.
    #[instrument(skip(self, values))]
    pub async fn select_in<T, I, S>(
        &self,
        table: &str,
        column: &str,
        values: I,
    ) -> Result<Vec<T>, SupabaseError>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            return Ok(Vec::new());
        }

        let request = self
            .request(Method::GET, table)
            .query(&[("select", "*".to_string()), (column, filter::in_list(values))]);
        self.execute(request).await
    }

    /// `SELECT columns FROM table WHERE column = value LIMIT 1`, requiring a row.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::NotFound` if no row matches, or an error if the
    /// request fails.
    #[instrument(skip(self, value))]
    pub async fn select_single_eq<T: DeserializeOwned>(
        &self,
        table: &str,
        columns: &str,
        column: &str,
        value: &str,
    ) -> Result<T, SupabaseError> {
        let request = self.request(Method::GET, table).query(&[
            ("select", columns.to_string()),
            (column, filter::eq(value)),
            ("limit", "1".to_string()),
        ]);

        let rows: Vec<T> = self.execute(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| SupabaseError::NotFound(format!("{table} {column}")))
    }

    /// Cheapest possible read against a table, for readiness checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is unreachable or rejects the key.
    pub async fn ping(&self, table: &str) -> Result<(), SupabaseError> {
        let request = self
            .request(Method::GET, table)
            .query(&[("select", "*"), ("limit", "1")]);
        self.send(request).await.map(|_| ())
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// `INSERT INTO table VALUES (payload) RETURNING *`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the insert does not return
    /// exactly one row.
    #[instrument(skip(self, payload))]
    pub async fn insert<P, T>(&self, table: &str, payload: &P) -> Result<T, SupabaseError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&[payload]);

        let rows: Vec<T> = self.execute(request).await?;
        exactly_one(rows, || format!("{table} insert"))
    }

    /// `UPDATE table SET payload WHERE column = value RETURNING *`.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::NotFound` if no row matched, or an error if the
    /// request fails.
    #[instrument(skip(self, value, payload))]
    pub async fn update_eq<P, T>(
        &self,
        table: &str,
        column: &str,
        value: &str,
        payload: &P,
    ) -> Result<T, SupabaseError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::PATCH, table)
            .query(&[(column, filter::eq(value))])
            .header("Prefer", "return=representation")
            .json(payload);

        let rows: Vec<T> = self.execute(request).await?;
        exactly_one(rows, || format!("{table} {column}={value}"))
    }

    /// `DELETE FROM table WHERE column = value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, value))]
    pub async fn delete_eq(&self, table: &str, column: &str, value: &str) -> Result<(), SupabaseError> {
        let request = self
            .request(Method::DELETE, table)
            .query(&[(column, filter::eq(value))]);
        self.send(request).await.map(|_| ())
    }
}

fn exactly_one<T>(rows: Vec<T>, what: impl FnOnce() -> String) -> Result<T, SupabaseError> {
    let count = rows.len();
    let mut rows = rows.into_iter();
    match (rows.next(), count) {
        (Some(row), 1) => Ok(row),
        (None, _) => Err(SupabaseError::NotFound(what())),
        (Some(_), n) => Err(SupabaseError::UnexpectedRowCount(n)),
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(BODY_SNIPPET_LEN).collect()
}

/// Pull the human-readable message out of a PostgREST error body.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            message: Some(message),
            details,
        }) => match details {
            Some(details) if !details.is_empty() => format!("{message} ({details})"),
            _ => message,
        },
        _ if body.trim().is_empty() => "(empty response body)".to_string(),
        _ => snippet(body),
    }
}
