//! Session middleware configuration.
//!
//! Sessions hold each visitor's shop state and admin flag. Records live in a
//! bounded `moka` cache that drops a session once it has been idle for the
//! expiry period, so a restart empties every cart and logs every admin out.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shopfront_session";

/// Session expiry time in seconds (30 days).
const SESSION_EXPIRY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Upper bound on live sessions; the least recently used are evicted first.
const MAX_SESSIONS: u64 = 100_000;

/// In-memory session store with idle expiry and a size bound.
#[derive(Clone)]
pub struct CachedSessionStore {
    cache: Cache<Id, Record>,
}

impl CachedSessionStore {
    /// Create a store that forgets sessions idle for longer than `idle_timeout`.
    #[must_use]
    pub fn new(idle_timeout: Duration, max_sessions: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_idle(idle_timeout)
                .build(),
        }
    }
}

impl std::fmt::Debug for CachedSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedSessionStore")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[async_trait]
impl SessionStore for CachedSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.cache.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .cache
            .get(session_id)
            .await
            .filter(|record| record.expiry_date > OffsetDateTime::now_utc()))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.cache.invalidate(session_id).await;
        Ok(())
    }
}

/// Create the session layer over a [`CachedSessionStore`].
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<CachedSessionStore> {
    let idle_timeout = Duration::from_secs(SESSION_EXPIRY_SECONDS.unsigned_abs());

    SessionManagerLayer::new(CachedSessionStore::new(idle_timeout, MAX_SESSIONS))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn record() -> Record {
        Record {
            id: Id::default(),
            data: HashMap::default(),
            expiry_date: OffsetDateTime::now_utc() + tower_sessions::cookie::time::Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn test_save_load_delete() {
        let store = CachedSessionStore::new(Duration::from_secs(60), 10);
        let mut record = record();
        store.create(&mut record).await.unwrap();

        assert_eq!(store.load(&record.id).await.unwrap().unwrap().id, record.id);

        store.delete(&record.id).await.unwrap();
        assert!(store.load(&record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_record_is_not_loaded() {
        let store = CachedSessionStore::new(Duration::from_secs(60), 10);
        let mut record = record();
        record.expiry_date = OffsetDateTime::now_utc() - tower_sessions::cookie::time::Duration::seconds(1);
        store.save(&record).await.unwrap();

        assert!(store.load(&record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted() {
        let store = CachedSessionStore::new(Duration::from_millis(200), 1_000);
        for _ in 0..200 {
            store.save(&record()).await.unwrap();
        }
        store.cache.run_pending_tasks().await;
        assert_eq!(store.cache.entry_count(), 200);

        tokio::time::sleep(Duration::from_millis(500)).await;
        store.cache.run_pending_tasks().await;
        assert_eq!(store.cache.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_store_is_bounded() {
        let store = CachedSessionStore::new(Duration::from_secs(60), 50);
        for _ in 0..200 {
            store.save(&record()).await.unwrap();
        }
        store.cache.run_pending_tasks().await;
        assert!(store.cache.entry_count() <= 50);
    }
}
