//! Where bearer tokens come from.
//!
//! The API client asks its provider for a token on every request and never
//! caches the answer. A provider returning `None` means the request goes out
//! unauthenticated and the backend decides what to do with it.

use async_trait::async_trait;
use tracing::warn;

use crate::storage::LocalStore;

#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn access_token(&self) -> Option<String>;
}

/// Never authenticated.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSession;

#[async_trait]
impl SessionProvider for NoSession {
    async fn access_token(&self) -> Option<String> {
        None
    }
}

/// A token handed over once, e.g. from `--token` or `WEALTHWISE_TOKEN`.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl SessionProvider for StaticToken {
    async fn access_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Token saved by `auth login`, re-read from local storage on every call.
#[derive(Debug, Clone)]
pub struct StoredSession {
    store: LocalStore,
}

impl StoredSession {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SessionProvider for StoredSession {
    async fn access_token(&self) -> Option<String> {
        match self.store.session_token() {
            Ok(token) => token.filter(|token| !token.trim().is_empty()),
            Err(e) => {
                warn!("Could not read stored session, sending unauthenticated: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stored_session_sees_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("storage.json"));
        let session = StoredSession::new(store.clone());

        assert_eq!(session.access_token().await, None);

        store.set_session_token("first").unwrap();
        assert_eq!(session.access_token().await.as_deref(), Some("first"));

        store.set_session_token("second").unwrap();
        assert_eq!(session.access_token().await.as_deref(), Some("second"));

        store.clear_session().unwrap();
        assert_eq!(session.access_token().await, None);
    }

    #[tokio::test]
    async fn test_fixed_providers() {
        assert_eq!(NoSession.access_token().await, None);
        assert_eq!(
            StaticToken::new("abc").access_token().await.as_deref(),
            Some("abc")
        );
    }
}
