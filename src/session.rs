//! Session context — the one piece of state shared across pages.
//!
//! Created at startup, filled by `login`, emptied by `logout`. The HTTP
//! backend reads the token from here on every request, so logging out takes
//! effect immediately for all holders of the context.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;

/// An authenticated session.
pub struct Session {
    token: SecretString,
    started_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    pub fn started_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.started_at
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("started_at", &self.started_at)
            .finish()
    }
}

/// Shared handle to the current session, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with a token issued by the backend's auth flow.
    pub async fn login(&self, token: SecretString) {
        let mut guard = self.inner.write().await;
        *guard = Some(Session {
            token,
            started_at: chrono::Utc::now(),
        });
        tracing::info!("Session started");
    }

    /// End the session. Later requests fail locally until the next login.
    pub async fn logout(&self) {
        let mut guard = self.inner.write().await;
        if guard.take().is_some() {
            tracing::info!("Session ended");
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }

    /// Value for the `Authorization` header, or `None` when logged out.
    pub async fn bearer(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|s| format!("Bearer {}", s.token.expose_secret()))
    }
}
