//! Session persistence and the explicit session context.
//!
//! The session is stored as one JSON document under a single key (default
//! `loggedInUser`). [`SessionContext`] is created at login or restored at
//! start-up and handed to the workflow environment; nothing reads the store
//! behind its back.

use crate::types::{Session, UserPatch};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Key the session is stored under unless configured otherwise
pub const DEFAULT_SESSION_KEY: &str = "loggedInUser";

/// Errors from session persistence
#[derive(Debug, Error)]
pub enum SessionError {
    /// Underlying store failed
    #[error("Session store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document is not a valid session
    #[error("Stored session is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Key is not usable as a store entry
    #[error("Invalid session key: {0:?}")]
    InvalidKey(String),
}

/// String key-value store holding the serialized session
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Remove `key`; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// In-memory store, for tests and short-lived processes
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// Store keeping one `<key>.json` file per key in a directory
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Store rooted at `dir`; the directory is created on first write
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> Result<PathBuf, SessionError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(SessionError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let path = self.path(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let path = self.path(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        // Write then rename so a crash never leaves a half-written session
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        let path = self.path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// The logged-in session, owned by the workflow
///
/// Reads go to the in-memory copy; every change is written back to the store
/// as a whole document.
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    key: String,
    session: RwLock<Session>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// Start a session after login and persist it
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be serialized or stored.
    pub async fn login(
        store: Arc<dyn SessionStore>,
        key: impl Into<String>,
        session: Session,
    ) -> Result<Self, SessionError> {
        let key = key.into();
        store.set(&key, &serde_json::to_string(&session)?).await?;
        tracing::info!(user_id = session.user.id, "Session started");

        Ok(Self {
            store,
            key,
            session: RwLock::new(session),
        })
    }

    /// Session backed by a fresh in-memory store
    ///
    /// Nothing is written until the first change. Used by tests and by
    /// callers that already hold a session from elsewhere.
    #[must_use]
    pub fn ephemeral(session: Session) -> Self {
        Self {
            store: Arc::new(MemorySessionStore::new()),
            key: DEFAULT_SESSION_KEY.to_string(),
            session: RwLock::new(session),
        }
    }

    /// Restore a previously persisted session
    ///
    /// Returns `Ok(None)` when no session is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or holds an invalid document.
    pub async fn restore(
        store: Arc<dyn SessionStore>,
        key: impl Into<String>,
    ) -> Result<Option<Self>, SessionError> {
        let key = key.into();
        let Some(raw) = store.get(&key).await? else {
            tracing::debug!(key = %key, "No stored session");
            return Ok(None);
        };

        let session: Session = serde_json::from_str(&raw)?;
        tracing::info!(user_id = session.user.id, "Session restored");

        Ok(Some(Self {
            store,
            key,
            session: RwLock::new(session),
        }))
    }

    /// Current session
    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    /// Merge `patch` into the user and re-persist the whole session
    ///
    /// Last writer wins; the in-memory copy is only updated once the store
    /// accepted the new document.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be serialized or stored.
    pub async fn merge_user(&self, patch: &UserPatch) -> Result<Session, SessionError> {
        let mut session = self.session.write().await;

        let mut updated = session.clone();
        updated.user.apply(patch);
        self.store
            .set(&self.key, &serde_json::to_string(&updated)?)
            .await?;

        *session = updated.clone();
        tracing::debug!(user_id = updated.user.id, "Session user merged");
        Ok(updated)
    }

    /// End the session and remove it from the store
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails to remove the entry.
    pub async fn logout(self) -> Result<(), SessionError> {
        self.store.remove(&self.key).await?;
        tracing::info!("Session ended");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::types::User;
    use serde_json::json;

    fn session() -> Session {
        Session::new("t", User::new(1, "a", "a@x.com"))
    }

    #[tokio::test]
    async fn memory_store_set_get_remove() {
        let store = MemorySessionStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        FileSessionStore::new(dir.path().join("nested"))
            .set(DEFAULT_SESSION_KEY, "{\"a\":1}")
            .await
            .unwrap();

        let store = FileSessionStore::new(dir.path().join("nested"));
        assert_eq!(
            store.get(DEFAULT_SESSION_KEY).await.unwrap().as_deref(),
            Some("{\"a\":1}")
        );

        store.remove(DEFAULT_SESSION_KEY).await.unwrap();
        assert_eq!(store.get(DEFAULT_SESSION_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        for key in ["", "../escape", "a/b", ".hidden"] {
            assert!(matches!(
                store.set(key, "x").await,
                Err(SessionError::InvalidKey(_))
            ));
        }
    }

    #[tokio::test]
    async fn login_persists_and_restore_reads_back() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());

        let ctx = SessionContext::login(Arc::clone(&store), DEFAULT_SESSION_KEY, session())
            .await
            .unwrap();
        assert_eq!(ctx.snapshot().await, session());

        let restored = SessionContext::restore(Arc::clone(&store), DEFAULT_SESSION_KEY)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(restored.snapshot().await, session());
    }

    #[tokio::test]
    async fn restore_without_session_is_none() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let restored = SessionContext::restore(store, DEFAULT_SESSION_KEY).await.unwrap();
        assert!(restored.is_none());
    }

    #[tokio::test]
    async fn restore_rejects_invalid_document() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        store.set(DEFAULT_SESSION_KEY, "not json").await.unwrap();

        let result = SessionContext::restore(store, DEFAULT_SESSION_KEY).await;
        assert!(matches!(result, Err(SessionError::Json(_))));
    }

    #[tokio::test]
    async fn merge_user_keeps_unrelated_fields() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        store
            .set(
                DEFAULT_SESSION_KEY,
                &json!({
                    "jwt": "t",
                    "user": {"id": 1, "username": "a", "email": "a@x.com", "blocked": false},
                    "provider": "local"
                })
                .to_string(),
            )
            .await
            .unwrap();

        let ctx = SessionContext::restore(Arc::clone(&store), DEFAULT_SESSION_KEY)
            .await
            .unwrap()
            .unwrap();
        ctx.merge_user(&UserPatch {
            username: Some("b".into()),
            email: None,
        })
        .await
        .unwrap();

        let stored: serde_json::Value =
            serde_json::from_str(&store.get(DEFAULT_SESSION_KEY).await.unwrap().unwrap()).unwrap();
        assert_eq!(
            stored,
            json!({
                "jwt": "t",
                "user": {"id": 1, "username": "b", "email": "a@x.com", "blocked": false},
                "provider": "local"
            })
        );
        assert_eq!(ctx.snapshot().await.user.username, "b");
    }

    #[tokio::test]
    async fn logout_removes_session() {
        let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
        let ctx = SessionContext::login(Arc::clone(&store), DEFAULT_SESSION_KEY, session())
            .await
            .unwrap();

        ctx.logout().await.unwrap();
        assert_eq!(store.get(DEFAULT_SESSION_KEY).await.unwrap(), None);
    }
}
