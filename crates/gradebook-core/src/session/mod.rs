//! Session store
//!
//! Single owner of the current [`Session`]. State lives in a `watch` channel so
//! any number of observers can read or await it; every mutation persists first
//! and then replaces the whole state at once.
//!
//! Lifecycle: a new store is [`SessionState::Pending`] until [`SessionStore::restore`]
//! reads durable storage. [`SessionStore::clear`] ends the session and wipes
//! the persisted keys.

pub mod storage;

use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::models::{Role, Session, SessionState};

pub use storage::{
    FileStorage, MemoryStorage, SessionStorage, SESSION_KEYS, TOKEN_KEY, USER_ID_KEY,
    USER_ROLE_KEY,
};

/// Cheap to clone; clones share state and storage.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    storage: Box<dyn SessionStorage>,
    state: watch::Sender<SessionState>,
    // Keeps persist-then-publish sequences from interleaving
    write_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        let (state, _) = watch::channel(SessionState::Pending);
        Self {
            inner: Arc::new(Inner {
                storage: Box::new(storage),
                state,
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// Store backed by process memory only
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Read persisted keys and publish the resulting state.
    ///
    /// A complete, valid key set yields an active session (without a display
    /// name until refreshed). A partial or invalid key set is wiped and yields
    /// an anonymous state. Storage failures also leave the store anonymous;
    /// unparseable storage is reset so later logins can persist again.
    pub fn restore(&self) -> Result<Option<Session>> {
        let _lock = self.lock()?;

        let loaded = self.load_persisted();
        let session = match loaded {
            Ok(session) => session,
            Err(e) => {
                if matches!(e, Error::Json(_)) {
                    if let Err(reset) = self.inner.storage.remove_many(&SESSION_KEYS) {
                        log::error!("Could not reset unreadable session storage: {}", reset);
                    }
                }
                self.inner.state.send_replace(SessionState::Anonymous);
                return Err(e);
            }
        };

        match &session {
            Some(s) => {
                log::info!("Restored {} session for user {}", s.role(), s.user_id());
                self.inner.state.send_replace(SessionState::Active(s.clone()));
            }
            None => {
                self.inner.state.send_replace(SessionState::Anonymous);
            }
        }

        Ok(session)
    }

    fn load_persisted(&self) -> Result<Option<Session>> {
        let storage = &self.inner.storage;
        let token = storage.get(TOKEN_KEY)?;
        let user_id = storage.get(USER_ID_KEY)?;
        let role = storage.get(USER_ROLE_KEY)?;

        match (token, user_id, role) {
            (None, None, None) => Ok(None),
            (Some(token), Some(user_id), Some(role)) => {
                let parsed = role
                    .parse::<Role>()
                    .and_then(|role| Session::new(user_id, role, token, None));
                match parsed {
                    Ok(session) => Ok(Some(session)),
                    Err(e) => {
                        log::warn!("Discarding persisted session: {}", e);
                        storage.remove_many(&SESSION_KEYS)?;
                        Ok(None)
                    }
                }
            }
            _ => {
                log::warn!("Discarding incomplete persisted session");
                storage.remove_many(&SESSION_KEYS)?;
                Ok(None)
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// The active session, if any
    pub fn current(&self) -> Option<Session> {
        self.inner.state.borrow().session().cloned()
    }

    pub fn token(&self) -> Option<String> {
        self.inner
            .state
            .borrow()
            .session()
            .map(|s| s.token().to_string())
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().session().is_some()
    }

    /// Observe state changes. The receiver sees the current value immediately.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Persist and publish a new session, replacing any previous one.
    ///
    /// On storage failure nothing is published and the prior state remains.
    pub fn replace(&self, session: Session) -> Result<()> {
        let _lock = self.lock()?;

        let role = session.role().as_str();
        self.inner.storage.set_many(&[
            (TOKEN_KEY, session.token()),
            (USER_ID_KEY, session.user_id()),
            (USER_ROLE_KEY, role),
        ])?;

        log::debug!("Session replaced for user {}", session.user_id());
        self.inner.state.send_replace(SessionState::Active(session));
        Ok(())
    }

    /// End the session: wipe the persisted keys, then publish anonymous state.
    ///
    /// The in-process session ends even when the wipe fails. The error is
    /// still returned, since the next restore would bring the session back.
    pub fn clear(&self) -> Result<()> {
        let _lock = self.lock()?;
        self.clear_locked()
    }

    fn clear_locked(&self) -> Result<()> {
        let wiped = self.inner.storage.remove_many(&SESSION_KEYS);
        self.inner.state.send_replace(SessionState::Anonymous);

        wiped.map_err(|e| {
            log::error!("Session ended but its stored keys could not be removed: {}", e);
            Error::Storage(std::io::Error::other(format!(
                "session ended but stored keys remain: {}",
                e
            )))
        })
    }

    /// Clear the session only if it still holds `token`.
    ///
    /// Returns whether the session was cleared. A response for a token that
    /// has already been replaced must not end the newer session.
    pub fn invalidate(&self, token: &str) -> Result<bool> {
        let _lock = self.lock()?;

        let matches = self
            .inner
            .state
            .borrow()
            .session()
            .is_some_and(|s| s.token() == token);

        if matches {
            log::info!("Session invalidated by the server");
            self.clear_locked()?;
        }
        Ok(matches)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.inner
            .write_lock
            .lock()
            .map_err(|_| Error::internal("Session store lock poisoned"))
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(token: &str) -> Session {
        Session::new("42", Role::Student, token, Some("Sam".into())).unwrap()
    }

    #[test]
    fn test_new_store_is_pending() {
        let store = SessionStore::in_memory();
        assert!(store.state().is_pending());
        assert!(store.current().is_none());
    }

    #[test]
    fn test_restore_empty_storage_is_anonymous() {
        let store = SessionStore::in_memory();
        assert_eq!(store.restore().unwrap(), None);
        assert_eq!(store.state(), SessionState::Anonymous);
    }

    #[test]
    fn test_replace_persists_three_keys() {
        let storage = MemoryStorage::new();
        let store = SessionStore::new(storage.clone());
        store.restore().unwrap();

        store.replace(student("tok-1")).unwrap();

        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
        assert_eq!(storage.get(USER_ID_KEY).unwrap().as_deref(), Some("42"));
        assert_eq!(storage.get(USER_ROLE_KEY).unwrap().as_deref(), Some("student"));
        assert_eq!(storage.len(), 3);
    }

    #[test]
    fn test_restore_after_reload() {
        let storage = MemoryStorage::new();
        SessionStore::new(storage.clone())
            .replace(student("tok-1"))
            .unwrap();

        let reloaded = SessionStore::new(storage);
        let session = reloaded.restore().unwrap().unwrap();

        assert_eq!(session.role(), Role::Student);
        assert_eq!(session.token(), "tok-1");
        assert_eq!(session.display_name(), None);
        assert!(reloaded.is_authenticated());
    }

    #[test]
    fn test_restore_discards_partial_keys() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "orphan").unwrap();

        let store = SessionStore::new(storage.clone());
        assert_eq!(store.restore().unwrap(), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_restore_discards_unknown_role() {
        let storage = MemoryStorage::new();
        storage
            .set_many(&[(TOKEN_KEY, "t"), (USER_ID_KEY, "1"), (USER_ROLE_KEY, "admin")])
            .unwrap();

        let store = SessionStore::new(storage.clone());
        assert_eq!(store.restore().unwrap(), None);
        assert_eq!(store.state(), SessionState::Anonymous);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_clear_wipes_keys_and_state() {
        let storage = MemoryStorage::new();
        let store = SessionStore::new(storage.clone());
        store.replace(student("tok-1")).unwrap();
        storage.set("theme", "dark").unwrap();

        store.clear().unwrap();

        assert!(store.current().is_none());
        for key in SESSION_KEYS {
            assert_eq!(storage.get(key).unwrap(), None);
        }
        assert_eq!(storage.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_invalidate_ignores_stale_token() {
        let store = SessionStore::in_memory();
        store.replace(student("new-token")).unwrap();

        assert!(!store.invalidate("old-token").unwrap());
        assert!(store.is_authenticated());

        assert!(store.invalidate("new-token").unwrap());
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let store = SessionStore::in_memory();
        let mut rx = store.subscribe();
        assert!(rx.borrow().is_pending());

        store.replace(student("tok")).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().session().map(|s| s.role()), Some(Role::Student));

        store.clear().unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), SessionState::Anonymous);
    }

    /// Storage whose removals fail, to simulate a read-only session file
    struct StuckStorage(MemoryStorage);

    impl SessionStorage for StuckStorage {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.0.set(key, value)
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Storage(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    #[test]
    fn test_clear_reports_failed_wipe() {
        let storage = MemoryStorage::new();
        let store = SessionStore::new(StuckStorage(storage.clone()));
        store.replace(student("tok-1")).unwrap();

        let err = store.clear().unwrap_err();

        assert!(err.to_string().contains("stored keys remain"));
        assert_eq!(store.state(), SessionState::Anonymous);
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_restore_resets_unreadable_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = SessionStore::new(FileStorage::new(&path));
        assert!(matches!(store.restore(), Err(Error::Json(_))));
        assert_eq!(store.state(), SessionState::Anonymous);

        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get(TOKEN_KEY).unwrap(), None);

        store.replace(student("tok-1")).unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::in_memory();
        let clone = store.clone();
        store.replace(student("tok")).unwrap();
        assert_eq!(clone.token().as_deref(), Some("tok"));
    }
}
