//! The authenticated user, persisted across runs.
//!
//! Storage is written before memory changes, so a failed write leaves the
//! in-memory session exactly as it was.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::api::UserApi;
use crate::error::{PmboardError, Result};
use crate::model::{LoginRequest, ProfileUpdate, User};

/// Durable slot holding one serialized session entry.
pub trait SessionStorage: Send + Sync {
    /// `Ok(None)` when nothing is stored.
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, contents: &str) -> Result<()>;
    /// Removing an absent entry is not an error.
    fn remove(&self) -> Result<()>;
}

impl<T: SessionStorage + ?Sized> SessionStorage for Box<T> {
    fn read(&self) -> Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, contents: &str) -> Result<()> {
        (**self).write(contents)
    }

    fn remove(&self) -> Result<()> {
        (**self).remove()
    }
}

/// One JSON file, by default `~/.config/pmboard/session.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn read(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PmboardError::Storage(format!(
                "failed to read {}: {e}",
                self.path.display()
            ))),
        }
    }

    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PmboardError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        // Replace the entry atomically.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)
            .map_err(|e| PmboardError::Storage(format!("failed to write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            PmboardError::Storage(format!("failed to write {}: {e}", self.path.display()))
        })
    }

    fn remove(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PmboardError::Storage(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}

/// Process-local storage. Writes can be made to fail for testing.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<String>>,
    read_only: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(contents.into())),
            read_only: AtomicBool::new(false),
        }
    }

    /// When set, `write` and `remove` fail with a storage error.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(PmboardError::Storage("storage is read-only".to_string()));
        }
        Ok(())
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.slot
            .lock()
            .map_err(|_| PmboardError::Storage("session slot poisoned".to_string()))
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.slot()?.clone())
    }

    fn write(&self, contents: &str) -> Result<()> {
        self.check_writable()?;
        *self.slot()? = Some(contents.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        self.check_writable()?;
        *self.slot()? = None;
        Ok(())
    }
}

/// Anything that can answer "is someone logged in?". Lets the route guard
/// stay independent of the storage type.
pub trait AuthState {
    fn is_logged_in(&self) -> bool;
}

pub struct SessionStore<S: SessionStorage> {
    storage: S,
    user: Option<User>,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Rehydrate from storage. A missing, unreadable, or malformed entry
    /// means logged out; this never fails.
    pub fn restore(storage: S) -> Self {
        let user = match storage.read() {
            Ok(Some(raw)) if raw.trim().is_empty() => None,
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring malformed session entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read session, starting logged out");
                None
            }
        };
        if let Some(user) = &user {
            tracing::debug!(email = %user.email, "session restored");
        }
        Self { storage, user }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Send the credentials; on success the returned user replaces the
    /// session. On failure nothing changes and the error is returned.
    pub async fn login<B: UserApi>(&mut self, backend: &B, credentials: &LoginRequest) -> Result<&User> {
        let user = backend.login(credentials).await?;
        let user = self.establish(user)?;
        tracing::info!(email = %user.email, "logged in");
        Ok(user)
    }

    /// Replace the session with `user`, persisting it first.
    pub fn establish(&mut self, user: User) -> Result<&User> {
        let raw = serde_json::to_string(&user)?;
        self.storage.write(&raw)?;
        Ok(self.user.insert(user))
    }

    /// Clear the session. Idempotent and infallible: a storage entry that
    /// cannot be removed is blanked instead, which the next `restore` reads
    /// as logged out.
    pub fn logout(&mut self) {
        if let Err(e) = self.storage.remove() {
            tracing::warn!(error = %e, "could not remove session entry, blanking it");
            if let Err(e) = self.storage.write("") {
                tracing::warn!(error = %e, "could not blank session entry");
            }
        }
        if let Some(user) = self.user.take() {
            tracing::info!(email = %user.email, "logged out");
        }
    }

    /// Send a partial profile update for the current user. The returned
    /// user replaces the session like a login does.
    pub async fn update_profile<B: UserApi>(
        &mut self,
        backend: &B,
        changes: &ProfileUpdate,
    ) -> Result<&User> {
        let Some(current) = &self.user else {
            return Err(PmboardError::Validation(
                "You must be logged in to update your profile".to_string(),
            ));
        };
        if changes.is_empty() {
            return Err(PmboardError::Validation("Nothing to update".to_string()));
        }
        let updated = backend.update_user(current.id, changes).await?;
        self.establish(updated)
    }
}

impl<S: SessionStorage> AuthState for SessionStore<S> {
    fn is_logged_in(&self) -> bool {
        SessionStore::is_logged_in(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{user, FakeBackend};

    fn stored(storage: &impl SessionStorage) -> Option<User> {
        storage
            .read()
            .unwrap()
            .filter(|raw| !raw.is_empty())
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    #[test]
    fn test_restore_empty_storage_is_logged_out() {
        let store = SessionStore::restore(MemoryStorage::new());
        assert!(!store.is_logged_in());
        assert!(store.current_user().is_none());
    }

    #[test]
    fn test_restore_malformed_entry_is_logged_out() {
        let store = SessionStore::restore(MemoryStorage::with_contents("{not json"));
        assert!(!store.is_logged_in());

        let store = SessionStore::restore(MemoryStorage::with_contents(""));
        assert!(!store.is_logged_in());
    }

    #[test]
    fn test_restore_valid_entry() {
        let raw = serde_json::to_string(&user(4, "ana@example.com")).unwrap();
        let store = SessionStore::restore(MemoryStorage::with_contents(raw));
        assert_eq!(store.current_user().unwrap().id, 4);
    }

    #[tokio::test]
    async fn test_login_success_persists_user() {
        let backend = FakeBackend::with_account(user(1, "ana@example.com"), "pw");
        let mut store = SessionStore::restore(MemoryStorage::new());

        let logged = store
            .login(&backend, &LoginRequest::new("ana@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(logged.email, "ana@example.com");
        assert!(store.is_logged_in());
        assert_eq!(stored(store.storage()).unwrap().id, 1);
    }

    #[tokio::test]
    async fn test_login_failure_leaves_session_unchanged() {
        let backend = FakeBackend::with_account(user(1, "ana@example.com"), "pw");
        let existing = user(9, "bo@example.com");
        let raw = serde_json::to_string(&existing).unwrap();
        let mut store = SessionStore::restore(MemoryStorage::with_contents(raw));

        let err = store
            .login(&backend, &LoginRequest::new("ana@example.com", "wrong"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message("Login failed"), "Invalid password");
        assert_eq!(store.current_user(), Some(&existing));
        assert_eq!(stored(store.storage()), Some(existing));
    }

    #[tokio::test]
    async fn test_login_with_blank_fields_fails_validation() {
        let backend = FakeBackend::default();
        let mut store = SessionStore::restore(MemoryStorage::new());
        let err = store
            .login(&backend, &LoginRequest::new("", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, PmboardError::Validation(_)));
        assert!(!store.is_logged_in());
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_memory_unchanged() {
        let backend = FakeBackend::with_account(user(1, "ana@example.com"), "pw");
        let mut store = SessionStore::restore(MemoryStorage::new());
        store.storage().set_read_only(true);

        let err = store
            .login(&backend, &LoginRequest::new("ana@example.com", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, PmboardError::Storage(_)));
        assert!(!store.is_logged_in());
    }

    #[test]
    fn test_logout_is_idempotent() {
        let mut store = SessionStore::restore(MemoryStorage::new());
        store.establish(user(1, "ana@example.com")).unwrap();

        store.logout();
        assert!(!store.is_logged_in());
        assert!(store.storage().read().unwrap().is_none());

        store.logout();
        assert!(!store.is_logged_in());
    }

    #[test]
    fn test_logout_with_failing_storage_still_clears_memory() {
        let mut store = SessionStore::restore(MemoryStorage::new());
        store.establish(user(1, "ana@example.com")).unwrap();
        store.storage().set_read_only(true);

        store.logout();
        assert!(!store.is_logged_in());
    }

    #[tokio::test]
    async fn test_update_profile_replaces_session_user() {
        let backend = FakeBackend::with_account(user(1, "ana@example.com"), "pw");
        let mut store = SessionStore::restore(MemoryStorage::new());
        store.establish(user(1, "ana@example.com")).unwrap();

        let changes = ProfileUpdate {
            name: Some("Ana Maria".into()),
            ..Default::default()
        };
        store.update_profile(&backend, &changes).await.unwrap();
        assert_eq!(store.current_user().unwrap().name, "Ana Maria");
        assert_eq!(stored(store.storage()).unwrap().name, "Ana Maria");
    }

    #[tokio::test]
    async fn test_update_profile_requires_session() {
        let backend = FakeBackend::default();
        let mut store = SessionStore::restore(MemoryStorage::new());
        let changes = ProfileUpdate {
            name: Some("X".into()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_profile(&backend, &changes).await,
            Err(PmboardError::Validation(_))
        ));
    }

    #[test]
    fn test_file_storage_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let storage = FileStorage::new(&path);

        assert!(storage.read().unwrap().is_none());
        storage.write("{\"a\":1}").unwrap();
        assert_eq!(storage.read().unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(!path.with_extension("json.tmp").exists());

        storage.remove().unwrap();
        storage.remove().unwrap();
        assert!(storage.read().unwrap().is_none());
    }

    #[test]
    fn test_file_session_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut store = SessionStore::restore(FileStorage::new(&path));
        store.establish(user(3, "cy@example.com")).unwrap();
        drop(store);

        let store = SessionStore::restore(FileStorage::new(&path));
        assert_eq!(store.current_user().unwrap().email, "cy@example.com");
    }
}
