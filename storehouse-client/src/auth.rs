/// Signed-in session.
///
/// The session is stored under the `auth` key as `{"user": ..., "token": ...}`
/// and restored on start. A stored value that cannot be read is ignored and
/// the client starts signed out.

use crate::error::StorageError;
use crate::storage::{Storage, AUTH_KEY};
use crate::types::{AuthUser, LoginResponse};
use serde::{Deserialize, Serialize};

/// User and token of the current session. An empty token means signed out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub token: String,
}

impl AuthState {
    /// True when a token is present
    pub fn is_signed_in(&self) -> bool {
        !self.token.is_empty()
    }
}

impl From<LoginResponse> for AuthState {
    fn from(login: LoginResponse) -> Self {
        Self {
            user: Some(login.user),
            token: login.token,
        }
    }
}

/// Session backed by storage; every change is written through.
#[derive(Debug)]
pub struct AuthStore {
    storage: Storage,
    state: AuthState,
}

impl AuthStore {
    /// Restores the session saved in `storage`.
    pub fn load(storage: Storage) -> Self {
        let state = match storage.get_item(AUTH_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<AuthState>(&raw) {
                Ok(state) => state,
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring unreadable saved session");
                    AuthState::default()
                }
            },
            Ok(None) => AuthState::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read saved session");
                AuthState::default()
            }
        };

        Self { storage, state }
    }

    /// Current session
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Signed-in user
    pub fn user(&self) -> Option<&AuthUser> {
        self.state.user.as_ref()
    }

    /// Token to send, or `None` when signed out.
    pub fn token(&self) -> Option<String> {
        Some(self.state.token.clone()).filter(|t| !t.is_empty())
    }

    /// Replaces the session and saves it.
    ///
    /// # Errors
    ///
    /// Fails when the session cannot be written; the in-memory state is
    /// updated regardless.
    pub fn set(&mut self, state: AuthState) -> Result<(), StorageError> {
        self.state = state;
        self.storage.set_json(AUTH_KEY, &self.state)
    }

    /// Signs out and removes the saved session.
    ///
    /// # Errors
    ///
    /// Fails when storage cannot be written.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.state = AuthState::default();
        self.storage.remove_item(AUTH_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn user() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            name: "John".to_string(),
            email: "john@example.com".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Main St".to_string(),
            role: 0,
        }
    }

    #[test]
    fn test_starts_signed_out_without_saved_session() {
        let dir = TempDir::new().unwrap();
        let store = AuthStore::load(Storage::open(dir.path().join("state.json")));

        assert_eq!(store.state(), &AuthState::default());
        assert_eq!(store.token(), None);
        assert!(!store.state().is_signed_in());
    }

    #[test]
    fn test_session_is_restored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let state = AuthState {
            user: Some(user()),
            token: "abc123".to_string(),
        };

        AuthStore::load(Storage::open(&path)).set(state.clone()).unwrap();

        let restored = AuthStore::load(Storage::open(&path));
        assert_eq!(restored.state(), &state);
        assert_eq!(restored.token().as_deref(), Some("abc123"));
        assert_eq!(restored.user().unwrap().name, "John");
    }

    #[test]
    fn test_unreadable_session_is_ignored() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path().join("state.json"));
        storage.set_item(AUTH_KEY, "{not json").unwrap();

        let store = AuthStore::load(storage);
        assert_eq!(store.state(), &AuthState::default());
    }

    #[test]
    fn test_clear_removes_saved_session() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path().join("state.json"));
        let mut store = AuthStore::load(storage.clone());

        store
            .set(AuthState {
                user: Some(user()),
                token: "abc123".to_string(),
            })
            .unwrap();
        store.clear().unwrap();

        assert_eq!(store.token(), None);
        assert_eq!(storage.get_item(AUTH_KEY).unwrap(), None);
    }
}
