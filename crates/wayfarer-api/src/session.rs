//! Session state: the bearer token and user profile, held in memory and
//! mirrored to persisted storage so they survive a restart.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::User;

/// Storage key holding the raw bearer token.
pub const TOKEN_KEY: &str = "authToken";

/// Storage key holding the JSON-serialized [`User`].
pub const USER_KEY: &str = "user";

/// Errors raised by a [`SessionStorage`] backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize session user: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Minimal string key/value store backing a [`Session`].
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

// ---------------------------------------------------------------------------
// In-memory storage
// ---------------------------------------------------------------------------

/// Process-local storage. Nothing outlives the value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File storage
// ---------------------------------------------------------------------------

/// One file per key inside a directory.
///
/// Files are written with mode 0600 on Unix.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        // Keys become file names, so keep them to a safe alphabet.
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(key))
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        std::fs::write(&path, value).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, perms)
                .map_err(|source| StorageError::Io { path, source })?;
        }

        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The signed-in user's token and profile.
///
/// The in-memory copy is authoritative for outgoing requests; storage is
/// only read once, by [`Session::restore`].
pub struct Session {
    token: Option<String>,
    user: Option<User>,
    storage: Box<dyn SessionStorage>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// An empty session over the given storage. Storage is not read.
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            token: None,
            user: None,
            storage: Box::new(storage),
        }
    }

    /// A session with no persistence at all.
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Load token and user from storage.
    ///
    /// A stored user that fails to parse is logged and ignored; the token
    /// is still restored.
    pub fn restore(storage: impl SessionStorage + 'static) -> Result<Self, StorageError> {
        let mut session = Self::new(storage);
        session.token = session
            .storage
            .get_item(TOKEN_KEY)?
            .filter(|t| !t.trim().is_empty());

        if let Some(raw) = session.storage.get_item(USER_KEY)? {
            match serde_json::from_str::<User>(&raw) {
                Ok(user) => session.user = Some(user),
                Err(e) => warn!(error = %e, "ignoring unreadable persisted user"),
            }
        }

        debug!(
            has_token = session.token.is_some(),
            has_user = session.user.is_some(),
            "session restored"
        );
        Ok(session)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Record a successful login in storage, then in memory.
    ///
    /// If either write fails the session is left as it was and the token
    /// written so far is removed again.
    pub fn establish(&mut self, token: String, user: User) -> Result<(), StorageError> {
        let user_json = serde_json::to_string(&user)?;
        self.storage.set_item(TOKEN_KEY, &token)?;
        if let Err(e) = self.storage.set_item(USER_KEY, &user_json) {
            if let Err(undo) = self.storage.remove_item(TOKEN_KEY) {
                warn!(error = %undo, "failed to roll back persisted token");
            }
            return Err(e);
        }

        self.token = Some(token);
        self.user = Some(user);
        Ok(())
    }

    /// Forget the token and user, in memory and in storage.
    ///
    /// Memory is cleared even when storage fails.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.token = None;
        self.user = None;
        self.storage.remove_item(TOKEN_KEY)?;
        self.storage.remove_item(USER_KEY)?;
        Ok(())
    }
}
