//! Shared helpers for unit tests across the crate

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::storage::SqliteDataStore;
use crate::userdb::UserStore;

/// A freshly initialised user store backed by a private in-memory SQLite database.
///
/// The pool holds a single connection for its whole lifetime; a second connection
/// would see a different, empty database.
pub(crate) async fn memory_user_store() -> UserStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite database");

    let store = UserStore::new(Arc::new(SqliteDataStore::new(pool)));
    store.init().await.expect("Failed to initialize UserStore");
    store
}

/// Removes the temporary database files when dropped
pub(crate) struct TempDbGuard {
    path: PathBuf,
}

impl Drop for TempDbGuard {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut path = self.path.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

/// A user store backed by a temporary SQLite file so that several connections
/// can write to it concurrently.
pub(crate) async fn file_backed_user_store() -> (UserStore, TempDbGuard) {
    let path = std::env::temp_dir().join(format!("onehub-auth-test-{}.db", uuid::Uuid::new_v4()));
    let guard = TempDbGuard { path: path.clone() };

    let opts = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(opts)
        .await
        .expect("Failed to open temporary SQLite database");

    let store = UserStore::new(Arc::new(SqliteDataStore::new(pool)));
    store.init().await.expect("Failed to initialize UserStore");
    (store, guard)
}
