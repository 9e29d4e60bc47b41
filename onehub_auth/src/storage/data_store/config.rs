//! Backing store connection setup

use std::{str::FromStr, sync::Arc};

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use super::types::{DataStore, PostgresDataStore, SqliteDataStore};
use crate::storage::errors::StorageError;

const POSTGRES_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DataStoreType {
    Sqlite,
    Postgres,
}

impl DataStoreType {
    pub(crate) fn from_url(url: &str) -> Result<Self, StorageError> {
        if url.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else {
            Err(StorageError::Storage(
                "Unsupported database URL. Supported schemes are 'sqlite:' and 'postgres://'"
                    .to_string(),
            ))
        }
    }
}

fn is_in_memory_sqlite(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Connect to the backing store named by `url`.
///
/// The connection is established eagerly so an unreachable store is reported at
/// startup rather than on the first login.
pub async fn connect_data_store(url: &str) -> Result<Arc<dyn DataStore>, StorageError> {
    let store_type = DataStoreType::from_url(url)?;

    tracing::info!("Initializing data store with type: {:?}", store_type);

    let store = match store_type {
        DataStoreType::Sqlite => {
            let opts = SqliteConnectOptions::from_str(url)
                .map_err(|e| StorageError::Storage(e.to_string()))?
                .create_if_missing(true);

            // Every connection to an in-memory database sees its own database,
            // so keep exactly one connection alive for the lifetime of the pool.
            let pool_options = if is_in_memory_sqlite(url) {
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
            } else {
                SqlitePoolOptions::new()
            };

            let pool = pool_options
                .connect_with(opts)
                .await
                .map_err(|e| StorageError::Storage(e.to_string()))?;

            Arc::new(SqliteDataStore::new(pool)) as Arc<dyn DataStore>
        }
        DataStoreType::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(POSTGRES_MAX_CONNECTIONS)
                .connect(url)
                .await
                .map_err(|e| StorageError::Storage(e.to_string()))?;

            Arc::new(PostgresDataStore::new(pool)) as Arc<dyn DataStore>
        }
    };

    tracing::info!("Connected to database: type={:?}", store_type);

    Ok(store)
}
