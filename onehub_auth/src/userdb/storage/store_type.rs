use std::sync::Arc;

use chrono::Utc;

use crate::storage::DataStore;
use crate::userdb::{
    errors::UserError,
    types::{User, UserProfile},
};

use super::postgres::*;
use super::sqlite::*;

/// Persistent user records keyed by `(provider, provider_id)`.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct UserStore {
    store: Arc<dyn DataStore>,
}

impl UserStore {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Create the users table if needed and validate its schema
    pub async fn init(&self) -> Result<(), UserError> {
        match (self.store.as_sqlite(), self.store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool).await?;
                validate_user_tables_sqlite(pool).await?;
                Ok(())
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool).await?;
                validate_user_tables_postgres(pool).await?;
                Ok(())
            }
            _ => Err(UserError::Storage("Unsupported database type".to_string())),
        }
    }

    /// Atomically create or update the user identified by `(provider, provider_id)`.
    ///
    /// A new row receives a freshly generated local id. An existing row keeps its id and
    /// `created_at`; email, name and avatar are overwritten and `updated_at` is bumped.
    /// Concurrent calls for the same key leave exactly one row behind, with the last
    /// writer's profile fields.
    #[tracing::instrument(skip(self, profile), fields(provider = %profile.provider))]
    pub async fn upsert_user(&self, profile: &UserProfile) -> Result<User, UserError> {
        let new_id = gen_new_user_id();
        let now = Utc::now();

        let result = if let Some(pool) = self.store.as_sqlite() {
            upsert_user_sqlite(pool, &new_id, profile, now).await
        } else if let Some(pool) = self.store.as_postgres() {
            upsert_user_postgres(pool, &new_id, profile, now).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(user) => {
                tracing::info!(
                    user_id = %user.id,
                    created = user.id == new_id,
                    "User upsert completed successfully"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "User upsert failed");
            }
        }

        result
    }

    /// Get a user by their local id
    #[tracing::instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            get_user_sqlite(pool, id).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_user_postgres(pool, id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    pub async fn get_user_by_provider(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            get_user_by_provider_sqlite(pool, provider, provider_id).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_user_by_provider_postgres(pool, provider, provider_id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    pub async fn get_all_users(&self) -> Result<Vec<User>, UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            get_all_users_sqlite(pool).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_all_users_postgres(pool).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }
}

fn gen_new_user_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
