use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum UserError {
    /// Connectivity, query or decoding failure in the backing store
    #[error("Storage error: {0}")]
    Storage(String),

    /// A uniqueness constraint other than `(provider, provider_id)` was violated.
    /// The upsert resolves conflicts on that key, so this indicates corrupt or
    /// foreign data in the users table rather than a concurrent login.
    #[error("Constraint violation: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for UserError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                UserError::Conflict(db_err.message().to_string())
            }
            _ => UserError::Storage(err.to_string()),
        }
    }
}
