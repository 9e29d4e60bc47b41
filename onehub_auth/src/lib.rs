//! onehub-auth - OAuth2 authorization-code login and session issuance
//!
//! The crate runs the server side of a provider login: it issues a CSRF state value,
//! exchanges the returned authorization code, resolves the provider identity, upserts a
//! local user keyed by `(provider, provider_id)` and mints a signed session credential
//! bound to a cookie. It is framework agnostic and speaks `http::HeaderMap` at its
//! boundary; see `onehub-auth-axum` for the HTTP handlers.

mod config;
mod coordination;
mod oauth2;
mod session;
mod storage;
mod userdb;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::{AuthConfig, OAuth2Config, SessionConfig, StateConfig};

pub use coordination::{AuthFlowController, CoordinationError, FlowStage};

pub use oauth2::{
    AuthResponse, AuthorizationClient, ExternalIdentity, GoogleAuthorizationClient,
    GoogleIdentityResolver, IdentityResolver, LoginState, OAuth2Error, StateTokenIssuer,
};

pub use session::{SessionClaims, SessionError, SessionTokenIssuer};

pub use storage::{DataStore, PostgresDataStore, SqliteDataStore, StorageError, connect_data_store};

pub use userdb::{User, UserError, UserProfile, UserStore};

pub use utils::{UtilError, gen_random_string};

/// Connect the backing store named by `config.database_url` and prepare the users table.
///
/// Failure here means the process cannot serve logins and should stop.
pub async fn init_user_store(config: &AuthConfig) -> Result<UserStore, Box<dyn std::error::Error>> {
    let store = connect_data_store(&config.database_url).await?;
    let users = UserStore::new(store);
    users.init().await?;
    tracing::info!("User store initialized");
    Ok(users)
}
