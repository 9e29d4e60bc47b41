//! Error taxonomy of the login flow

use thiserror::Error;

use crate::oauth2::OAuth2Error;
use crate::session::SessionError;
use crate::userdb::UserError;
use crate::utils::UtilError;

/// Errors that terminate a login flow
#[derive(Error, Debug, Clone)]
pub enum CoordinationError {
    /// CSRF correlation failed; the user must restart the login
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The provider rejected the authorization code or could not be reached
    #[error("Code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Identity fetch failed (status: {status:?}): {body}")]
    IdentityFetchFailed { status: Option<u16>, body: String },

    #[error("Malformed identity: {0}")]
    MalformedIdentity(String),

    #[error("Persistence failed: {0}")]
    PersistenceFailed(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Header, cookie or configuration failure local to this process
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoordinationError {
    /// Log the error and return self
    pub fn log(self) -> Self {
        match &self {
            Self::InvalidState(msg) => tracing::warn!("Invalid state: {}", msg),
            Self::ExchangeFailed(msg) => tracing::error!("Code exchange failed: {}", msg),
            Self::IdentityFetchFailed { status, body } => {
                tracing::error!(?status, "Identity fetch failed: {}", body)
            }
            Self::MalformedIdentity(msg) => tracing::error!("Malformed identity: {}", msg),
            Self::PersistenceFailed(msg) => tracing::error!("Persistence failed: {}", msg),
            Self::SigningFailed(msg) => tracing::error!("Signing failed: {}", msg),
            Self::Internal(msg) => tracing::error!("Internal error: {}", msg),
        }
        self
    }
}

// Conversions log as they map into the flow taxonomy

impl From<OAuth2Error> for CoordinationError {
    fn from(err: OAuth2Error) -> Self {
        let error = match err {
            OAuth2Error::InvalidState(msg) => Self::InvalidState(msg),
            OAuth2Error::TokenExchange(msg) => Self::ExchangeFailed(msg),
            OAuth2Error::FetchUserInfo { status, body } => {
                Self::IdentityFetchFailed { status, body }
            }
            OAuth2Error::MalformedIdentity(msg) => Self::MalformedIdentity(msg),
            other @ (OAuth2Error::Cookie(_)
            | OAuth2Error::Configuration(_)
            | OAuth2Error::Utils(_)) => Self::Internal(other.to_string()),
        };
        error.log()
    }
}

impl From<UserError> for CoordinationError {
    fn from(err: UserError) -> Self {
        Self::PersistenceFailed(err.to_string()).log()
    }
}

impl From<SessionError> for CoordinationError {
    fn from(err: SessionError) -> Self {
        let error = match err {
            SessionError::Signing(msg) => Self::SigningFailed(msg),
            other => Self::Internal(other.to_string()),
        };
        error.log()
    }
}

impl From<UtilError> for CoordinationError {
    fn from(err: UtilError) -> Self {
        Self::Internal(err.to_string()).log()
    }
}
