use crate::utils::UtilError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum OAuth2Error {
    /// The callback's state did not match the browser's state cookie, or has expired
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Token exchange error: {0}")]
    TokenExchange(String),

    /// The userinfo endpoint could not be reached or answered with a non-success status
    #[error("Fetch user info error (status: {status:?}): {body}")]
    FetchUserInfo { status: Option<u16>, body: String },

    #[error("Malformed identity: {0}")]
    MalformedIdentity(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}
