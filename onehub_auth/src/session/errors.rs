use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// The credential could not be signed (e.g. missing secret)
    #[error("Signing error: {0}")]
    Signing(String),

    /// The credential failed signature, format or expiry checks
    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}
