use http::StatusCode;
use onehub_auth::CoordinationError;

/// Helper trait for converting errors to a standard response error format
pub(super) trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

/// Upstream provider failures are 502, local failures 500, a bad state 401.
impl<T> IntoResponseError<T> for Result<T, CoordinationError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| {
            let status = match e {
                CoordinationError::InvalidState(_) => StatusCode::UNAUTHORIZED,
                CoordinationError::ExchangeFailed(_)
                | CoordinationError::IdentityFetchFailed { .. }
                | CoordinationError::MalformedIdentity(_) => StatusCode::BAD_GATEWAY,
                CoordinationError::PersistenceFailed(_)
                | CoordinationError::SigningFailed(_)
                | CoordinationError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, e.to_string())
        })
    }
}
