use http::HeaderMap;

use crate::session::errors::SessionError;
use crate::utils::{CookieSpec, header_set_cookie};

/// Bind a session credential to a host-wide `HttpOnly; Secure; SameSite=Lax` cookie
/// that lives exactly as long as the credential.
pub(crate) fn set_session_cookie(
    headers: &mut HeaderMap,
    cookie_name: &str,
    token: &str,
    max_age_secs: u64,
) -> Result<(), SessionError> {
    let max_age = i64::try_from(max_age_secs)
        .map_err(|_| SessionError::Cookie("Session cookie max age out of range".to_string()))?;

    header_set_cookie(
        headers,
        &CookieSpec {
            name: cookie_name,
            value: token,
            path: "/",
            same_site: "Lax",
            secure: true,
            max_age,
        },
    )?;

    tracing::debug!(cookie_name, max_age, "Session cookie set");
    Ok(())
}
