use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use headers::{Cookie, HeaderMapExt};
use http::header::{HeaderMap, SET_COOKIE};
use ring::rand::SecureRandom;

pub(crate) fn base64url_encode(input: Vec<u8>) -> Result<String, UtilError> {
    Ok(URL_SAFE_NO_PAD.encode(input))
}

/// Generate `len` random bytes from the system CSPRNG, base64url encoded without padding.
pub fn gen_random_string(len: usize) -> Result<String, UtilError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes)
        .map_err(|_| UtilError::Crypto("Failed to generate random string".to_string()))?;
    let encoded = base64url_encode(bytes)
        .map_err(|_| UtilError::Crypto("Failed to encode random string".to_string()))?;
    Ok(encoded)
}

/// Attributes of a `Set-Cookie` header written by this crate.
///
/// `HttpOnly` is always set. `path` scopes the cookie, `secure` adds the `Secure`
/// attribute and `max_age` is in seconds (zero or negative clears the cookie).
#[derive(Debug, Clone)]
pub(crate) struct CookieSpec<'a> {
    pub(crate) name: &'a str,
    pub(crate) value: &'a str,
    pub(crate) path: &'a str,
    pub(crate) same_site: &'a str,
    pub(crate) secure: bool,
    pub(crate) max_age: i64,
}

pub(crate) fn header_set_cookie<'h>(
    headers: &'h mut HeaderMap,
    spec: &CookieSpec<'_>,
) -> Result<&'h HeaderMap, UtilError> {
    let mut cookie = format!(
        "{}={}; SameSite={}; HttpOnly; Path={}; Max-Age={}",
        spec.name, spec.value, spec.same_site, spec.path, spec.max_age
    );
    if spec.secure {
        cookie.push_str("; Secure");
    }
    headers.append(
        SET_COOKIE,
        cookie
            .parse()
            .map_err(|_| UtilError::Cookie("Failed to parse cookie".to_string()))?,
    );
    Ok(headers)
}

/// Read a single cookie value from the request's `Cookie` header(s).
pub(crate) fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies: Cookie = headers.typed_get()?;
    cookies.get(name).map(str::to_string)
}

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum UtilError {
    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),
}
