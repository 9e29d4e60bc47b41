//! CSRF correlation value for the two-phase login
//!
//! The value is `<random>.<issued-at unix seconds>` and lives only in a short-lived cookie
//! on the browser. The callback is accepted when the `state` query parameter equals the
//! cookie and the embedded issuance time is within the cookie's max age.

use std::time::Duration;

use chrono::{DateTime, Utc};
use http::HeaderMap;

use crate::config::{MIN_STATE_TOKEN_BYTES, StateConfig};
use crate::oauth2::errors::OAuth2Error;
use crate::utils::{CookieSpec, gen_random_string, get_cookie_value, header_set_cookie};

/// Tolerated clock difference between instances issuing and validating a state value
const CLOCK_SKEW_SECS: i64 = 60;

/// A freshly issued state value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginState {
    pub value: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StateTokenIssuer {
    cookie_name: String,
    cookie_path: String,
    max_age: Duration,
    token_bytes: usize,
}

impl StateTokenIssuer {
    /// `cookie_path` scopes the cookie to the login routes, normally the route prefix.
    pub fn new(config: &StateConfig, cookie_path: &str) -> Self {
        let trimmed = cookie_path.trim_end_matches('/');
        let cookie_path = if trimmed.is_empty() {
            "/".to_string()
        } else {
            trimmed.to_string()
        };
        Self {
            cookie_name: config.cookie_name.clone(),
            cookie_path,
            max_age: config.max_age,
            token_bytes: config.token_bytes.max(MIN_STATE_TOKEN_BYTES),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn issue(&self) -> Result<(LoginState, HeaderMap), OAuth2Error> {
        self.issue_at(Utc::now())
    }

    /// Generate a state value issued at `now` and the `Set-Cookie` header carrying it.
    pub fn issue_at(&self, now: DateTime<Utc>) -> Result<(LoginState, HeaderMap), OAuth2Error> {
        let random = gen_random_string(self.token_bytes)?;
        let value = format!("{random}.{}", now.timestamp());
        let expires_at = now + self.max_age_chrono()?;

        let mut headers = HeaderMap::new();
        header_set_cookie(&mut headers, &self.cookie_spec(&value, self.max_age_secs()?))?;

        tracing::debug!(cookie_name = %self.cookie_name, %expires_at, "Issued login state");

        Ok((
            LoginState {
                value,
                issued_at: now,
                expires_at,
            },
            headers,
        ))
    }

    /// The state value the browser presented in its cookie, if any
    pub fn stored_value(&self, headers: &HeaderMap) -> Option<String> {
        get_cookie_value(headers, &self.cookie_name)
    }

    pub fn validate(&self, presented: &str, stored: Option<&str>) -> Result<(), OAuth2Error> {
        self.validate_at(presented, stored, Utc::now())
    }

    /// Accept `presented` only if it equals the cookie value and has not expired at `now`.
    pub fn validate_at(
        &self,
        presented: &str,
        stored: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), OAuth2Error> {
        let Some(stored) = stored else {
            return Err(OAuth2Error::InvalidState(
                "state cookie not found".to_string(),
            ));
        };

        if presented.is_empty() || presented != stored {
            return Err(OAuth2Error::InvalidState(
                "state parameter does not match state cookie".to_string(),
            ));
        }

        let issued_at = presented
            .rsplit_once('.')
            .and_then(|(_, secs)| secs.parse::<i64>().ok())
            .ok_or_else(|| OAuth2Error::InvalidState("state value is malformed".to_string()))?;

        let age = now.timestamp() - issued_at;
        if age > self.max_age_secs()? || age < -CLOCK_SKEW_SECS {
            tracing::debug!(age, max_age = ?self.max_age, "Login state out of its validity window");
            return Err(OAuth2Error::InvalidState("state has expired".to_string()));
        }

        Ok(())
    }

    /// Append a `Set-Cookie` header that deletes the state cookie.
    pub fn clear_cookie(&self, headers: &mut HeaderMap) -> Result<(), OAuth2Error> {
        header_set_cookie(headers, &self.cookie_spec("", 0))?;
        Ok(())
    }

    fn cookie_spec<'a>(&'a self, value: &'a str, max_age: i64) -> CookieSpec<'a> {
        CookieSpec {
            name: &self.cookie_name,
            value,
            path: &self.cookie_path,
            same_site: "Lax",
            secure: true,
            max_age,
        }
    }

    fn max_age_secs(&self) -> Result<i64, OAuth2Error> {
        i64::try_from(self.max_age.as_secs())
            .map_err(|_| OAuth2Error::Configuration("state max age out of range".to_string()))
    }

    fn max_age_chrono(&self) -> Result<chrono::Duration, OAuth2Error> {
        chrono::Duration::from_std(self.max_age)
            .map_err(|_| OAuth2Error::Configuration("state max age out of range".to_string()))
    }
}
