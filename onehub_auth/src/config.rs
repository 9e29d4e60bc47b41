//! Process configuration for the auth service
//!
//! Everything here is read once at startup into an [`AuthConfig`] value which is then
//! handed to the flow controller. Nothing is read from the environment after that.

use std::fmt;
use std::time::Duration;

const DEFAULT_SIGNING_SECRET: &str = "a-very-secret-key-that-should-be-long-and-random";

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const GOOGLE_SCOPES: &str = "https://www.googleapis.com/auth/userinfo.email \
                             https://www.googleapis.com/auth/userinfo.profile";

/// Minimum entropy of a login state value in bytes (128 bits)
pub(crate) const MIN_STATE_TOKEN_BYTES: usize = 16;

/// Provider client settings used for the authorization-code grant.
#[derive(Clone)]
pub struct OAuth2Config {
    pub provider: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub scopes: Vec<String>,
    /// Deadline for each outbound call to the provider
    pub http_timeout: Duration,
}

impl fmt::Debug for OAuth2Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2Config")
            .field("provider", &self.provider)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("redirect_url", &self.redirect_url)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("userinfo_url", &self.userinfo_url)
            .field("scopes", &self.scopes)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

/// CSRF state cookie settings.
#[derive(Debug, Clone)]
pub struct StateConfig {
    pub cookie_name: String,
    /// Lifetime of the state value and its cookie
    pub max_age: Duration,
    /// Random bytes per state value, never below 16
    pub token_bytes: usize,
}

/// Session credential settings.
#[derive(Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub signing_secret: String,
    /// Credential lifetime; the session cookie's Max-Age equals it
    pub token_ttl: Duration,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("cookie_name", &self.cookie_name)
            .field("signing_secret", &"[redacted]")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub port: u16,
    pub database_url: String,
    /// Mount prefix the reverse proxy forwards to this service
    pub route_prefix: String,
    /// Where the browser lands after a successful login
    pub landing_url: String,
    pub oauth2: OAuth2Config,
    pub state: StateConfig,
    pub session: SessionConfig,
}

impl AuthConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup, falling back to local
    /// development defaults for anything missing or unparsable.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let get_u64 = |key: &str, default: u64| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let port = lookup("PORT")
            .and_then(|s| s.trim().parse::<u16>().ok())
            .unwrap_or(8080);

        let frontend_url = get("FRONTEND_URL", "http://localhost:3000");
        let landing_url = format!("{}/dashboard", frontend_url.trim_end_matches('/'));

        let scopes = get("OAUTH2_SCOPE", GOOGLE_SCOPES)
            .split([' ', '+', ','])
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let oauth2 = OAuth2Config {
            provider: "google".to_string(),
            client_id: get("GOOGLE_CLIENT_ID", ""),
            client_secret: get("GOOGLE_CLIENT_SECRET", ""),
            redirect_url: get(
                "GOOGLE_REDIRECT_URL",
                "http://localhost:8080/api/auth/callback/google",
            ),
            auth_url: get("OAUTH2_AUTH_URL", GOOGLE_AUTH_URL),
            token_url: get("OAUTH2_TOKEN_URL", GOOGLE_TOKEN_URL),
            userinfo_url: get("OAUTH2_USERINFO_URL", GOOGLE_USERINFO_URL),
            scopes,
            http_timeout: Duration::from_secs(get_u64("OAUTH2_HTTP_TIMEOUT_SECS", 30)),
        };

        let state = StateConfig {
            cookie_name: get("STATE_COOKIE_NAME", "oauthstate"),
            max_age: Duration::from_secs(get_u64("STATE_COOKIE_MAX_AGE", 600)),
            token_bytes: (get_u64("STATE_TOKEN_BYTES", 32) as usize).max(MIN_STATE_TOKEN_BYTES),
        };

        let session = SessionConfig {
            cookie_name: get("SESSION_COOKIE_NAME", "onehub_jwt"),
            signing_secret: get("JWT_SECRET", DEFAULT_SIGNING_SECRET),
            token_ttl: Duration::from_secs(get_u64("SESSION_TOKEN_TTL_SECS", 72 * 60 * 60)),
        };

        Self {
            port,
            database_url: get("DATABASE_URL", "sqlite:onehub-auth.db"),
            route_prefix: get("AUTH_ROUTE_PREFIX", "/api/auth"),
            landing_url,
            oauth2,
            state,
            session,
        }
    }

    /// Log a warning for every setting still at an insecure development default.
    pub fn warn_on_insecure_defaults(&self) {
        if self.session.signing_secret == DEFAULT_SIGNING_SECRET {
            tracing::warn!("JWT_SECRET is not set; using the development signing secret");
        }
        if self.oauth2.client_id.is_empty() || self.oauth2.client_secret.is_empty() {
            tracing::warn!("GOOGLE_CLIENT_ID or GOOGLE_CLIENT_SECRET is not set");
        }
    }
}
