use std::fmt;
use std::sync::Arc;

use http::HeaderMap;

use crate::config::AuthConfig;
use crate::oauth2::{
    AuthResponse, AuthorizationClient, GoogleAuthorizationClient, GoogleIdentityResolver,
    IdentityResolver, StateTokenIssuer,
};
use crate::session::{SessionTokenIssuer, set_session_cookie};
use crate::userdb::{User, UserProfile, UserStore};

use super::errors::CoordinationError;

/// Stages of a single login, in the order they are reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Initiated,
    AwaitingCallback,
    Exchanged,
    Resolved,
    Persisted,
    Issued,
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowStage::Initiated => "initiated",
            FlowStage::AwaitingCallback => "awaiting_callback",
            FlowStage::Exchanged => "exchanged",
            FlowStage::Resolved => "resolved",
            FlowStage::Persisted => "persisted",
            FlowStage::Issued => "issued",
        };
        f.write_str(name)
    }
}

/// Drives the two-phase authorization-code login.
///
/// No intermediate state is kept server-side: the state value travels in a cookie
/// between [`begin_login`](Self::begin_login) and [`complete_login`](Self::complete_login),
/// so one controller can be shared by any number of concurrent flows.
#[derive(Debug)]
pub struct AuthFlowController {
    state: StateTokenIssuer,
    authorization: Arc<dyn AuthorizationClient>,
    identity: Arc<dyn IdentityResolver>,
    users: UserStore,
    sessions: SessionTokenIssuer,
    session_cookie_name: String,
    landing_url: String,
}

impl AuthFlowController {
    /// Controller talking to the provider endpoints configured in `config.oauth2`.
    pub fn new(config: &AuthConfig, users: UserStore) -> Result<Self, CoordinationError> {
        let authorization = GoogleAuthorizationClient::new(&config.oauth2)?;
        let identity = GoogleIdentityResolver::new(&config.oauth2)?;
        Ok(Self::with_collaborators(
            config,
            users,
            Arc::new(authorization),
            Arc::new(identity),
        ))
    }

    pub fn with_collaborators(
        config: &AuthConfig,
        users: UserStore,
        authorization: Arc<dyn AuthorizationClient>,
        identity: Arc<dyn IdentityResolver>,
    ) -> Self {
        Self {
            state: StateTokenIssuer::new(&config.state, &config.route_prefix),
            authorization,
            identity,
            users,
            sessions: SessionTokenIssuer::from_config(&config.session),
            session_cookie_name: config.session.cookie_name.clone(),
            landing_url: config.landing_url.clone(),
        }
    }

    pub fn landing_url(&self) -> &str {
        &self.landing_url
    }

    pub fn session_tokens(&self) -> &SessionTokenIssuer {
        &self.sessions
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    /// Start a login: issue a state value and build the provider's authorization URL.
    ///
    /// Returns the URL to redirect to and the headers setting the state cookie.
    pub fn begin_login(&self) -> Result<(String, HeaderMap), CoordinationError> {
        let (login_state, headers) = self.state.issue()?;
        let auth_url = self.authorization.authorization_url(&login_state.value);

        tracing::debug!(
            stage = %FlowStage::Initiated,
            provider = self.authorization.provider(),
            expires_at = %login_state.expires_at,
            "Login initiated"
        );
        tracing::debug!(stage = %FlowStage::AwaitingCallback, "Redirecting to provider");

        Ok((auth_url, headers))
    }

    /// Finish a login from the provider's redirect.
    ///
    /// On success returns headers setting the session cookie (and clearing the state
    /// cookie) together with the landing URL. Every failure aborts the flow; nothing is
    /// retried and no session cookie is produced.
    #[tracing::instrument(skip_all, fields(provider = self.authorization.provider()))]
    pub async fn complete_login(
        &self,
        auth_response: &AuthResponse,
        headers: &HeaderMap,
    ) -> Result<(HeaderMap, String), CoordinationError> {
        let stored_state = self.state.stored_value(headers);
        self.state
            .validate(&auth_response.state, stored_state.as_deref())?;

        if let Some(error) = &auth_response.error {
            return Err(CoordinationError::ExchangeFailed(format!(
                "provider returned error: {error}"
            ))
            .log());
        }

        let access_token = self.authorization.exchange_code(&auth_response.code).await?;
        tracing::debug!(stage = %FlowStage::Exchanged, "Authorization code exchanged");

        let identity = self.identity.resolve(&access_token).await?;
        tracing::debug!(stage = %FlowStage::Resolved, subject = %identity.subject, "Identity resolved");

        let user = self.users.upsert_user(&UserProfile::from(identity)).await?;
        tracing::debug!(stage = %FlowStage::Persisted, user_id = %user.id, "User persisted");

        let response_headers = self.issue_session(&user)?;
        tracing::info!(stage = %FlowStage::Issued, user_id = %user.id, "Login completed");

        Ok((response_headers, self.landing_url.clone()))
    }

    fn issue_session(&self, user: &User) -> Result<HeaderMap, CoordinationError> {
        let token = self.sessions.issue(&user.id)?;

        let mut headers = HeaderMap::new();
        set_session_cookie(
            &mut headers,
            &self.session_cookie_name,
            &token,
            self.sessions.ttl().as_secs(),
        )?;
        self.state.clear_cookie(&mut headers)?;
        Ok(headers)
    }
}
