use std::fmt;

use async_trait::async_trait;
use url::Url;

use crate::config::OAuth2Config;
use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::{ExternalIdentity, TokenResponse, UserInfoResponse};

use super::client::{AuthorizationClient, IdentityResolver};
use super::utils::build_http_client;

/// Authorization-code grant against Google (or any endpoint set configured the same way)
#[derive(Clone)]
pub struct GoogleAuthorizationClient {
    provider: String,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    auth_url: Url,
    token_url: String,
    scope: String,
    http: reqwest::Client,
}

impl fmt::Debug for GoogleAuthorizationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleAuthorizationClient")
            .field("provider", &self.provider)
            .field("client_id", &self.client_id)
            .field("redirect_url", &self.redirect_url)
            .field("auth_url", &self.auth_url.as_str())
            .field("token_url", &self.token_url)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl GoogleAuthorizationClient {
    pub fn new(config: &OAuth2Config) -> Result<Self, OAuth2Error> {
        let auth_url = Url::parse(&config.auth_url).map_err(|e| {
            OAuth2Error::Configuration(format!("invalid authorization URL: {e}"))
        })?;

        Ok(Self {
            provider: config.provider.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_url: config.redirect_url.clone(),
            auth_url,
            token_url: config.token_url.clone(),
            scope: config.scopes.join(" "),
            http: build_http_client(config.http_timeout)?,
        })
    }
}

#[async_trait]
impl AuthorizationClient for GoogleAuthorizationClient {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn authorization_url(&self, state: &str) -> String {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scope)
            .append_pair("state", state)
            .append_pair("access_type", "online");
        url.into()
    }

    #[tracing::instrument(skip_all, fields(provider = %self.provider))]
    async fn exchange_code(&self, code: &str) -> Result<String, OAuth2Error> {
        if code.is_empty() {
            return Err(OAuth2Error::TokenExchange(
                "authorization code is missing".to_string(),
            ));
        }

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(%status, "Token endpoint rejected the authorization code");
            return Err(OAuth2Error::TokenExchange(format!(
                "token endpoint returned {status}: {response_body}"
            )));
        }

        let token: TokenResponse = serde_json::from_str(&response_body).map_err(|e| {
            OAuth2Error::TokenExchange(format!("invalid token response: {e}"))
        })?;

        tracing::debug!(
            token_type = ?token.token_type,
            expires_in = ?token.expires_in,
            scope = ?token.scope,
            "Token exchange succeeded"
        );

        Ok(token.access_token)
    }
}

/// Fetches and normalizes the userinfo document for an access token
#[derive(Clone)]
pub struct GoogleIdentityResolver {
    provider: String,
    userinfo_url: String,
    http: reqwest::Client,
}

impl fmt::Debug for GoogleIdentityResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleIdentityResolver")
            .field("provider", &self.provider)
            .field("userinfo_url", &self.userinfo_url)
            .finish_non_exhaustive()
    }
}

impl GoogleIdentityResolver {
    pub fn new(config: &OAuth2Config) -> Result<Self, OAuth2Error> {
        Ok(Self {
            provider: config.provider.clone(),
            userinfo_url: config.userinfo_url.clone(),
            http: build_http_client(config.http_timeout)?,
        })
    }
}

#[async_trait]
impl IdentityResolver for GoogleIdentityResolver {
    #[tracing::instrument(skip_all, fields(provider = %self.provider))]
    async fn resolve(&self, access_token: &str) -> Result<ExternalIdentity, OAuth2Error> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuth2Error::FetchUserInfo {
                status: None,
                body: e.to_string(),
            })?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| OAuth2Error::FetchUserInfo {
                status: Some(status.as_u16()),
                body: e.to_string(),
            })?;

        if !status.is_success() {
            return Err(OAuth2Error::FetchUserInfo {
                status: Some(status.as_u16()),
                body: response_body,
            });
        }

        let userinfo: UserInfoResponse = serde_json::from_str(&response_body).map_err(|e| {
            OAuth2Error::MalformedIdentity(format!("failed to decode userinfo: {e}"))
        })?;

        let identity = ExternalIdentity::from_userinfo(&self.provider, userinfo)?;
        tracing::debug!(subject = %identity.subject, "Resolved external identity");
        Ok(identity)
    }
}
