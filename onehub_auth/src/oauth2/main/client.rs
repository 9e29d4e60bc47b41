use std::fmt;

use async_trait::async_trait;

use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::ExternalIdentity;

/// The provider's authorization and token endpoints.
#[async_trait]
pub trait AuthorizationClient: Send + Sync + fmt::Debug {
    /// Provider name stored alongside the subject, e.g. `"google"`
    fn provider(&self) -> &str;

    /// URL the browser is redirected to, carrying client id, redirect URL, scopes and `state`.
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String, OAuth2Error>;
}

/// Resolves an access token into the provider's identity claims.
#[async_trait]
pub trait IdentityResolver: Send + Sync + fmt::Debug {
    async fn resolve(&self, access_token: &str) -> Result<ExternalIdentity, OAuth2Error>;
}
