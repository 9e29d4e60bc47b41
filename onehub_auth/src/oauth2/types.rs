use serde::{Deserialize, Serialize};

use super::errors::OAuth2Error;
use crate::userdb::UserProfile;

/// Query parameters of the provider's redirect back to the callback endpoint
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub state: String,
    /// Set by the provider instead of `code` when the user denied consent or the request was invalid
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub(super) access_token: String,
    #[serde(default)]
    pub(super) token_type: Option<String>,
    #[serde(default)]
    pub(super) expires_in: Option<u64>,
    #[serde(default)]
    pub(super) scope: Option<String>,
}

/// Subject identifiers arrive as strings from Google and OIDC, as numbers from some providers
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(super) enum SubjectId {
    Text(String),
    Number(u64),
}

impl SubjectId {
    fn into_string(self) -> String {
        match self {
            SubjectId::Text(s) => s,
            SubjectId::Number(n) => n.to_string(),
        }
    }
}

/// Raw userinfo payload. Unknown fields are ignored.
///
/// Google's v2 endpoint sends `id`, OIDC endpoints send `sub`, and some send both.
#[derive(Debug, Clone, Deserialize)]
pub(super) struct UserInfoResponse {
    #[serde(default)]
    pub(super) id: Option<SubjectId>,
    #[serde(default)]
    pub(super) sub: Option<SubjectId>,
    #[serde(default)]
    pub(super) email: Option<String>,
    #[serde(default)]
    pub(super) name: Option<String>,
    #[serde(default)]
    pub(super) picture: Option<String>,
}

/// Normalized identity claims returned by an [`IdentityResolver`](super::IdentityResolver)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIdentity {
    pub provider: String,
    pub subject: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl ExternalIdentity {
    pub(super) fn from_userinfo(
        provider: &str,
        userinfo: UserInfoResponse,
    ) -> Result<Self, OAuth2Error> {
        let subject = [userinfo.id, userinfo.sub]
            .into_iter()
            .flatten()
            .map(SubjectId::into_string)
            .find(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                OAuth2Error::MalformedIdentity("userinfo response has no subject id".to_string())
            })?;

        let email = userinfo
            .email
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                OAuth2Error::MalformedIdentity("userinfo response has no email".to_string())
            })?;

        Ok(Self {
            provider: provider.to_string(),
            subject,
            email,
            name: userinfo.name.filter(|s| !s.is_empty()),
            avatar_url: userinfo.picture.filter(|s| !s.is_empty()),
        })
    }
}

impl From<ExternalIdentity> for UserProfile {
    fn from(identity: ExternalIdentity) -> Self {
        let mut profile = UserProfile::new(identity.provider, identity.subject, identity.email);
        if let Some(name) = identity.name {
            profile = profile.with_name(name);
        }
        if let Some(avatar_url) = identity.avatar_url {
            profile = profile.with_avatar_url(avatar_url);
        }
        profile
    }
}
