//! Signed, stateless session credentials
//!
//! A credential is an HS256 JWT whose subject is the local user id. Nothing about it is
//! stored server-side; any holder of the signing secret can verify it and it expires
//! purely by timestamp.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::config::SessionConfig;
use crate::session::errors::SessionError;
use crate::session::types::SessionClaims;

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Clone)]
pub struct SessionTokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    has_secret: bool,
    ttl: Duration,
}

impl fmt::Debug for SessionTokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokenIssuer")
            .field("algorithm", &SIGNING_ALGORITHM)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionTokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            has_secret: !secret.is_empty(),
            ttl,
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.signing_secret.as_bytes(), config.token_ttl)
    }

    /// Lifetime of every credential minted by this issuer
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a credential for `user_id`, valid from now for the configured lifetime.
    pub fn issue(&self, user_id: &str) -> Result<String, SessionError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Mint a credential as if issued at `now`. Identical inputs yield identical tokens.
    pub fn issue_at(&self, user_id: &str, now: DateTime<Utc>) -> Result<String, SessionError> {
        if !self.has_secret {
            return Err(SessionError::Signing(
                "Signing secret is not configured".to_string(),
            ));
        }

        let ttl_secs = i64::try_from(self.ttl.as_secs())
            .map_err(|_| SessionError::Signing("Token lifetime out of range".to_string()))?;
        let iat = now.timestamp();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat,
            exp: iat + ttl_secs,
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| SessionError::Signing(e.to_string()))
    }

    /// Check signature and expiry, returning the claims of a valid credential.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| SessionError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SECRET: &[u8] = b"test-signing-secret";
    const SEVENTY_TWO_HOURS: Duration = Duration::from_secs(72 * 60 * 60);

    #[test]
    fn test_issue_and_verify() {
        let issuer = SessionTokenIssuer::new(SECRET, SEVENTY_TWO_HOURS);
        let token = issuer.issue("user-1").expect("issue should succeed");

        let claims = issuer.verify(&token).expect("token should verify");
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.exp - claims.iat, 72 * 60 * 60);
    }

    #[test]
    fn test_expiry_is_issue_time_plus_lifetime() {
        let issuer = SessionTokenIssuer::new(SECRET, SEVENTY_TWO_HOURS);
        let now = Utc::now();
        let token = issuer.issue_at("user-1", now).unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, now.timestamp() + 259_200);
    }

    #[test]
    fn test_issue_is_deterministic() {
        let issuer = SessionTokenIssuer::new(SECRET, SEVENTY_TWO_HOURS);
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();

        let a = issuer.issue_at("user-1", now).unwrap();
        let b = issuer.issue_at("user-1", now).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_secret_fails_to_sign() {
        let issuer = SessionTokenIssuer::new(b"", SEVENTY_TWO_HOURS);
        match issuer.issue("user-1") {
            Err(SessionError::Signing(_)) => {}
            other => panic!("Expected Signing error, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = SessionTokenIssuer::new(SECRET, SEVENTY_TWO_HOURS);
        let other = SessionTokenIssuer::new(b"another-secret", SEVENTY_TWO_HOURS);
        let token = issuer.issue("user-1").unwrap();

        assert!(matches!(
            other.verify(&token),
            Err(SessionError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = SessionTokenIssuer::new(SECRET, Duration::from_secs(60));
        let issued = Utc::now() - chrono::Duration::hours(1);
        let token = issuer.issue_at("user-1", issued).unwrap();

        assert!(matches!(
            issuer.verify(&token),
            Err(SessionError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let issuer = SessionTokenIssuer::new(SECRET, SEVENTY_TWO_HOURS);
        let token = issuer.issue("user-1").unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = crate::utils::base64url_encode(
            format!(r#"{{"sub":"admin","iat":0,"exp":{}}}"#, i64::MAX / 2).into_bytes(),
        )
        .unwrap();
        parts[1] = &forged_payload;

        assert!(issuer.verify(&parts.join(".")).is_err());
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let issuer = SessionTokenIssuer::new(SECRET, SEVENTY_TWO_HOURS);
        let debug = format!("{issuer:?}");
        assert!(!debug.contains("test-signing-secret"));
    }
}
