pub mod mock_provider;

use onehub_auth::AuthConfig;

/// Configuration with a test signing secret and provider endpoints on the mock server
#[allow(dead_code)]
pub fn test_config(provider: &mock_provider::MockProvider) -> AuthConfig {
    let mut config = AuthConfig::from_lookup(|key| match key {
        "JWT_SECRET" => Some("integration-test-secret".to_string()),
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        _ => None,
    });
    config.oauth2 = provider.oauth2_config();
    config
}
