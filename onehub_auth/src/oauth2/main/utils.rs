use std::time::Duration;

use crate::oauth2::errors::OAuth2Error;

/// HTTP client for provider calls. `timeout` bounds each whole request, so an
/// unresponsive provider fails the call like any other transport error.
pub(super) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, OAuth2Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| OAuth2Error::Configuration(format!("failed to build HTTP client: {e}")))
}
