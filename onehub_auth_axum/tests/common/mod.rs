#[path = "../../../onehub_auth/tests/common/mock_provider.rs"]
pub mod mock_provider;

use std::sync::Arc;

use axum::Router;
use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};

use mock_provider::MockProvider;
use onehub_auth_axum::{AuthConfig, AuthFlowController, init_user_store, mount_auth_router};

pub const TEST_SECRET: &str = "axum-integration-secret";

/// The auth router served on an ephemeral port, talking to its own mock provider
pub struct TestApp {
    pub base_url: String,
    pub config: AuthConfig,
    pub provider: MockProvider,
    pub controller: Arc<AuthFlowController>,
    /// Browser stand-in that never follows redirects
    pub client: reqwest::Client,
}

/// Response of a login initiation
pub struct LoginStart {
    pub location: String,
    pub state_cookie: String,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| None).await
    }

    /// Spawn with the login endpoints under `route_prefix`
    pub async fn spawn_with_prefix(route_prefix: &str) -> Self {
        let route_prefix = route_prefix.to_string();
        Self::spawn_with(move |key| (key == "AUTH_ROUTE_PREFIX").then(|| route_prefix.clone()))
            .await
    }

    /// Spawn with `overrides` consulted before the test defaults
    async fn spawn_with(overrides: impl Fn(&str) -> Option<String>) -> Self {
        let provider = MockProvider::start().await;

        let mut config = AuthConfig::from_lookup(|key| {
            overrides(key).or_else(|| match key {
                "JWT_SECRET" => Some(TEST_SECRET.to_string()),
                "DATABASE_URL" => Some("sqlite::memory:".to_string()),
                _ => None,
            })
        });
        config.oauth2 = provider.oauth2_config();

        let users = init_user_store(&config)
            .await
            .expect("Failed to initialize user store");
        let controller = Arc::new(
            AuthFlowController::new(&config, users).expect("Failed to build controller"),
        );

        let app = mount_auth_router(Router::new(), &config.route_prefix, controller.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test server");
        let addr = listener.local_addr().expect("Test server has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server stopped");
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build test client");

        Self {
            base_url: format!("http://{addr}"),
            config,
            provider,
            controller,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        let prefix = self.config.route_prefix.trim_end_matches('/');
        format!("{}{}{}", self.base_url, prefix, path)
    }

    pub async fn start_login(&self) -> LoginStart {
        let response = self
            .client
            .get(self.url("/login/google"))
            .send()
            .await
            .expect("login request failed");
        assert_eq!(response.status(), reqwest::StatusCode::TEMPORARY_REDIRECT);

        let location = response.headers()[LOCATION].to_str().unwrap().to_string();
        let state_cookie = set_cookies(&response)
            .into_iter()
            .find(|c| c.starts_with("oauthstate="))
            .expect("state cookie should be set");

        LoginStart {
            location,
            state_cookie,
        }
    }

    /// Visit the provider's authorization page and return the query string it
    /// sends the browser back with.
    pub async fn authorize(&self, login: &LoginStart) -> String {
        let response = self
            .client
            .get(&login.location)
            .send()
            .await
            .expect("authorization request failed");
        assert!(response.status().is_redirection());

        let callback = url::Url::parse(response.headers()[LOCATION].to_str().unwrap()).unwrap();
        callback.query().unwrap_or_default().to_string()
    }

    pub async fn callback(&self, query: &str, cookie: Option<&str>) -> reqwest::Response {
        let mut request = self
            .client
            .get(format!("{}?{}", self.url("/callback/google"), query));
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        request.send().await.expect("callback request failed")
    }

    /// Run a full login in the browser's shoes and return the callback response.
    pub async fn login(&self) -> reqwest::Response {
        let login = self.start_login().await;
        let query = self.authorize(&login).await;
        self.callback(&query, Some(&cookie_pair(&login.state_cookie)))
            .await
    }
}

pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// `name=value` part of a `Set-Cookie` header
pub fn cookie_pair(set_cookie: &str) -> String {
    set_cookie.split(';').next().unwrap_or_default().to_string()
}

#[allow(dead_code)]
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with("onehub_jwt="))
}
