//! In-process mock OAuth2 provider
//!
//! Each test starts its own server on an ephemeral loopback port, so tests can run in
//! parallel without sharing codes or users.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde_json::{Value, json};

use onehub_auth::OAuth2Config;

pub const MOCK_CLIENT_ID: &str = "mock-client-id";
pub const MOCK_CLIENT_SECRET: &str = "mock-client-secret";
pub const MOCK_REDIRECT_URL: &str = "http://localhost:8080/api/auth/callback/google";

#[derive(Default)]
struct Inner {
    /// Userinfo handed out for the next authorization request
    next_userinfo: Option<Value>,
    /// authorization code -> access token
    codes: HashMap<String, String>,
    /// access token -> (status, userinfo body)
    userinfo: HashMap<String, (u16, Value)>,
    token_requests: Vec<HashMap<String, String>>,
    token_delay: Option<Duration>,
    issued: u64,
}

#[derive(Clone, Default)]
pub struct MockProviderState {
    inner: Arc<Mutex<Inner>>,
}

pub struct MockProvider {
    pub base_url: String,
    state: MockProviderState,
}

#[allow(dead_code)]
impl MockProvider {
    pub async fn start() -> Self {
        let state = MockProviderState::default();
        let app = Router::new()
            .route("/o/oauth2/auth", get(authorize))
            .route("/token", post(token))
            .route("/userinfo", get(userinfo))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock provider");
        let addr = listener.local_addr().expect("Mock provider has no address");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock provider stopped");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Provider configuration pointing every endpoint at this server
    pub fn oauth2_config(&self) -> OAuth2Config {
        OAuth2Config {
            provider: "google".to_string(),
            client_id: MOCK_CLIENT_ID.to_string(),
            client_secret: MOCK_CLIENT_SECRET.to_string(),
            redirect_url: MOCK_REDIRECT_URL.to_string(),
            auth_url: format!("{}/o/oauth2/auth", self.base_url),
            token_url: format!("{}/token", self.base_url),
            userinfo_url: format!("{}/userinfo", self.base_url),
            scopes: vec!["email".to_string(), "profile".to_string()],
            http_timeout: Duration::from_secs(5),
        }
    }

    /// Userinfo returned for the user who next passes through the authorization endpoint
    pub fn set_next_user(&self, userinfo: Value) {
        self.state.inner.lock().unwrap().next_userinfo = Some(userinfo);
    }

    /// Register a code directly, bypassing the authorization endpoint.
    pub fn register_code(&self, code: &str, access_token: &str, status: u16, userinfo: Value) {
        let mut inner = self.state.inner.lock().unwrap();
        inner
            .codes
            .insert(code.to_string(), access_token.to_string());
        inner
            .userinfo
            .insert(access_token.to_string(), (status, userinfo));
    }

    pub fn set_token_delay(&self, delay: Duration) {
        self.state.inner.lock().unwrap().token_delay = Some(delay);
    }

    pub fn token_requests(&self) -> Vec<HashMap<String, String>> {
        self.state.inner.lock().unwrap().token_requests.clone()
    }
}

/// Authorization endpoint: approve immediately and redirect back with a fresh code.
async fn authorize(
    State(state): State<MockProviderState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let (Some(redirect_uri), Some(client_state)) = (params.get("redirect_uri"), params.get("state"))
    else {
        return (StatusCode::BAD_REQUEST, "missing redirect_uri or state").into_response();
    };
    if params.get("client_id").map(String::as_str) != Some(MOCK_CLIENT_ID)
        || params.get("response_type").map(String::as_str) != Some("code")
    {
        return (StatusCode::BAD_REQUEST, "invalid client or response type").into_response();
    }

    let mut inner = state.inner.lock().unwrap();
    let Some(userinfo) = inner.next_userinfo.clone() else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "no user configured").into_response();
    };
    inner.issued += 1;
    let code = format!("code-{}", inner.issued);
    let access_token = format!("access-{}", inner.issued);
    inner.codes.insert(code.clone(), access_token.clone());
    inner.userinfo.insert(access_token, (200, userinfo));

    let mut target = url::Url::parse(redirect_uri).expect("redirect_uri should be a URL");
    target
        .query_pairs_mut()
        .append_pair("code", &code)
        .append_pair("state", client_state);
    Redirect::to(target.as_str()).into_response()
}

async fn token(
    State(state): State<MockProviderState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let delay = {
        let mut inner = state.inner.lock().unwrap();
        inner.token_requests.push(form.clone());
        inner.token_delay
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    if form.get("grant_type").map(String::as_str) != Some("authorization_code")
        || form.get("client_id").map(String::as_str) != Some(MOCK_CLIENT_ID)
        || form.get("client_secret").map(String::as_str) != Some(MOCK_CLIENT_SECRET)
    {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid_client"})),
        )
            .into_response();
    }

    let code = form.get("code").cloned().unwrap_or_default();
    // Codes are single use
    let access_token = state.inner.lock().unwrap().codes.remove(&code);
    match access_token {
        Some(access_token) => Json(json!({
            "access_token": access_token,
            "token_type": "Bearer",
            "expires_in": 3599,
            "scope": "email profile"
        }))
        .into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant"})),
        )
            .into_response(),
    }
}

async fn userinfo(State(state): State<MockProviderState>, headers: HeaderMap) -> Response {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();

    let entry = state.inner.lock().unwrap().userinfo.get(&token).cloned();
    match entry {
        Some((status, body)) => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(body),
        )
            .into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid_token"})),
        )
            .into_response(),
    }
}
