//! Router for the login endpoints

use std::sync::Arc;

use axum::Router;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use onehub_auth::AuthFlowController;

/// Create the router for the login endpoints
///
/// Mount it under the route prefix the reverse proxy forwards, e.g. `/api/auth`:
/// - `GET {prefix}/login/google` starts a login
/// - `GET {prefix}/callback/google` receives the provider's redirect
///
/// Request headers are not recorded in spans since they carry the session and state cookies.
pub fn auth_router(controller: Arc<AuthFlowController>) -> Router {
    auth_router_no_trace(controller).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Mount [`auth_router`] on `app` under `route_prefix`.
///
/// Trailing slashes are ignored, and an empty or `/` prefix serves the login
/// endpoints at the root.
pub fn mount_auth_router(
    app: Router,
    route_prefix: &str,
    controller: Arc<AuthFlowController>,
) -> Router {
    match normalize_prefix(route_prefix) {
        Some(prefix) => app.nest(&prefix, auth_router(controller)),
        None => app.merge(auth_router(controller)),
    }
}

fn normalize_prefix(route_prefix: &str) -> Option<String> {
    let trimmed = route_prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{trimmed}"))
    }
}

/// Same as [`auth_router`] without the HTTP tracing middleware.
pub fn auth_router_no_trace(controller: Arc<AuthFlowController>) -> Router {
    super::oauth2::router().with_state(controller)
}
