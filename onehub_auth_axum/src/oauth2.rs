use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::Redirect,
    routing::get,
};

use onehub_auth::{AuthFlowController, AuthResponse};

use super::error::IntoResponseError;

pub(super) fn router() -> Router<Arc<AuthFlowController>> {
    Router::new()
        .route("/login/google", get(google_login))
        .route("/callback/google", get(google_callback))
}

async fn google_login(
    State(controller): State<Arc<AuthFlowController>>,
) -> Result<(HeaderMap, Redirect), (StatusCode, String)> {
    let (auth_url, headers) = controller.begin_login().into_response_error()?;
    Ok((headers, Redirect::temporary(&auth_url)))
}

async fn google_callback(
    State(controller): State<Arc<AuthFlowController>>,
    Query(query): Query<AuthResponse>,
    headers: HeaderMap,
) -> Result<(HeaderMap, Redirect), (StatusCode, String)> {
    let (headers, landing_url) = controller
        .complete_login(&query, &headers)
        .await
        .into_response_error()?;

    Ok((headers, Redirect::temporary(&landing_url)))
}
