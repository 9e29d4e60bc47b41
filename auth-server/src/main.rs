use std::sync::Arc;

use axum::{Router, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use onehub_auth_axum::{AuthConfig, AuthFlowController, init_user_store, mount_auth_router};

mod handlers;
mod server;

use crate::{handlers::health, server::serve};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}=debug,onehub_auth=debug,tower_http=info",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AuthConfig::from_env();
    config.warn_on_insecure_defaults();
    tracing::debug!(?config, "Loaded configuration");

    // An unreachable store is fatal at startup
    let users = init_user_store(&config).await?;
    let controller = Arc::new(AuthFlowController::new(&config, users)?);

    let app = Router::new().route("/health", get(health));
    let app = mount_auth_router(app, &config.route_prefix, controller);

    serve(config.port, app).await?;
    Ok(())
}
