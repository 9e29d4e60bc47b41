//! Axum handlers for the onehub-auth login flow

mod error;
mod oauth2;
mod router;

pub use router::{auth_router, auth_router_no_trace, mount_auth_router};

// Re-export the core so binaries depend on a single crate
pub use onehub_auth::{
    AuthConfig, AuthFlowController, CoordinationError, SessionClaims, SessionTokenIssuer,
    UserStore, init_user_store,
};
