mod errors;
mod main;
mod types;

pub use errors::OAuth2Error;
pub use main::{
    AuthorizationClient, GoogleAuthorizationClient, GoogleIdentityResolver, IdentityResolver,
    LoginState, StateTokenIssuer,
};
pub use types::{AuthResponse, ExternalIdentity};
