mod client;
mod google;
mod state;
mod utils;

pub use client::{AuthorizationClient, IdentityResolver};
pub use google::{GoogleAuthorizationClient, GoogleIdentityResolver};
pub use state::{LoginState, StateTokenIssuer};
