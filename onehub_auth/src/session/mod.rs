mod errors;
mod main;
mod types;

pub use errors::SessionError;
pub use main::SessionTokenIssuer;
pub use types::SessionClaims;

pub(crate) use main::set_session_cookie;
