mod cookie;
mod token;

pub(crate) use cookie::set_session_cookie;
pub use token::SessionTokenIssuer;
