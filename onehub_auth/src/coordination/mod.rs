//! Login flow coordination
//!
//! Ties state handling, the provider collaborators, the user store and session
//! issuance into the two request handlers of the authorization-code login.

mod errors;
mod oauth2;

pub use errors::CoordinationError;
pub use oauth2::{AuthFlowController, FlowStage};
