//! Usage: OAuth authorization-code flow (authorize URL, token exchange, redirect handoff).

pub(crate) mod authorize;
pub mod flow;
pub(super) mod handlers;
pub mod providers;
pub mod token_exchange;
