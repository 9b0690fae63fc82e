//! Usage: Authenticated pass-through to the provider data API.

mod errors;
pub(super) mod handlers;
pub(crate) mod strava;
