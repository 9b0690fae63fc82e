//! Usage: Process wiring (shared state, logging).

pub(crate) mod app_state;
pub mod logging;
