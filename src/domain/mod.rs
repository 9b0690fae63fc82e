//! Usage: Domain modules (session model, session guard, dashboard summary).

pub mod dashboard;
pub mod session;
pub mod session_guard;
