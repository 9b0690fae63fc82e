//! Usage: Infrastructure adapters (settings, persisted session storage).

pub(crate) mod session_file;
pub mod settings;
