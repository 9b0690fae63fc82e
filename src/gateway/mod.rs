//! Usage: HTTP surface (router, OAuth flow, session guard, data proxies, dashboard pages).

mod guard;
mod listen;
pub mod oauth;
mod pages;
pub(crate) mod proxy;
mod routes;
mod server;

pub use routes::build_router;
pub use server::{run, serve};
