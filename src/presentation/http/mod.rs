//! HTTP Surface
//!
//! Routers for the client and administrative listeners.

pub mod handlers;
pub mod routes;

pub use routes::{create_admin_router, create_router};
