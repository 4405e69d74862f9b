//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod document;
pub mod export;
pub mod health;
pub mod room;
pub mod user;
