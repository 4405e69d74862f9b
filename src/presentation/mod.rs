//! Presentation Layer
//!
//! HTTP routes, middleware and the live chat stream.

pub mod http;
pub mod websocket;
pub mod middleware;
