//! Infrastructure Layer
//!
//! Contains implementations for external services including:
//! - The embedded SQLite document store
//! - Repository implementations over that store
//! - Prometheus metrics

pub mod database;
pub mod metrics;
pub mod repositories;
