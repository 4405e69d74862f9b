//! # RP Server Library
//!
//! This crate provides a collaborative role-play chat server with:
//! - Rooms holding an ordered transcript of typed messages and a set of characters
//! - Per-field validation and cross-document relation checks on every write
//! - RESTful HTTP API endpoints and a WebSocket chat stream
//! - JSON and plain text exports
//! - An embedded SQLite store
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Document model, validation rules and repository traits
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: SQLite store, repositories and metrics
//! - **Presentation Layer**: HTTP handlers and WebSocket chat stream
//!
//! ## Module Structure
//!
//! ```text
//! rp_server/
//! +-- config/         Configuration management
//! +-- domain/         Documents, rooms, validation and repository traits
//! +-- application/    Application services and DTOs
//! +-- infrastructure/ Store, repositories and metrics
//! +-- presentation/   HTTP routes and WebSocket handlers
//! +-- shared/         Common utilities (errors, text wrapping, fatal signal)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Server lifecycle and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
