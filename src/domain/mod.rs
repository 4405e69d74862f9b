//! # Domain Layer
//!
//! The domain layer contains the document model of the role-play server:
//! typed documents, their validation rules and the relation checks between
//! them. It is independent of any external frameworks or infrastructure.
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Validation is pure; relation checks only read through repository traits
//! - Repository traits define data access contracts

pub mod entities;

// Re-export commonly used types
pub use entities::*;
