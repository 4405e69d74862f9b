//! Repository Implementations
//!
//! SQLite implementations of domain repository traits.
//!
//! ## Available Repositories
//!
//! - **DocumentRepository** - Messages and characters with revision history
//! - **RoomRepository** - Rooms and their write/read slugs
//! - **SecretRepository** - Token signing secret
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use crate::infrastructure::database::Store;
//! use crate::infrastructure::repositories::{
//!     SqliteDocumentRepository, SqliteRoomRepository, SqliteSecretRepository,
//! };
//!
//! async fn setup_repositories(store: &Store) {
//!     let documents = SqliteDocumentRepository::new(store.pool().clone());
//!     let rooms = SqliteRoomRepository::new(store.pool().clone());
//!     let secrets = SqliteSecretRepository::new(store.pool().clone());
//! }
//! ```

pub mod document_repository;
pub mod room_repository;
pub mod secret_repository;

pub use document_repository::SqliteDocumentRepository;
pub use room_repository::SqliteRoomRepository;
pub use secret_repository::SqliteSecretRepository;
