//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: Signing secret provisioning, user token issuing
//! - **DocumentService**: Message/character write pipeline and history
//! - **RoomService**: Room creation, slug resolution, snapshots
//! - **export**: JSON block and text transcript renderings

pub mod auth_service;
pub mod document_service;
pub mod export_service;
pub mod room_service;

pub use auth_service::{
    AuthError, AuthService, AuthServiceImpl, Claims, IssuedUser, ProvisioningError, SecretProvisioner,
};
pub use document_service::{DocumentService, RoomGuard, RoomLocks};
pub use export_service::{export_json, export_txt};
pub use room_service::RoomService;
