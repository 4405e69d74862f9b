//! Data Transfer Objects
//!
//! DTOs for API request/response serialization.

pub mod request;
pub mod response;

pub use request::{CreateRoomRequest, DownloadQuery};
pub use response::{RoomCreatedResponse, RoomSnapshotResponse, UserTokenResponse};
