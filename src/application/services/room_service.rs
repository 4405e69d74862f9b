//! Room Service
//!
//! Room creation, slug resolution and whole-room snapshots.

use std::sync::Arc;

use rand::distr::{Alphanumeric, SampleString};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::{CreateRoomRequest, RoomCreatedResponse};
use crate::domain::{DocumentRepository, Room, RoomInfo, RoomRepository, SlugInfo};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;

/// Length of generated room slugs.
pub const SLUG_LEN: usize = 20;

fn generate_slug() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), SLUG_LEN)
}

pub struct RoomService {
    rooms: Arc<dyn RoomRepository>,
    documents: Arc<dyn DocumentRepository>,
}

impl RoomService {
    pub fn new(rooms: Arc<dyn RoomRepository>, documents: Arc<dyn DocumentRepository>) -> Self {
        Self { rooms, documents }
    }

    /// Create a room with fresh write and read slugs.
    pub async fn create_room(&self, request: CreateRoomRequest) -> Result<RoomCreatedResponse, AppError> {
        request.validate().map_err(validation_error)?;

        let rpid = Uuid::now_v7().simple().to_string();
        let rp_code = generate_slug();
        let info = RoomInfo {
            title: request.title,
            desc: request.desc.filter(|d| !d.is_empty()),
            read_code: generate_slug(),
        };

        self.rooms.create(&rpid, &info, &rp_code).await?;

        tracing::info!(rpid = %rpid, title = %info.title, "Room created");
        Ok(RoomCreatedResponse { rp_code, read_code: info.read_code })
    }

    /// Resolve a slug or fail with NotFound.
    pub async fn resolve(&self, slug: &str) -> Result<SlugInfo, AppError> {
        self.rooms
            .find_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("room {}", slug)))
    }

    /// Resolve a slug that must grant write access.
    pub async fn resolve_writable(&self, slug: &str) -> Result<SlugInfo, AppError> {
        let info = self.resolve(slug).await?;
        if !info.can_write() {
            return Err(AppError::Forbidden("this room link is read-only".into()));
        }
        Ok(info)
    }

    /// Current state of a room.
    pub async fn snapshot(&self, rpid: &str) -> Result<Room, AppError> {
        let info = self
            .rooms
            .get_info(rpid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("room {}", rpid)))?;
        let msgs = self.documents.list_messages(rpid).await?;
        let charas = self.documents.list_characters(rpid).await?;

        Ok(Room { rpid: rpid.to_string(), info, msgs, charas })
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        self.rooms.count().await
    }
}
