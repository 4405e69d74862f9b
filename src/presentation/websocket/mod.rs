//! WebSocket Chat Stream
//!
//! Real-time room updates via WebSocket connections.

pub mod gateway;
pub mod handler;
pub mod messages;

pub use gateway::ChatHub;
pub use handler::ws_handler;
pub use messages::ChatStreamMessage;
