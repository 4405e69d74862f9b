//! Chat Hub
//!
//! Fans accepted documents out to every open chat stream of a room.

use dashmap::DashMap;
use tokio::sync::{broadcast, watch};

use super::messages::ChatStreamMessage;

/// Per-room broadcast capacity; slower streams skip ahead
const ROOM_CHANNEL_CAPACITY: usize = 256;

/// Room broadcast registry
pub struct ChatHub {
    rooms: DashMap<String, broadcast::Sender<ChatStreamMessage>>,
    closing: watch::Sender<bool>,
}

impl ChatHub {
    pub fn new() -> Self {
        let (closing, _) = watch::channel(false);
        Self { rooms: DashMap::new(), closing }
    }

    /// Receive every frame published to a room from now on.
    pub fn subscribe(&self, rpid: &str) -> broadcast::Receiver<ChatStreamMessage> {
        self.rooms
            .entry(rpid.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Send a frame to the room's open streams. Returns how many received it.
    pub fn publish(&self, rpid: &str, message: ChatStreamMessage) -> usize {
        let delivered = match self.rooms.get(rpid) {
            Some(tx) => tx.send(message).unwrap_or(0),
            None => 0,
        };
        if delivered == 0 {
            // Nobody listening; drop the channel until the next subscriber
            self.rooms.remove_if(rpid, |_, tx| tx.receiver_count() == 0);
        }
        delivered
    }

    /// Number of open streams across all rooms.
    pub fn stream_count(&self) -> usize {
        self.rooms.iter().map(|entry| entry.value().receiver_count()).sum()
    }

    /// Flips to `true` once [`ChatHub::close`] has been called.
    pub fn closing(&self) -> watch::Receiver<bool> {
        self.closing.subscribe()
    }

    /// Ask every open stream to close.
    pub fn close(&self) {
        self.closing.send_replace(true);
    }
}

impl Default for ChatHub {
    fn default() -> Self {
        Self::new()
    }
}
