use crate::room::{Room, RoomCommand};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use huddle_core::RoomId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

/// One room actor per room name, created on first use.
#[derive(Clone)]
pub struct RoomManager {
    rooms: Arc<DashMap<RoomId, mpsc::Sender<RoomCommand>>>,
    signaling: Arc<dyn SignalingOutput>,
}

impl RoomManager {
    pub fn new(signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            signaling,
        }
    }

    pub fn get_room_sender(&self, room_id: &RoomId) -> mpsc::Sender<RoomCommand> {
        self.rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                info!("Creating new room: {}", room_id);
                let (tx, rx) = mpsc::channel(100);
                let room = Room::new(room_id.clone(), rx, self.signaling.clone());
                tokio::spawn(room.run());
                tx
            })
            .clone()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
