//! Fire-and-forget publication of battle snapshots to observers.

use crate::battle::state::BattleState;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tracing::{trace, warn};

pub const DEFAULT_BROADCAST_CAPACITY: usize = 1024;

/// A message as observers receive it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomUpdate {
    pub topic: String,
    pub payload: Value,
}

#[cfg_attr(test, mockall::automock)]
pub trait BroadcastSink: Send + Sync {
    /// Never blocks and never fails the caller; undeliverable messages are dropped.
    fn publish(&self, topic: &str, payload: Value);
}

pub fn room_topic(room_id: &str) -> String {
    format!("room:{}", room_id)
}

pub fn battle_update(state: &BattleState) -> serde_json::Result<Value> {
    Ok(json!({
        "type": "battle_update",
        "state": serde_json::to_value(state)?,
    }))
}

/// Publish a snapshot of `state` on its room topic.
pub fn publish_state(sink: &dyn BroadcastSink, state: &BattleState) {
    match battle_update(state) {
        Ok(payload) => sink.publish(&room_topic(&state.id), payload),
        Err(err) => warn!(room_id = %state.id, error = %err, "Could not serialize battle snapshot"),
    }
}

/// Sink backed by a tokio broadcast channel. Transports subscribe and forward.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: broadcast::Sender<RoomUpdate>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RoomUpdate> {
        self.sender.subscribe()
    }
}

impl Default for ChannelSink {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}

impl BroadcastSink for ChannelSink {
    fn publish(&self, topic: &str, payload: Value) {
        let update = RoomUpdate {
            topic: topic.to_string(),
            payload,
        };
        // No subscribers is not an error
        if self.sender.send(update).is_err() {
            trace!(topic, "No subscribers for update");
        }
    }
}
