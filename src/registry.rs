use crate::battle::runner::{BattleRunner, BattleServices};
use crate::battle::scheduler::{spawn_room_loop, SchedulePolicy};
use crate::battle::state::BattleState;
use crate::errors::{ArenaError, ArenaResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{error, info, warn};

/// A room's runner and a handle on the task driving it.
struct Room {
    runner: Arc<BattleRunner>,
    task: AbortHandle,
}

impl Room {
    fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Every room, keyed by room id. Shared as `Arc<RoomRegistry>`.
///
/// A room whose loop has stopped stays registered but is no longer served:
/// lookups skip it, so it takes no wagers and shows no frozen snapshot.
pub struct RoomRegistry {
    rooms: DashMap<String, Room>,
    services: BattleServices,
    policy: SchedulePolicy,
}

/// Log how a room's loop ended.
async fn watch_room(room_id: String, task: JoinHandle<()>) {
    match task.await {
        Ok(()) => warn!(room_id, "Room loop exited"),
        Err(err) if err.is_cancelled() => info!(room_id, "Room loop cancelled"),
        Err(err) => error!(room_id, error = %err, "Room loop panicked, room withdrawn"),
    }
}

impl RoomRegistry {
    pub fn new(services: BattleServices, policy: SchedulePolicy) -> Self {
        Self {
            rooms: DashMap::new(),
            services,
            policy,
        }
    }

    /// Return the room's runner, creating and scheduling it on first use.
    /// A room whose loop has stopped is reported as `RoomStopped`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn get_or_create(&self, room_id: &str) -> ArenaResult<Arc<BattleRunner>> {
        match self.rooms.entry(room_id.to_string()) {
            Entry::Occupied(entry) if entry.get().is_running() => Ok(entry.get().runner.clone()),
            Entry::Occupied(_) => Err(ArenaError::RoomStopped(room_id.to_string())),
            Entry::Vacant(entry) => {
                let runner = Arc::new(BattleRunner::new(room_id, self.services.clone())?);
                let task = spawn_room_loop(runner.clone(), self.policy);
                entry.insert(Room {
                    runner: runner.clone(),
                    task: task.abort_handle(),
                });
                tokio::spawn(watch_room(room_id.to_string(), task));
                info!(room_id, "Room created");
                Ok(runner)
            }
        }
    }

    /// The runner of a room whose loop is still running.
    pub fn get(&self, room_id: &str) -> Option<Arc<BattleRunner>> {
        self.rooms
            .get(room_id)
            .filter(|room| room.is_running())
            .map(|room| room.runner.clone())
    }

    pub fn contains(&self, room_id: &str) -> bool {
        self.get(room_id).is_some()
    }

    pub async fn snapshot(&self, room_id: &str) -> Option<BattleState> {
        let runner = self.get(room_id)?;
        Some(runner.snapshot().await)
    }

    /// Ids of running rooms in sorted order.
    pub fn room_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .rooms
            .iter()
            .filter(|entry| entry.value().is_running())
            .map(|entry| entry.key().clone())
            .collect();
        ids.sort();
        ids
    }

    /// Number of running rooms.
    pub fn len(&self) -> usize {
        self.rooms.iter().filter(|entry| entry.value().is_running()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
