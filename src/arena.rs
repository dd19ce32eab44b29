//! The surface handed to the transport layer: wagers in, battle snapshots out.

use crate::battle::state::BattleState;
use crate::errors::{ArenaResult, WagerError, WagerResult};
use crate::player::Side;
use crate::registry::RoomRegistry;
use crate::wagers::WagerService;
use serde::{Serialize, Serializer};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Answer to a wager request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WagerDecision {
    Accepted { wager_id: Uuid },
    Rejected { reason: String },
}

impl WagerDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, WagerDecision::Accepted { .. })
    }
}

impl From<WagerResult<Uuid>> for WagerDecision {
    fn from(result: WagerResult<Uuid>) -> Self {
        match result {
            Ok(wager_id) => WagerDecision::Accepted { wager_id },
            Err(err) => WagerDecision::Rejected {
                reason: err.to_string(),
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DecisionBody<'a> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    wager_id: Option<&'a Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

impl Serialize for WagerDecision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let body = match self {
            WagerDecision::Accepted { wager_id } => DecisionBody {
                success: true,
                wager_id: Some(wager_id),
                reason: None,
            },
            WagerDecision::Rejected { reason } => DecisionBody {
                success: false,
                wager_id: None,
                reason: Some(reason),
            },
        };
        body.serialize(serializer)
    }
}

pub struct Arena {
    rooms: Arc<RoomRegistry>,
    wagers: WagerService,
}

impl Arena {
    pub fn new(rooms: Arc<RoomRegistry>, wagers: WagerService) -> Self {
        Self { rooms, wagers }
    }

    pub fn rooms(&self) -> &Arc<RoomRegistry> {
        &self.rooms
    }

    /// Place a wager on a side of a live room. Rejections never store anything.
    pub async fn place_wager(
        &self,
        user_id: &str,
        room_id: &str,
        side: &str,
        amount: &str,
        tx_ref: &str,
    ) -> WagerDecision {
        let result = self.try_place_wager(user_id, room_id, side, amount, tx_ref).await;
        if let Err(err) = &result {
            warn!(user_id, room_id, tx_ref, error = %err, "Wager rejected");
        }
        result.into()
    }

    async fn try_place_wager(
        &self,
        user_id: &str,
        room_id: &str,
        side: &str,
        amount: &str,
        tx_ref: &str,
    ) -> WagerResult<Uuid> {
        let side = Side::parse(side).ok_or_else(|| WagerError::InvalidSide(side.to_string()))?;
        let runner = self
            .rooms
            .get(room_id)
            .ok_or_else(|| WagerError::UnknownRoom(room_id.to_string()))?;
        let ticket = self
            .wagers
            .check(user_id, room_id, side, amount, tx_ref)
            .await?;

        runner
            .with_open_battle(|battle_number| self.wagers.record(ticket, battle_number))
            .await
    }

    pub async fn get_battle_state(&self, room_id: &str) -> Option<BattleState> {
        self.rooms.snapshot(room_id).await
    }

    /// Return the room's current state, creating and scheduling the room if needed.
    pub async fn open_room(&self, room_id: &str) -> ArenaResult<BattleState> {
        let runner = self.rooms.get_or_create(room_id)?;
        Ok(runner.snapshot().await)
    }
}
