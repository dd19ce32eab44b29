use crate::battle::runner::{BattleRunner, TurnOutcome};
use crate::battle::state::GamePhase;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

pub const DEFAULT_TURN_DELAY: Duration = Duration::from_secs(12);
pub const DEFAULT_RESTART_COOLDOWN: Duration = Duration::from_secs(60);

/// Timing of a room's loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePolicy {
    /// Wait before every tick.
    pub turn_delay: Duration,
    /// Wait between a finished battle and the next one.
    pub restart_cooldown: Duration,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            turn_delay: DEFAULT_TURN_DELAY,
            restart_cooldown: DEFAULT_RESTART_COOLDOWN,
        }
    }
}

/// Drive a room on its own task until the process exits.
pub fn spawn_room_loop(runner: Arc<BattleRunner>, policy: SchedulePolicy) -> JoinHandle<()> {
    tokio::spawn(run_room_loop(runner, policy))
}

/// Start the battle, tick it every `turn_delay`, and after it finishes wait the
/// cooldown, reset and start again.
#[instrument(skip_all, fields(room_id = %runner.room_id()))]
pub async fn run_room_loop(runner: Arc<BattleRunner>, policy: SchedulePolicy) {
    runner.start().await;

    loop {
        tokio::time::sleep(policy.turn_delay).await;

        let finished = match runner.execute_turn().await {
            TurnOutcome::Finished { .. } => true,
            // Someone else may have finished the battle between ticks
            TurnOutcome::Idle => runner.phase().await == GamePhase::Finished,
            TurnOutcome::Substituted | TurnOutcome::Continued => false,
        };
        if !finished {
            continue;
        }

        info!(cooldown_ms = policy.restart_cooldown.as_millis() as u64, "Waiting for next battle");
        tokio::time::sleep(policy.restart_cooldown).await;

        match runner.reset().await {
            Ok(()) => {
                runner.start().await;
            }
            Err(err) => error!(error = %err, "Could not build the next battle, retrying after cooldown"),
        }
    }
}
