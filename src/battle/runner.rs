use crate::battle::engine::{prepare_turn, resolve_turn, TurnResolution, TurnStart};
use crate::battle::selector::MoveSelector;
use crate::battle::state::{BattleEvent, BattleState, EventBus, GamePhase, TurnRng};
use crate::broadcast::{publish_state, BroadcastSink};
use crate::errors::CatalogResult;
use crate::player::Side;
use crate::pokemon::BattlePokemon;
use crate::settlement::SettlementEngine;
use crate::teams::create_random_battle;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};

/// Collaborators shared by every room.
#[derive(Clone)]
pub struct BattleServices {
    pub selector: Arc<MoveSelector>,
    pub settlement: Arc<SettlementEngine>,
    pub sink: Arc<dyn BroadcastSink>,
    pub team_size: usize,
}

/// What a call to `execute_turn` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The battle was not in its action phase; nothing changed.
    Idle,
    Substituted,
    Continued,
    Finished { winner: Side },
}

/// Work left to do after the opening step of a tick has been applied.
enum TickPlan {
    Done(TurnOutcome),
    Finish(Side),
    Attack {
        side_a: BattlePokemon,
        side_b: BattlePokemon,
        snapshot: BattleState,
    },
}

/// High-level battle management for one room.
///
/// The state sits behind an async `RwLock` so observers can snapshot it while the
/// oracle is being consulted. Only the room's scheduler drives turns.
pub struct BattleRunner {
    room_id: String,
    state: RwLock<BattleState>,
    rng: Mutex<TurnRng>,
    services: BattleServices,
}

impl BattleRunner {
    /// Create a runner with two fresh random teams, waiting to start.
    pub fn new(room_id: &str, services: BattleServices) -> CatalogResult<Self> {
        let mut rng = TurnRng::new_random();
        let state = create_random_battle(room_id, 1, services.team_size, &mut rng)?;
        Ok(Self::with_state(state, rng, services))
    }

    pub fn with_state(state: BattleState, rng: TurnRng, services: BattleServices) -> Self {
        Self {
            room_id: state.id.clone(),
            state: RwLock::new(state),
            rng: Mutex::new(rng),
            services,
        }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub async fn snapshot(&self) -> BattleState {
        self.state.read().await.clone()
    }

    pub async fn phase(&self) -> GamePhase {
        self.state.read().await.phase
    }

    pub async fn winner(&self) -> Option<Side> {
        self.state.read().await.winner
    }

    /// Run `place` with the number of the battle a new wager belongs to.
    ///
    /// The state stays read-locked until `place` completes, so the battle cannot
    /// finish in between. A finished battle has already been settled, so wagers
    /// placed during the cooldown go to the next battle.
    pub async fn with_open_battle<F, Fut, T>(&self, place: F) -> T
    where
        F: FnOnce(u32) -> Fut,
        Fut: Future<Output = T>,
    {
        let state = self.state.read().await;
        let battle_number = match state.phase {
            GamePhase::Finished => state.battle_number + 1,
            GamePhase::Waiting | GamePhase::Action => state.battle_number,
        };
        let result = place(battle_number).await;
        drop(state);
        result
    }

    /// Move a waiting battle into its action phase. Returns false in any other phase.
    pub async fn start(&self) -> bool {
        let mut state = self.state.write().await;
        if state.phase != GamePhase::Waiting {
            return false;
        }

        state.phase = GamePhase::Action;
        if state.log.is_empty() {
            let mut bus = EventBus::new();
            bus.push(BattleEvent::BattleStarted);
            state.record(&bus);
        }
        info!(room_id = %self.room_id, battle_number = state.battle_number, "Battle started");
        publish_state(self.services.sink.as_ref(), &state);
        true
    }

    /// Run one tick: substitution, move selection, resolution, publication.
    pub async fn execute_turn(&self) -> TurnOutcome {
        let mut rng = self.rng.lock().await;

        let plan = {
            let mut state = self.state.write().await;
            let mut bus = EventBus::new();
            let start = prepare_turn(&mut state, &mut bus);
            state.record(&bus);
            self.plan_tick(&state, start)
        };

        let (side_a, side_b, snapshot) = match plan {
            TickPlan::Done(outcome) => return outcome,
            TickPlan::Finish(winner) => return self.finish_outcome(winner).await,
            TickPlan::Attack {
                side_a,
                side_b,
                snapshot,
            } => (side_a, side_b, snapshot),
        };

        // The lock is released while the oracle thinks
        let [choice_a, choice_b] = self
            .services
            .selector
            .select_pair(&side_a, &side_b, &snapshot, &mut rng)
            .await;

        let resolution = {
            let mut state = self.state.write().await;
            if state.phase != GamePhase::Action {
                return TurnOutcome::Idle;
            }

            let mut bus = EventBus::new();
            let resolution = resolve_turn(
                &mut state,
                [choice_a.move_data, choice_b.move_data],
                &mut rng,
                &mut bus,
            );
            state.record(&bus);
            debug!(room_id = %self.room_id, turn = state.turn, events = bus.len(), "Turn resolved");

            if resolution == TurnResolution::Continued {
                publish_state(self.services.sink.as_ref(), &state);
            }
            resolution
        };

        match resolution {
            TurnResolution::Continued => TurnOutcome::Continued,
            TurnResolution::Ended { winner } => self.finish_outcome(winner).await,
        }
    }

    fn plan_tick(&self, state: &BattleState, start: TurnStart) -> TickPlan {
        match start {
            TurnStart::Inactive => TickPlan::Done(TurnOutcome::Idle),
            TurnStart::Substituted => {
                debug!(room_id = %self.room_id, turn = state.turn, "Substitution tick");
                publish_state(self.services.sink.as_ref(), state);
                TickPlan::Done(TurnOutcome::Substituted)
            }
            TurnStart::Eliminated { winner } => TickPlan::Finish(winner),
            TurnStart::Ready => {
                let side_a = state.player(Side::A).active_pokemon().cloned();
                let side_b = state.player(Side::B).active_pokemon().cloned();
                match (side_a, side_b) {
                    (Some(side_a), Some(side_b)) => TickPlan::Attack {
                        side_a,
                        side_b,
                        snapshot: state.clone(),
                    },
                    _ => {
                        error!(room_id = %self.room_id, "Ready tick without two active combatants");
                        TickPlan::Done(TurnOutcome::Idle)
                    }
                }
            }
        }
    }

    async fn finish_outcome(&self, winner: Side) -> TurnOutcome {
        if self.finish(winner).await {
            TurnOutcome::Finished { winner }
        } else {
            TurnOutcome::Idle
        }
    }

    /// Record the winner and settle the room's wagers.
    ///
    /// The transition to `Finished` happens under the state lock, so only the first
    /// caller settles. Later calls return false and change nothing.
    pub async fn finish(&self, winner: Side) -> bool {
        let battle_number = {
            let mut state = self.state.write().await;
            if state.phase == GamePhase::Finished {
                debug!(room_id = %self.room_id, "Battle already finished");
                return false;
            }

            state.phase = GamePhase::Finished;
            state.winner = Some(winner);
            let mut bus = EventBus::new();
            bus.push(BattleEvent::BattleEnded { winner });
            state.record(&bus);

            info!(room_id = %self.room_id, winner = %winner, turn = state.turn, "Battle finished");
            publish_state(self.services.sink.as_ref(), &state);
            state.battle_number
        };

        match self
            .services
            .settlement
            .settle(&self.room_id, battle_number, winner)
            .await
        {
            Ok(report) => info!(
                room_id = %self.room_id,
                battle_number,
                winners_paid = report.winners_paid,
                winners_failed = report.winners_failed,
                losers_marked = report.losers_marked,
                "Wagers settled"
            ),
            Err(err) => error!(room_id = %self.room_id, battle_number, error = %err, "Settlement failed"),
        }
        true
    }

    /// Replace the battle with a fresh one: new random teams, next battle number.
    pub async fn reset(&self) -> CatalogResult<()> {
        let mut rng = self.rng.lock().await;
        let mut state = self.state.write().await;

        let battle_number = state.battle_number + 1;
        let mut fresh = create_random_battle(
            &self.room_id,
            battle_number,
            self.services.team_size,
            &mut rng,
        )?;
        let mut bus = EventBus::new();
        bus.push(BattleEvent::NewBattleStarting);
        fresh.record(&bus);
        *state = fresh;

        info!(room_id = %self.room_id, battle_number, "Battle reset");
        publish_state(self.services.sink.as_ref(), &state);
        Ok(())
    }
}
