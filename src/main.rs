use anyhow::Context;
use battle_arena::battle::selector::MoveSelector;
use battle_arena::config::{ArenaConfig, OracleMode};
use battle_arena::species::{all_species, SpeciesSummary};
use battle_arena::wagers::{InMemoryUserDirectory, InMemoryWagerStore, WagerService};
use battle_arena::{
    Arena, BattleServices, ChannelSink, LedgerRail, MoveOracle, OfflineOracle, RoomRegistry,
    ScoringOracle, SettlementEngine,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "battle_arena=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ArenaConfig::from_env();
    tracing::info!(?config, "Starting battle arena");
    for species in all_species() {
        tracing::debug!("\n{}", SpeciesSummary(species));
    }

    let oracle: Arc<dyn MoveOracle> = match config.oracle {
        OracleMode::Scoring => Arc::new(ScoringOracle::new()),
        OracleMode::Offline => Arc::new(OfflineOracle),
    };
    let sink = Arc::new(ChannelSink::new(config.broadcast_capacity));
    let store = Arc::new(InMemoryWagerStore::new());
    let rail = Arc::new(LedgerRail::new());
    let users = Arc::new(InMemoryUserDirectory::new());

    let services = BattleServices {
        selector: Arc::new(MoveSelector::new(oracle, config.oracle_timeout)),
        settlement: Arc::new(SettlementEngine::new(store.clone(), rail.clone())),
        sink: sink.clone(),
        team_size: config.team_size,
    };
    let rooms = Arc::new(RoomRegistry::new(services, config.schedule_policy()));
    let arena = Arena::new(rooms, WagerService::new(store, users, rail));

    for room_id in &config.rooms {
        arena
            .open_room(room_id)
            .await
            .with_context(|| format!("opening room {}", room_id))?;
    }

    // Console observer: narrate the newest line of every update
    let mut updates = sink.subscribe();
    tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(update) => {
                    let line = update.payload["state"]["log"]
                        .as_array()
                        .and_then(|log| log.last())
                        .and_then(|line| line.as_str())
                        .unwrap_or_default()
                        .to_string();
                    tracing::info!(topic = %update.topic, "{}", line);
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Observer lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    tracing::info!(rooms = ?arena.rooms().room_ids(), "Shutting down");
    Ok(())
}
