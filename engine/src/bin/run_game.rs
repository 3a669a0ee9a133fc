use std::sync::Arc;

use clap::Parser;
use engine::{EngineConfig, GameEngine};
use storage::{SqliteStore, StoreConfig};
use types::{GameRef, GameSnapshot, Phase, Role};

/// Drives one scripted game end to end: villagers pile their votes on a
/// werewolf every day, the wolves eat a villager every night.
#[derive(Parser, Debug)]
struct Params {
    /// Seats around the table, host included
    #[arg(short, long, default_value_t = 7)]
    players: usize,

    /// SQLite database file; runs in memory when omitted
    #[arg(short, long)]
    database: Option<String>,

    /// YAML engine config file
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

const HOST: &str = "host-token";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Params::parse();
    log::info!("args: {args:?}");

    let store = SqliteStore::open(&StoreConfig::from_cli_or_env(args.database.clone())).await?;
    let config = EngineConfig::from_cli_or_env(args.config.as_deref())?;
    let engine = GameEngine::new(Arc::new(store), config);

    let (game, _host) = engine.create_game("Host", HOST).await?;
    let game_ref = GameRef::Id(game.id);
    for i in 1..args.players {
        engine
            .join_game(&game.code, &format!("Player {i}"), &format!("token-{i}"))
            .await?;
    }
    engine.assign_roles(&game_ref, HOST).await?;

    loop {
        let snapshot = engine.fetch_snapshot(&game.code).await?;
        match snapshot.game.phase {
            Phase::Lobby => {
                engine.advance_phase(&game_ref, HOST).await?;
            }
            phase @ (Phase::NightWolf | Phase::NightPolice | Phase::NightDoctor) => {
                engine.advance_phase(&game_ref, HOST).await?;
                night_action(&engine, &game_ref, &snapshot, phase).await?;
                engine.advance_phase(&game_ref, HOST).await?;
            }
            Phase::Reveal => {
                engine.reveal_death(&game_ref, HOST).await?;
                let after = engine.fetch_snapshot(&game.code).await?;
                if after.game.phase == Phase::Reveal {
                    engine.begin_voting(&game_ref, HOST).await?;
                }
            }
            Phase::DayVote => {
                engine.final_vote(&game_ref, HOST).await?;
            }
            Phase::DayFinalVote => {
                final_vote_against_a_wolf(&engine, &game_ref, &snapshot).await?;
            }
            Phase::Ended => {
                match snapshot.game.win_state {
                    Some(win) => log::info!(
                        "game over after {} day(s): the {win} win",
                        snapshot.game.day_count
                    ),
                    None => log::info!("game over without a verdict"),
                }
                engine.end_game(&game_ref, HOST).await?;
                break;
            }
        }
    }
    Ok(())
}

async fn night_action(
    engine: &GameEngine,
    game_ref: &GameRef,
    snapshot: &GameSnapshot,
    phase: Phase,
) -> Result<(), Box<dyn std::error::Error>> {
    match phase {
        Phase::NightWolf => {
            if let Some(wolf) = snapshot
                .players
                .iter()
                .find(|p| p.alive && p.has_role(Role::Werewolf))
            {
                let victim = snapshot
                    .alive_non_host()
                    .find(|p| !p.has_role(Role::Werewolf))
                    .expect("a running game always has a living non-wolf");
                engine
                    .wolf_select(game_ref, &wolf.client_identity, victim.id)
                    .await?;
            }
        }
        Phase::NightPolice => {
            if let Some(police) = snapshot
                .players
                .iter()
                .find(|p| p.alive && p.has_role(Role::Police))
            {
                let suspect = snapshot
                    .alive_non_host()
                    .find(|p| p.id != police.id)
                    .expect("a running game always has another living player");
                let result = engine
                    .police_inspect(game_ref, &police.client_identity, suspect.id)
                    .await?;
                log::info!("the police learn: {} is {result}", suspect.name);
            }
        }
        Phase::NightDoctor => {
            if let Some(doctor) = snapshot
                .players
                .iter()
                .find(|p| p.alive && p.has_role(Role::Doctor))
            {
                engine
                    .doctor_save(game_ref, &doctor.client_identity, doctor.id)
                    .await?;
            }
        }
        _ => {}
    }
    Ok(())
}

async fn final_vote_against_a_wolf(
    engine: &GameEngine,
    game_ref: &GameRef,
    snapshot: &GameSnapshot,
) -> Result<(), Box<dyn std::error::Error>> {
    let wolf = snapshot
        .alive_non_host()
        .find(|p| p.has_role(Role::Werewolf))
        .expect("no living wolves means the game is already over");
    let fallback = snapshot
        .alive_non_host()
        .find(|p| !p.has_role(Role::Werewolf))
        .expect("a running game always has a living non-wolf");

    let voters: Vec<_> = snapshot.alive_non_host().cloned().collect();
    for voter in &voters {
        let target = if voter.has_role(Role::Werewolf) {
            fallback.id
        } else {
            wolf.id
        };
        engine
            .cast_vote(game_ref, &voter.client_identity, target)
            .await?;
    }
    engine.eliminate_player(game_ref, HOST).await?;
    Ok(())
}
