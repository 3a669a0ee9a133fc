use types::{GameRef, Phase, Role, RoundState};

use crate::engine::GameEngine;
use crate::error::EngineError;
use crate::roster::{non_host_count, require_host};

pub(crate) fn night_role(phase: Phase) -> Option<Role> {
    match phase {
        Phase::NightWolf => Some(Role::Werewolf),
        Phase::NightPolice => Some(Role::Police),
        Phase::NightDoctor => Some(Role::Doctor),
        _ => None,
    }
}

impl GameEngine {
    /// Host-driven phase advance. Leaving the lobby starts the first night.
    /// Night phases take two presses: the first wakes the acting role, the
    /// second moves on once that role's action is recorded (or the role has
    /// no living holder). Reveal and the day phases advance through their
    /// own commands instead.
    pub async fn advance_phase(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
    ) -> Result<Phase, EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let mut game = self.require_game(game_id).await?;
        let players = self.store().players_in_game(game.id).await?;
        require_host(&players, client_identity)?;

        match game.phase {
            Phase::Lobby => {
                let n = non_host_count(&players);
                if n < self.config().min_players || n > self.config().max_players {
                    return Err(EngineError::Capacity(format!(
                        "need between {} and {} players to start, have {n}",
                        self.config().min_players,
                        self.config().max_players
                    )));
                }
                if players.iter().any(|p| !p.is_host && p.role.is_none()) {
                    return Err(EngineError::InvalidTransition(
                        "the night cannot start before roles are dealt".to_string(),
                    ));
                }

                let mut round = self
                    .store()
                    .round_state(game.id)
                    .await?
                    .unwrap_or_else(|| RoundState::new(game.id));
                round.clear_night();
                self.store().upsert_round_state(&round).await?;

                game.phase = self.config().night_order.first();
                game.day_count = 1;
                self.persist_game(&mut game).await?;
                log::info!("game {}: night {} begins", game.code, game.day_count);
            }
            phase @ (Phase::NightWolf | Phase::NightPolice | Phase::NightDoctor) => {
                let mut round = self
                    .store()
                    .round_state(game.id)
                    .await?
                    .unwrap_or_else(|| RoundState::new(game.id));
                let role = night_role(phase).expect("night phase always has an acting role");

                if !round.phase_started {
                    round.phase_started = true;
                    self.store().upsert_round_state(&round).await?;
                    log::info!("game {}: the {role} wakes up", game.code);
                } else {
                    let acted = match phase {
                        Phase::NightWolf => round.wolf_target.is_some(),
                        Phase::NightPolice => round.police_inspect_target.is_some(),
                        _ => round.doctor_save_target.is_some(),
                    };
                    let role_alive = players.iter().any(|p| p.alive && p.has_role(role));
                    if !acted && role_alive {
                        return Err(EngineError::InvalidTransition(format!(
                            "the {role} has not chosen a target yet"
                        )));
                    }

                    round.phase_started = false;
                    self.store().upsert_round_state(&round).await?;
                    game.phase = self
                        .config()
                        .night_order
                        .after(phase)
                        .expect("night phase always has a successor");
                    self.persist_game(&mut game).await?;
                    log::info!("game {}: on to {}", game.code, game.phase);
                }
            }
            Phase::Reveal => {
                return Err(EngineError::InvalidTransition(
                    "the reveal ends through reveal_dead and begin_voting".to_string(),
                ))
            }
            Phase::DayVote => {
                return Err(EngineError::InvalidTransition(
                    "the open vote ends through final_vote".to_string(),
                ))
            }
            Phase::DayFinalVote => {
                return Err(EngineError::InvalidTransition(
                    "the final vote ends through eliminate_player".to_string(),
                ))
            }
            Phase::Ended => {
                return Err(EngineError::InvalidTransition(
                    "the game is over".to_string(),
                ))
            }
        }
        Ok(game.phase)
    }

    /// Reveal to open vote, once the night's outcome has been applied.
    pub async fn begin_voting(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
    ) -> Result<Phase, EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let mut game = self.require_game(game_id).await?;
        let players = self.store().players_in_game(game.id).await?;
        require_host(&players, client_identity)?;
        if game.phase != Phase::Reveal {
            return Err(EngineError::InvalidTransition(
                "voting begins from the reveal".to_string(),
            ));
        }

        let mut round = self
            .store()
            .round_state(game.id)
            .await?
            .unwrap_or_else(|| RoundState::new(game.id));
        if !round.phase_started {
            return Err(EngineError::InvalidTransition(
                "the night's outcome has not been revealed yet".to_string(),
            ));
        }
        round.phase_started = false;
        self.store().upsert_round_state(&round).await?;

        game.phase = Phase::DayVote;
        self.persist_game(&mut game).await?;
        log::info!("game {}: day {} voting opens", game.code, game.day_count);
        Ok(game.phase)
    }

    /// Locks the open vote; ballots cast from here on are the ones that
    /// decide the elimination.
    pub async fn final_vote(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
    ) -> Result<Phase, EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let mut game = self.require_game(game_id).await?;
        let players = self.store().players_in_game(game.id).await?;
        require_host(&players, client_identity)?;
        if game.phase != Phase::DayVote {
            return Err(EngineError::InvalidTransition(
                "the final vote starts from the open vote".to_string(),
            ));
        }

        game.phase = Phase::DayFinalVote;
        self.persist_game(&mut game).await?;
        log::info!("game {}: final vote", game.code);
        Ok(game.phase)
    }

    /// Host tears the game down; the row and all children disappear.
    pub async fn end_game(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
    ) -> Result<(), EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let guard = lock.lock().await;

        let game = self.require_game(game_id).await?;
        let players = self.store().players_in_game(game.id).await?;
        require_host(&players, client_identity)?;

        log::info!("game {} ended by the host", game.code);
        self.store().delete_game(game.id).await?;
        drop(guard);
        self.forget_lock(game_id);
        Ok(())
    }
}
