use types::{GameRef, InspectResult, Phase, Player, Role, RoundState};
use uuid::Uuid;

use crate::engine::GameEngine;
use crate::error::EngineError;
use crate::roster::{player_by_id, player_by_identity, require_host};

fn night_target<'a>(players: &'a [Player], target_id: Uuid) -> Result<&'a Player, EngineError> {
    let target = player_by_id(players, target_id)?;
    if target.is_host {
        return Err(EngineError::Validation(
            "the host cannot be targeted".to_string(),
        ));
    }
    if !target.alive {
        return Err(EngineError::Validation(format!(
            "{} is already dead",
            target.name
        )));
    }
    Ok(target)
}

fn acting_player<'a>(
    players: &'a [Player],
    client_identity: &str,
    role: Role,
) -> Result<&'a Player, EngineError> {
    let actor = player_by_identity(players, client_identity)?;
    if !actor.has_role(role) {
        return Err(EngineError::Forbidden(format!(
            "only the {role} may do this"
        )));
    }
    if !actor.alive {
        return Err(EngineError::Forbidden(
            "dead players cannot act".to_string(),
        ));
    }
    Ok(actor)
}

impl GameEngine {
    /// The werewolves choose tonight's victim. Re-choosing within the same
    /// phase overwrites; wolves never target the host or each other.
    pub async fn wolf_select(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
        target_player_id: Uuid,
    ) -> Result<(), EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let game = self.require_game(game_id).await?;
        if game.phase != Phase::NightWolf {
            return Err(EngineError::InvalidTransition(
                "it is not the werewolves' turn".to_string(),
            ));
        }
        let players = self.store().players_in_game(game.id).await?;
        acting_player(&players, client_identity, Role::Werewolf)?;

        let mut round = self
            .store()
            .round_state(game.id)
            .await?
            .unwrap_or_else(|| RoundState::new(game.id));
        if !round.phase_started {
            return Err(EngineError::InvalidTransition(
                "the werewolves have not been woken yet".to_string(),
            ));
        }

        let target = night_target(&players, target_player_id)?;
        if target.has_role(Role::Werewolf) {
            return Err(EngineError::Validation(
                "werewolves cannot turn on their own".to_string(),
            ));
        }

        round.wolf_target = Some(target.id);
        self.store().upsert_round_state(&round).await?;
        log::debug!("game {}: the wolves eye {}", game.code, target.name);
        Ok(())
    }

    /// The police inspect one player and learn whether they are a werewolf.
    pub async fn police_inspect(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
        target_player_id: Uuid,
    ) -> Result<InspectResult, EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let game = self.require_game(game_id).await?;
        if game.phase != Phase::NightPolice {
            return Err(EngineError::InvalidTransition(
                "it is not the police's turn".to_string(),
            ));
        }
        let players = self.store().players_in_game(game.id).await?;
        acting_player(&players, client_identity, Role::Police)?;

        let mut round = self
            .store()
            .round_state(game.id)
            .await?
            .unwrap_or_else(|| RoundState::new(game.id));
        if !round.phase_started {
            return Err(EngineError::InvalidTransition(
                "the police have not been woken yet".to_string(),
            ));
        }

        let target = night_target(&players, target_player_id)?;
        let result = if target.has_role(Role::Werewolf) {
            InspectResult::Werewolf
        } else {
            InspectResult::NotWerewolf
        };

        round.police_inspect_target = Some(target.id);
        round.police_inspect_result = Some(result);
        self.store().upsert_round_state(&round).await?;
        Ok(result)
    }

    /// The doctor shields one player for the night, themself included.
    pub async fn doctor_save(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
        target_player_id: Uuid,
    ) -> Result<(), EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let game = self.require_game(game_id).await?;
        if game.phase != Phase::NightDoctor {
            return Err(EngineError::InvalidTransition(
                "it is not the doctor's turn".to_string(),
            ));
        }
        let players = self.store().players_in_game(game.id).await?;
        acting_player(&players, client_identity, Role::Doctor)?;

        let mut round = self
            .store()
            .round_state(game.id)
            .await?
            .unwrap_or_else(|| RoundState::new(game.id));
        if !round.phase_started {
            return Err(EngineError::InvalidTransition(
                "the doctor has not been woken yet".to_string(),
            ));
        }

        let target = night_target(&players, target_player_id)?;
        round.doctor_save_target = Some(target.id);
        self.store().upsert_round_state(&round).await?;
        Ok(())
    }

    /// Applies the night: the wolves' victim dies unless the doctor picked
    /// the same player. Re-judges the roster immediately after. Returns the
    /// victim, if anyone died.
    pub async fn reveal_death(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
    ) -> Result<Option<Player>, EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let mut game = self.require_game(game_id).await?;
        let players = self.store().players_in_game(game.id).await?;
        require_host(&players, client_identity)?;
        if game.phase != Phase::Reveal {
            return Err(EngineError::InvalidTransition(
                "the night is not over yet".to_string(),
            ));
        }

        let mut round = self
            .store()
            .round_state(game.id)
            .await?
            .unwrap_or_else(|| RoundState::new(game.id));
        if round.phase_started {
            return Err(EngineError::InvalidTransition(
                "the night's outcome has already been revealed".to_string(),
            ));
        }

        let death = round
            .wolf_target
            .filter(|&victim| Some(victim) != round.doctor_save_target);
        round.resolved_death = death;
        round.phase_started = true;
        self.store().upsert_round_state(&round).await?;

        let mut roster = players;
        let mut victim = None;
        if let Some(victim_id) = death {
            if let Some(p) = roster.iter_mut().find(|p| p.id == victim_id && p.alive) {
                p.alive = false;
                self.store().update_player(p).await?;
                log::info!("game {}: {} did not survive the night", game.code, p.name);
                victim = Some(p.clone());
            }
        } else {
            log::info!("game {}: nobody died tonight", game.code);
        }

        self.settle_win(&mut game, &roster).await?;
        Ok(victim)
    }
}
