use types::{Game, GameRef, LeaveRequest, LeaveStatus, Phase, Player, Role, RoundState};
use uuid::Uuid;

use crate::config::RemovalPolicy;
use crate::engine::GameEngine;
use crate::error::EngineError;

pub(crate) fn host(players: &[Player]) -> Result<&Player, EngineError> {
    players
        .iter()
        .find(|p| p.is_host)
        .ok_or_else(|| EngineError::NotFound("the game has no host".to_string()))
}

pub(crate) fn require_host<'a>(
    players: &'a [Player],
    client_identity: &str,
) -> Result<&'a Player, EngineError> {
    let host = host(players)?;
    if host.client_identity != client_identity {
        return Err(EngineError::Forbidden(
            "only the host may do this".to_string(),
        ));
    }
    Ok(host)
}

pub(crate) fn player_by_identity<'a>(
    players: &'a [Player],
    client_identity: &str,
) -> Result<&'a Player, EngineError> {
    players
        .iter()
        .find(|p| p.client_identity == client_identity)
        .ok_or_else(|| EngineError::NotFound("this identity has no seat in the game".to_string()))
}

pub(crate) fn player_by_id(players: &[Player], id: Uuid) -> Result<&Player, EngineError> {
    players
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| EngineError::NotFound(format!("no player {id} in the game")))
}

pub(crate) fn non_host_count(players: &[Player]) -> usize {
    players.iter().filter(|p| !p.is_host).count()
}

impl GameEngine {
    /// Host-only removal. Mid-game the surviving roster is re-judged: a
    /// removal can hand one side the win outright, and shrinking below the
    /// minimum aborts or resets per the configured policy.
    pub async fn remove_player(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
        target_player_id: Uuid,
    ) -> Result<(), EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let mut game = self.require_game(game_id).await?;
        let players = self.store().players_in_game(game.id).await?;
        require_host(&players, client_identity)?;

        let target = player_by_id(&players, target_player_id)?;
        if target.is_host {
            return Err(EngineError::Forbidden(
                "the host cannot be removed; end the game instead".to_string(),
            ));
        }
        log::info!("game {}: removing {}", game.code, target.name);
        self.store().delete_player(target.id).await?;

        let survivors: Vec<Player> = players
            .iter()
            .filter(|p| p.id != target_player_id)
            .cloned()
            .collect();
        self.settle_roster_change(&mut game, &survivors).await
    }

    /// A non-host player asks to leave mid-game; the ask is idempotent
    /// while pending, and a previously denied ask can be re-opened.
    pub async fn request_leave(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
    ) -> Result<LeaveRequest, EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let game = self.require_game(game_id).await?;
        let players = self.store().players_in_game(game.id).await?;
        let actor = player_by_identity(&players, client_identity)?;
        if actor.is_host {
            return Err(EngineError::Forbidden(
                "the host cannot leave; end the game instead".to_string(),
            ));
        }

        let requests = self.store().leave_requests_in_game(game.id).await?;
        if let Some(existing) = requests.iter().find(|r| r.player_id == actor.id) {
            if existing.is_pending() {
                return Ok(existing.clone());
            }
            let mut reopened = existing.clone();
            reopened.status = LeaveStatus::Pending;
            reopened.processed_at = None;
            reopened.processed_by = None;
            self.store().update_leave_request(&reopened).await?;
            return Ok(reopened);
        }

        let request = LeaveRequest::new(game.id, actor.id);
        self.store().insert_leave_request(&request).await?;
        log::info!("game {}: {} asked to leave", game.code, actor.name);
        Ok(request)
    }

    pub async fn approve_leave(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
        player_id: Uuid,
    ) -> Result<LeaveRequest, EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let mut game = self.require_game(game_id).await?;
        let players = self.store().players_in_game(game.id).await?;
        let host_id = require_host(&players, client_identity)?.id;
        let target = player_by_id(&players, player_id)?;

        let requests = self.store().leave_requests_in_game(game.id).await?;
        let pending = requests
            .iter()
            .find(|r| r.player_id == player_id && r.is_pending())
            .ok_or_else(|| {
                EngineError::NotFound("no pending leave request for this player".to_string())
            })?;

        let mut resolved = pending.clone();
        resolved.resolve(LeaveStatus::Approved, host_id);
        self.store().update_leave_request(&resolved).await?;

        log::info!("game {}: {} leaves approved", game.code, target.name);
        self.store().delete_player(player_id).await?;
        let survivors: Vec<Player> = players
            .iter()
            .filter(|p| p.id != player_id)
            .cloned()
            .collect();
        self.settle_roster_change(&mut game, &survivors).await?;
        Ok(resolved)
    }

    pub async fn deny_leave(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
        player_id: Uuid,
    ) -> Result<LeaveRequest, EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let game = self.require_game(game_id).await?;
        let players = self.store().players_in_game(game.id).await?;
        let host_id = require_host(&players, client_identity)?.id;
        player_by_id(&players, player_id)?;

        let requests = self.store().leave_requests_in_game(game.id).await?;
        let pending = requests
            .iter()
            .find(|r| r.player_id == player_id && r.is_pending())
            .ok_or_else(|| {
                EngineError::NotFound("no pending leave request for this player".to_string())
            })?;

        let mut resolved = pending.clone();
        resolved.resolve(LeaveStatus::Denied, host_id);
        self.store().update_leave_request(&resolved).await?;
        Ok(resolved)
    }

    /// Host override of a dealt or undealt role, lobby only.
    pub async fn change_role(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
        player_id: Uuid,
        new_role: Role,
    ) -> Result<Player, EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let game = self.require_game(game_id).await?;
        let players = self.store().players_in_game(game.id).await?;
        require_host(&players, client_identity)?;
        if game.phase != Phase::Lobby {
            return Err(EngineError::InvalidTransition(
                "roles can only be changed in the lobby".to_string(),
            ));
        }

        let target = player_by_id(&players, player_id)?;
        if target.is_host {
            return Err(EngineError::Forbidden(
                "the host does not hold a role".to_string(),
            ));
        }

        let mut changed = target.clone();
        changed.role = Some(new_role);
        self.store().update_player(&changed).await?;
        log::info!("game {}: {} is now a {new_role}", game.code, changed.name);
        Ok(changed)
    }

    /// Shared tail of every roster shrink: win check first, then the
    /// below-minimum policy. In the lobby a shrink needs no follow-up.
    pub(crate) async fn settle_roster_change(
        &self,
        game: &mut Game,
        survivors: &[Player],
    ) -> Result<(), EngineError> {
        if game.phase == Phase::Lobby || game.phase == Phase::Ended {
            return Ok(());
        }
        if self.settle_win(game, survivors).await? {
            return Ok(());
        }
        if non_host_count(survivors) >= self.config().min_players {
            return Ok(());
        }

        match self.config().removal_policy {
            RemovalPolicy::EndGame => {
                log::info!(
                    "game {}: fewer than {} players left, ending without a verdict",
                    game.code,
                    self.config().min_players
                );
                game.phase = Phase::Ended;
                game.win_state = None;
                self.persist_game(game).await
            }
            RemovalPolicy::ResetToLobby => {
                log::info!(
                    "game {}: fewer than {} players left, returning to the lobby",
                    game.code,
                    self.config().min_players
                );
                for player in survivors.iter().filter(|p| !p.is_host) {
                    let mut reset = player.clone();
                    reset.role = None;
                    reset.alive = true;
                    self.store().update_player(&reset).await?;
                }
                self.store()
                    .upsert_round_state(&RoundState::new(game.id))
                    .await?;
                self.store().delete_votes(game.id).await?;
                game.phase = Phase::Lobby;
                game.day_count = 0;
                game.win_state = None;
                self.persist_game(game).await
            }
        }
    }
}
