use rand::seq::SliceRandom;
use rand::thread_rng;
use types::{GameRef, Phase, Player, Role};

use crate::engine::GameEngine;
use crate::error::EngineError;
use crate::roster::{non_host_count, require_host};

/// One werewolf up to 8 players, two for 9-12, three beyond.
pub fn werewolf_count(non_host_players: usize) -> usize {
    if non_host_players <= 8 {
        1
    } else if non_host_players <= 12 {
        2
    } else {
        3
    }
}

/// The full role deck for a roster: wolves per the table above, exactly
/// one doctor and one police, villagers for the rest.
pub fn role_deck(non_host_players: usize) -> Vec<Role> {
    let mut deck = vec![Role::Werewolf; werewolf_count(non_host_players)];
    deck.push(Role::Doctor);
    deck.push(Role::Police);
    deck.resize(non_host_players, Role::Villager);
    deck
}

impl GameEngine {
    /// Deals roles once, in the lobby, to a roster within bounds. Does not
    /// advance the phase. Re-dealing after anyone has seen a role is
    /// rejected rather than re-randomized.
    pub async fn assign_roles(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
    ) -> Result<Vec<Player>, EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let game = self.require_game(game_id).await?;
        let players = self.store().players_in_game(game.id).await?;
        require_host(&players, client_identity)?;
        if game.phase != Phase::Lobby {
            return Err(EngineError::InvalidTransition(
                "roles are dealt in the lobby".to_string(),
            ));
        }

        let n = non_host_count(&players);
        if n < self.config().min_players || n > self.config().max_players {
            return Err(EngineError::Capacity(format!(
                "need between {} and {} players to deal roles, have {n}",
                self.config().min_players,
                self.config().max_players
            )));
        }
        if players.iter().any(|p| !p.is_host && p.role.is_some()) {
            return Err(EngineError::Conflict(
                "roles have already been dealt".to_string(),
            ));
        }

        let mut deck = role_deck(n);
        deck.shuffle(&mut thread_rng());

        let mut dealt = Vec::with_capacity(n);
        for (player, role) in players.iter().filter(|p| !p.is_host).zip(deck) {
            let mut assigned = player.clone();
            assigned.role = Some(role);
            self.store().update_player(&assigned).await?;
            dealt.push(assigned);
        }
        log::info!("game {}: dealt roles to {} players", game.code, dealt.len());
        Ok(dealt)
    }
}
