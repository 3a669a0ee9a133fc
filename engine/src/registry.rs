use chrono::Utc;
use rand::Rng;
use types::{Game, Phase, Player, RoundState};
use uuid::Uuid;

use crate::engine::GameEngine;
use crate::error::EngineError;
use crate::roster::non_host_count;

impl GameEngine {
    /// Creates a game with a freshly minted code and its host seat. One
    /// browser identity hosts at most one active game at a time.
    pub async fn create_game(
        &self,
        host_name: &str,
        client_identity: &str,
    ) -> Result<(Game, Player), EngineError> {
        if self
            .store()
            .active_game_hosted_by(client_identity)
            .await?
            .is_some()
        {
            return Err(EngineError::Conflict(
                "this browser already hosts an active game".to_string(),
            ));
        }

        let code = self.mint_code().await?;
        let game = Game::new(code, client_identity.to_string());
        let host = Player::new(
            game.id,
            client_identity.to_string(),
            host_name.to_string(),
            true,
        );
        self.store().insert_game(&game, &host).await?;
        self.store()
            .upsert_round_state(&RoundState::new(game.id))
            .await?;

        log::info!("created game {} hosted by {}", game.code, host.name);
        Ok((game, host))
    }

    /// Random 6-digit code, checked against games created today. Codes are
    /// only a collision-avoidance heuristic, not a security boundary.
    async fn mint_code(&self) -> Result<String, EngineError> {
        let today = Utc::now().date_naive();
        for _ in 0..self.config().code_mint_attempts {
            let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32));
            if self
                .store()
                .game_with_code_on(&code, today)
                .await?
                .is_none()
            {
                return Ok(code);
            }
        }
        Err(EngineError::Unavailable(
            "no unused game code found, try again".to_string(),
        ))
    }

    pub async fn join_game(
        &self,
        code: &str,
        name: &str,
        client_identity: &str,
    ) -> Result<Player, EngineError> {
        let game_id = self
            .store()
            .game_by_code(code)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("no active game with code {code}")))?
            .id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let game = self.require_game(game_id).await?;
        if game.phase != Phase::Lobby {
            return Err(EngineError::InvalidTransition(
                "the game has already started".to_string(),
            ));
        }

        let players = self.store().players_in_game(game.id).await?;
        if players
            .iter()
            .any(|p| p.client_identity == client_identity)
        {
            return Err(EngineError::Conflict(
                "this browser has already joined the game".to_string(),
            ));
        }
        if non_host_count(&players) + 1 > self.config().max_players {
            return Err(EngineError::Capacity(format!(
                "the game is full ({} players)",
                self.config().max_players
            )));
        }

        let player = Player::new(game.id, client_identity.to_string(), name.to_string(), false);
        self.store().insert_player(&player).await?;
        log::info!("{} joined game {}", player.name, game.code);
        Ok(player)
    }

    pub async fn resolve_game_by_code(&self, code: &str) -> Result<Game, EngineError> {
        self.store()
            .game_by_code(code)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("no active game with code {code}")))
    }

    pub async fn resolve_game_by_id(&self, id: Uuid) -> Result<Game, EngineError> {
        self.store()
            .game_by_id(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("no active game {id}")))
    }
}
