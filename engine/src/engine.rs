use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use storage::GameStore;
use types::{Game, GameRef, GameSnapshot, Phase, Player};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::win::evaluate_win;

/// The game round engine. Holds no per-game state of its own: every
/// operation loads the latest committed rows, validates, mutates and
/// persists. Mutations for one game are serialized through a per-game
/// async mutex, so concurrent commands cannot interleave their
/// load-validate-persist sequences.
pub struct GameEngine {
    store: Arc<dyn GameStore>,
    config: EngineConfig,
    locks: Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>,
}

impl GameEngine {
    pub fn new(store: Arc<dyn GameStore>, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    pub(crate) fn game_lock(&self, game_id: Uuid) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().expect("game lock registry poisoned");
        locks.entry(game_id).or_default().clone()
    }

    pub(crate) fn forget_lock(&self, game_id: Uuid) {
        let mut locks = self.locks.lock().expect("game lock registry poisoned");
        locks.remove(&game_id);
    }

    pub(crate) async fn resolve_ref(&self, game: &GameRef) -> Result<Game, EngineError> {
        let found = match game {
            GameRef::Id(id) => self.store.game_by_id(*id).await?,
            GameRef::Code(code) => self.store.game_by_code(code).await?,
        };
        found.ok_or_else(|| EngineError::NotFound(format!("no active game for {game}")))
    }

    /// Latest committed game row; called again under the per-game lock so
    /// validation never runs against a superseded phase.
    pub(crate) async fn require_game(&self, game_id: Uuid) -> Result<Game, EngineError> {
        self.store
            .game_by_id(game_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("game {game_id} no longer exists")))
    }

    pub(crate) async fn persist_game(&self, game: &mut Game) -> Result<(), EngineError> {
        game.version += 1;
        self.store.update_game(game).await?;
        Ok(())
    }

    /// Runs the win evaluator over `players` and, on a verdict, moves the
    /// game to `ended`. Returns whether the game is now over.
    pub(crate) async fn settle_win(
        &self,
        game: &mut Game,
        players: &[Player],
    ) -> Result<bool, EngineError> {
        if game.phase == Phase::Ended {
            return Ok(true);
        }
        if let Some(win) = evaluate_win(players) {
            log::info!("game {} is over: {win} win", game.code);
            game.win_state = Some(win);
            game.phase = Phase::Ended;
            self.persist_game(game).await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// The read model: one game with all of its child rows, as pushed to
    /// every subscribed client.
    pub async fn fetch_snapshot(&self, code: &str) -> Result<GameSnapshot, EngineError> {
        let game = self
            .store
            .game_by_code(code)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("no active game with code {code}")))?;
        Ok(self.store.load_snapshot(game).await?)
    }

    pub async fn snapshot_by_ref(&self, game: &GameRef) -> Result<GameSnapshot, EngineError> {
        let game = self.resolve_ref(game).await?;
        Ok(self.store.load_snapshot(game).await?)
    }
}
