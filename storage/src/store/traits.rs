use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::broadcast;
use types::{Game, GameSnapshot, LeaveRequest, Player, RoundState, Vote};
use uuid::Uuid;

use crate::error::StorageError;
use crate::notify::ChangeEvent;

/// The engine's storage boundary: row-level access to the five tables plus
/// the change-notification feed. Each mutating method commits fully and
/// emits its change event, or fails without side effects.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn insert_game(&self, game: &Game, host: &Player) -> Result<(), StorageError>;
    async fn game_by_id(&self, id: Uuid) -> Result<Option<Game>, StorageError>;
    async fn game_by_code(&self, code: &str) -> Result<Option<Game>, StorageError>;
    async fn game_with_code_on(
        &self,
        code: &str,
        day: NaiveDate,
    ) -> Result<Option<Game>, StorageError>;
    async fn active_game_hosted_by(
        &self,
        client_identity: &str,
    ) -> Result<Option<Game>, StorageError>;
    async fn update_game(&self, game: &Game) -> Result<(), StorageError>;
    async fn delete_game(&self, id: Uuid) -> Result<(), StorageError>;

    async fn insert_player(&self, player: &Player) -> Result<(), StorageError>;
    async fn update_player(&self, player: &Player) -> Result<(), StorageError>;
    async fn delete_player(&self, id: Uuid) -> Result<(), StorageError>;
    async fn players_in_game(&self, game_id: Uuid) -> Result<Vec<Player>, StorageError>;

    async fn round_state(&self, game_id: Uuid) -> Result<Option<RoundState>, StorageError>;
    async fn upsert_round_state(&self, round: &RoundState) -> Result<(), StorageError>;

    async fn insert_vote(&self, vote: &Vote) -> Result<(), StorageError>;
    async fn update_vote(&self, vote: &Vote) -> Result<(), StorageError>;
    async fn votes_in_game(&self, game_id: Uuid) -> Result<Vec<Vote>, StorageError>;
    async fn delete_votes(&self, game_id: Uuid) -> Result<(), StorageError>;

    async fn insert_leave_request(&self, request: &LeaveRequest) -> Result<(), StorageError>;
    async fn update_leave_request(&self, request: &LeaveRequest) -> Result<(), StorageError>;
    async fn leave_requests_in_game(
        &self,
        game_id: Uuid,
    ) -> Result<Vec<LeaveRequest>, StorageError>;

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;

    async fn load_snapshot(&self, game: Game) -> Result<GameSnapshot, StorageError> {
        let players = self.players_in_game(game.id).await?;
        let round = self.round_state(game.id).await?;
        let votes = self.votes_in_game(game.id).await?;
        let leave_requests = self.leave_requests_in_game(game.id).await?;
        Ok(GameSnapshot {
            game,
            players,
            round,
            votes,
            leave_requests,
        })
    }
}
