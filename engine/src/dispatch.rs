use types::{Command, GameRef, GameSnapshot};

use crate::engine::GameEngine;
use crate::error::EngineError;

impl GameEngine {
    /// Applies one inbound command and returns the refreshed read model for
    /// the affected game, or `None` when the command deleted it. This is
    /// the single entry point a transport layer needs.
    pub async fn apply(&self, command: Command) -> Result<Option<GameSnapshot>, EngineError> {
        log::debug!(
            "applying {command} from {}",
            command.client_identity()
        );
        match command {
            Command::CreateGame {
                host_name,
                client_identity,
            } => {
                let (game, _host) = self.create_game(&host_name, &client_identity).await?;
                self.snapshot_by_ref(&GameRef::Id(game.id)).await.map(Some)
            }
            Command::JoinGame {
                code,
                name,
                client_identity,
            } => {
                let player = self.join_game(&code, &name, &client_identity).await?;
                self.snapshot_by_ref(&GameRef::Id(player.game_id))
                    .await
                    .map(Some)
            }
            Command::AssignRoles {
                game,
                client_identity,
            } => {
                self.assign_roles(&game, &client_identity).await?;
                self.snapshot_by_ref(&game).await.map(Some)
            }
            Command::ChangeRole {
                game,
                client_identity,
                player_id,
                new_role,
            } => {
                self.change_role(&game, &client_identity, player_id, new_role)
                    .await?;
                self.snapshot_by_ref(&game).await.map(Some)
            }
            Command::RemovePlayer {
                game,
                client_identity,
                player_id,
            } => {
                self.remove_player(&game, &client_identity, player_id)
                    .await?;
                self.snapshot_by_ref(&game).await.map(Some)
            }
            Command::RequestLeave {
                game,
                client_identity,
            } => {
                self.request_leave(&game, &client_identity).await?;
                self.snapshot_by_ref(&game).await.map(Some)
            }
            Command::ApproveLeave {
                game,
                client_identity,
                player_id,
            } => {
                self.approve_leave(&game, &client_identity, player_id)
                    .await?;
                self.snapshot_by_ref(&game).await.map(Some)
            }
            Command::DenyLeave {
                game,
                client_identity,
                player_id,
            } => {
                self.deny_leave(&game, &client_identity, player_id).await?;
                self.snapshot_by_ref(&game).await.map(Some)
            }
            Command::WolfSelect {
                game,
                client_identity,
                target_player_id,
            } => {
                self.wolf_select(&game, &client_identity, target_player_id)
                    .await?;
                self.snapshot_by_ref(&game).await.map(Some)
            }
            Command::PoliceInspect {
                game,
                client_identity,
                target_player_id,
            } => {
                self.police_inspect(&game, &client_identity, target_player_id)
                    .await?;
                self.snapshot_by_ref(&game).await.map(Some)
            }
            Command::DoctorSave {
                game,
                client_identity,
                target_player_id,
            } => {
                self.doctor_save(&game, &client_identity, target_player_id)
                    .await?;
                self.snapshot_by_ref(&game).await.map(Some)
            }
            Command::AdvancePhase {
                game,
                client_identity,
            } => {
                self.advance_phase(&game, &client_identity).await?;
                self.snapshot_by_ref(&game).await.map(Some)
            }
            Command::BeginVoting {
                game,
                client_identity,
            } => {
                self.begin_voting(&game, &client_identity).await?;
                self.snapshot_by_ref(&game).await.map(Some)
            }
            Command::FinalVote {
                game,
                client_identity,
            } => {
                self.final_vote(&game, &client_identity).await?;
                self.snapshot_by_ref(&game).await.map(Some)
            }
            Command::CastVote {
                game,
                client_identity,
                target_player_id,
            } => {
                self.cast_vote(&game, &client_identity, target_player_id)
                    .await?;
                self.snapshot_by_ref(&game).await.map(Some)
            }
            Command::EliminatePlayer {
                game,
                client_identity,
            } => {
                self.eliminate_player(&game, &client_identity).await?;
                self.snapshot_by_ref(&game).await.map(Some)
            }
            Command::RevealDeath {
                game,
                client_identity,
            } => {
                self.reveal_death(&game, &client_identity).await?;
                self.snapshot_by_ref(&game).await.map(Some)
            }
            Command::EndGame {
                game,
                client_identity,
            } => {
                self.end_game(&game, &client_identity).await?;
                Ok(None)
            }
        }
    }
}
