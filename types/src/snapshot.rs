use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::Game;
use crate::leave::LeaveRequest;
use crate::player::{Player, Role};
use crate::round::RoundState;
use crate::vote::Vote;

/// The full read model for one game: what the transport layer pushes to
/// every subscribed client after a command commits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game: Game,
    pub players: Vec<Player>,
    pub round: Option<RoundState>,
    pub votes: Vec<Vote>,
    pub leave_requests: Vec<LeaveRequest>,
}

impl GameSnapshot {
    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    pub fn player_by_id(&self, id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_by_identity(&self, client_identity: &str) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.client_identity == client_identity)
    }

    pub fn non_host_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.is_host)
    }

    pub fn alive_non_host(&self) -> impl Iterator<Item = &Player> {
        self.non_host_players().filter(|p| p.alive)
    }

    pub fn players_with_role(&self, role: Role) -> impl Iterator<Item = &Player> + '_ {
        self.players.iter().filter(move |p| p.role == Some(role))
    }
}
