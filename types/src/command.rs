use std::fmt::Display;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::player::Role;

/// How an inbound command names its game: by primary key or by the
/// human-readable join code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameRef {
    Id(Uuid),
    Code(String),
}

impl Display for GameRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameRef::Id(id) => write!(f, "game:{id}"),
            GameRef::Code(code) => write!(f, "code:{code}"),
        }
    }
}

impl From<Uuid> for GameRef {
    fn from(id: Uuid) -> Self {
        GameRef::Id(id)
    }
}

/// One inbound command per engine action. Every variant carries the acting
/// client identity; mutations against an existing game carry a [`GameRef`]
/// and, where the action is aimed at somebody, a target player id.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    CreateGame {
        host_name: String,
        client_identity: String,
    },
    JoinGame {
        code: String,
        name: String,
        client_identity: String,
    },
    AssignRoles {
        game: GameRef,
        client_identity: String,
    },
    ChangeRole {
        game: GameRef,
        client_identity: String,
        player_id: Uuid,
        new_role: Role,
    },
    RemovePlayer {
        game: GameRef,
        client_identity: String,
        player_id: Uuid,
    },
    RequestLeave {
        game: GameRef,
        client_identity: String,
    },
    ApproveLeave {
        game: GameRef,
        client_identity: String,
        player_id: Uuid,
    },
    DenyLeave {
        game: GameRef,
        client_identity: String,
        player_id: Uuid,
    },
    WolfSelect {
        game: GameRef,
        client_identity: String,
        target_player_id: Uuid,
    },
    PoliceInspect {
        game: GameRef,
        client_identity: String,
        target_player_id: Uuid,
    },
    DoctorSave {
        game: GameRef,
        client_identity: String,
        target_player_id: Uuid,
    },
    #[serde(alias = "next_phase")]
    AdvancePhase {
        game: GameRef,
        client_identity: String,
    },
    BeginVoting {
        game: GameRef,
        client_identity: String,
    },
    FinalVote {
        game: GameRef,
        client_identity: String,
    },
    CastVote {
        game: GameRef,
        client_identity: String,
        target_player_id: Uuid,
    },
    EliminatePlayer {
        game: GameRef,
        client_identity: String,
    },
    RevealDeath {
        game: GameRef,
        client_identity: String,
    },
    EndGame {
        game: GameRef,
        client_identity: String,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateGame { .. } => "create_game",
            Command::JoinGame { .. } => "join_game",
            Command::AssignRoles { .. } => "assign_roles",
            Command::ChangeRole { .. } => "change_role",
            Command::RemovePlayer { .. } => "remove_player",
            Command::RequestLeave { .. } => "request_leave",
            Command::ApproveLeave { .. } => "approve_leave",
            Command::DenyLeave { .. } => "deny_leave",
            Command::WolfSelect { .. } => "wolf_select",
            Command::PoliceInspect { .. } => "police_inspect",
            Command::DoctorSave { .. } => "doctor_save",
            Command::AdvancePhase { .. } => "advance_phase",
            Command::BeginVoting { .. } => "begin_voting",
            Command::FinalVote { .. } => "final_vote",
            Command::CastVote { .. } => "cast_vote",
            Command::EliminatePlayer { .. } => "eliminate_player",
            Command::RevealDeath { .. } => "reveal_dead",
            Command::EndGame { .. } => "end_game",
        }
    }

    pub fn client_identity(&self) -> &str {
        match self {
            Command::CreateGame {
                client_identity, ..
            }
            | Command::JoinGame {
                client_identity, ..
            }
            | Command::AssignRoles {
                client_identity, ..
            }
            | Command::ChangeRole {
                client_identity, ..
            }
            | Command::RemovePlayer {
                client_identity, ..
            }
            | Command::RequestLeave {
                client_identity, ..
            }
            | Command::ApproveLeave {
                client_identity, ..
            }
            | Command::DenyLeave {
                client_identity, ..
            }
            | Command::WolfSelect {
                client_identity, ..
            }
            | Command::PoliceInspect {
                client_identity, ..
            }
            | Command::DoctorSave {
                client_identity, ..
            }
            | Command::AdvancePhase {
                client_identity, ..
            }
            | Command::BeginVoting {
                client_identity, ..
            }
            | Command::FinalVote {
                client_identity, ..
            }
            | Command::CastVote {
                client_identity, ..
            }
            | Command::EliminatePlayer {
                client_identity, ..
            }
            | Command::RevealDeath {
                client_identity, ..
            }
            | Command::EndGame {
                client_identity, ..
            } => client_identity,
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
