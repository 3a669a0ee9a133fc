use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Villager,
    Werewolf,
    Doctor,
    Police,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Villager => "villager",
            Role::Werewolf => "werewolf",
            Role::Doctor => "doctor",
            Role::Police => "police",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "villager" => Ok(Role::Villager),
            "werewolf" => Ok(Role::Werewolf),
            "doctor" => Ok(Role::Doctor),
            "police" => Ok(Role::Police),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub game_id: Uuid,
    pub client_identity: String,
    pub name: String,
    pub role: Option<Role>,
    pub alive: bool,
    pub is_host: bool,
}

impl Player {
    pub fn new(game_id: Uuid, client_identity: String, name: String, is_host: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id,
            client_identity,
            name,
            role: None,
            alive: true,
            is_host,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }
}

impl PartialEq for Player {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role = self
            .role
            .map_or_else(|| "no role".to_string(), |role| role.to_string());
        let status = if self.is_host {
            "host"
        } else if self.alive {
            "alive"
        } else {
            "dead"
        };
        write!(f, "{} ({role}, {status})", self.name)
    }
}
