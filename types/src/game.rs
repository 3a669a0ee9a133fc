use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    NightWolf,
    NightPolice,
    NightDoctor,
    Reveal,
    DayVote,
    DayFinalVote,
    Ended,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Lobby => "lobby",
            Phase::NightWolf => "night_wolf",
            Phase::NightPolice => "night_police",
            Phase::NightDoctor => "night_doctor",
            Phase::Reveal => "reveal",
            Phase::DayVote => "day_vote",
            Phase::DayFinalVote => "day_final_vote",
            Phase::Ended => "ended",
        }
    }

    pub fn is_night(&self) -> bool {
        matches!(
            self,
            Phase::NightWolf | Phase::NightPolice | Phase::NightDoctor
        )
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lobby" => Ok(Phase::Lobby),
            "night_wolf" => Ok(Phase::NightWolf),
            "night_police" => Ok(Phase::NightPolice),
            "night_doctor" => Ok(Phase::NightDoctor),
            "reveal" => Ok(Phase::Reveal),
            "day_vote" => Ok(Phase::DayVote),
            "day_final_vote" => Ok(Phase::DayFinalVote),
            "ended" => Ok(Phase::Ended),
            other => Err(format!("unknown phase: {other}")),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinState {
    Villagers,
    Werewolves,
}

impl WinState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WinState::Villagers => "villagers",
            WinState::Werewolves => "werewolves",
        }
    }
}

impl Display for WinState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WinState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "villagers" => Ok(WinState::Villagers),
            "werewolves" => Ok(WinState::Werewolves),
            other => Err(format!("unknown win state: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub code: String,
    pub host_identity: String,
    pub phase: Phase,
    pub win_state: Option<WinState>,
    pub day_count: i64,
    pub created_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    /// Bumped on every committed write to the game row, so observers can
    /// discard notifications that arrive out of order.
    pub version: i64,
}

impl Game {
    pub fn new(code: String, host_identity: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            code,
            host_identity,
            phase: Phase::Lobby,
            win_state: None,
            day_count: 0,
            created_on: now.date_naive(),
            created_at: now,
            version: 0,
        }
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::Ended
    }
}
