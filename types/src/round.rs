use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectResult {
    Werewolf,
    NotWerewolf,
}

impl InspectResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectResult::Werewolf => "werewolf",
            InspectResult::NotWerewolf => "not_werewolf",
        }
    }
}

impl Display for InspectResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InspectResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "werewolf" => Ok(InspectResult::Werewolf),
            "not_werewolf" => Ok(InspectResult::NotWerewolf),
            other => Err(format!("unknown inspect result: {other}")),
        }
    }
}

/// Scratch pad for the current night, 1:1 with its game. The target and
/// result fields only ever describe the night named by the game's
/// `day_count`; they are wiped whenever a new night begins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    pub game_id: Uuid,
    pub wolf_target: Option<Uuid>,
    pub police_inspect_target: Option<Uuid>,
    pub police_inspect_result: Option<InspectResult>,
    pub doctor_save_target: Option<Uuid>,
    pub resolved_death: Option<Uuid>,
    /// Whether the host has taken the current phase's step: woken the
    /// acting role during a night phase, or applied the reveal.
    pub phase_started: bool,
}

impl RoundState {
    pub fn new(game_id: Uuid) -> Self {
        Self {
            game_id,
            wolf_target: None,
            police_inspect_target: None,
            police_inspect_result: None,
            doctor_save_target: None,
            resolved_death: None,
            phase_started: false,
        }
    }

    pub fn clear_night(&mut self) {
        self.wolf_target = None;
        self.police_inspect_target = None;
        self.police_inspect_result = None;
        self.doctor_save_target = None;
        self.resolved_death = None;
        self.phase_started = false;
    }
}
