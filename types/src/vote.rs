use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotePhase {
    DayVote,
    DayFinalVote,
}

impl VotePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            VotePhase::DayVote => "day_vote",
            VotePhase::DayFinalVote => "day_final_vote",
        }
    }
}

impl Display for VotePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VotePhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day_vote" => Ok(VotePhase::DayVote),
            "day_final_vote" => Ok(VotePhase::DayFinalVote),
            other => Err(format!("unknown vote phase: {other}")),
        }
    }
}

/// One ballot per (voter, round, vote phase); re-casting overwrites the
/// target until the round's final-vote elimination is applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub id: Uuid,
    pub game_id: Uuid,
    pub voter_player_id: Uuid,
    pub target_player_id: Uuid,
    pub round: i64,
    pub phase: VotePhase,
}

impl Vote {
    pub fn new(
        game_id: Uuid,
        voter_player_id: Uuid,
        target_player_id: Uuid,
        round: i64,
        phase: VotePhase,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id,
            voter_player_id,
            target_player_id,
            round,
            phase,
        }
    }
}
