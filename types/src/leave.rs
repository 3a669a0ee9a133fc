use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Denied,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Denied => "denied",
        }
    }
}

impl Display for LeaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LeaveStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LeaveStatus::Pending),
            "approved" => Ok(LeaveStatus::Approved),
            "denied" => Ok(LeaveStatus::Denied),
            other => Err(format!("unknown leave status: {other}")),
        }
    }
}

/// A non-host player's pending ask to exit mid-game. Hosts never have one;
/// a host exits by ending the game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub game_id: Uuid,
    pub player_id: Uuid,
    pub status: LeaveStatus,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<Uuid>,
}

impl LeaveRequest {
    pub fn new(game_id: Uuid, player_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id,
            player_id,
            status: LeaveStatus::Pending,
            requested_at: Utc::now(),
            processed_at: None,
            processed_by: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == LeaveStatus::Pending
    }

    pub fn resolve(&mut self, status: LeaveStatus, processed_by: Uuid) {
        self.status = status;
        self.processed_at = Some(Utc::now());
        self.processed_by = Some(processed_by);
    }
}
