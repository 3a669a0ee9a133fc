use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use types::Phase;

use crate::error::EngineError;

/// Which role the host wakes second and third. Both orders have shipped;
/// wolf first is fixed, the rest is policy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightOrder {
    #[default]
    WolfPoliceDoctor,
    WolfDoctorPolice,
}

impl NightOrder {
    pub fn first(&self) -> Phase {
        Phase::NightWolf
    }

    /// The phase a completed night phase hands over to.
    pub fn after(&self, phase: Phase) -> Option<Phase> {
        match (self, phase) {
            (NightOrder::WolfPoliceDoctor, Phase::NightWolf) => Some(Phase::NightPolice),
            (NightOrder::WolfPoliceDoctor, Phase::NightPolice) => Some(Phase::NightDoctor),
            (NightOrder::WolfPoliceDoctor, Phase::NightDoctor) => Some(Phase::Reveal),
            (NightOrder::WolfDoctorPolice, Phase::NightWolf) => Some(Phase::NightDoctor),
            (NightOrder::WolfDoctorPolice, Phase::NightDoctor) => Some(Phase::NightPolice),
            (NightOrder::WolfDoctorPolice, Phase::NightPolice) => Some(Phase::Reveal),
            _ => None,
        }
    }
}

/// What happens when a mid-game removal shrinks the roster below the
/// minimum: abort with no verdict, or fall back to the lobby.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalPolicy {
    #[default]
    EndGame,
    ResetToLobby,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub night_order: NightOrder,
    pub removal_policy: RemovalPolicy,
    pub min_players: usize,
    pub max_players: usize,
    pub code_mint_attempts: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            night_order: NightOrder::default(),
            removal_policy: RemovalPolicy::default(),
            min_players: 6,
            max_players: 20,
            code_mint_attempts: 32,
        }
    }
}

impl EngineConfig {
    pub fn from_cli_or_env(cli_path: Option<&Path>) -> Result<Self, EngineError> {
        let path = cli_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("WERWOLF_CONFIG").ok().map(PathBuf::from));
        match path {
            Some(path) => Self::from_yaml_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Validation(format!("cannot read config {}: {e}", path.display()))
        })?;
        serde_yaml::from_str(&raw)
            .map_err(|e| EngineError::Validation(format!("bad config {}: {e}", path.display())))
    }
}
