pub mod command;
pub mod game;
pub mod leave;
pub mod player;
pub mod round;
pub mod snapshot;
pub mod vote;

pub use command::{Command, GameRef};
pub use game::{Game, Phase, WinState};
pub use leave::{LeaveRequest, LeaveStatus};
pub use player::{Player, Role};
pub use round::{InspectResult, RoundState};
pub use snapshot::GameSnapshot;
pub use vote::{Vote, VotePhase};
