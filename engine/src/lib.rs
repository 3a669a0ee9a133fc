pub mod assign;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod night;
pub mod registry;
pub mod roster;
pub mod round;
pub mod vote;
pub mod win;

pub use config::{EngineConfig, NightOrder, RemovalPolicy};
pub use engine::GameEngine;
pub use error::EngineError;
pub use win::evaluate_win;
