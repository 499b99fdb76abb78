// minimax_chess/src/lib.rs

pub mod types;
pub mod error;
pub mod config;
pub mod position;
pub mod eval;
pub mod ordering;
pub mod search;
pub mod selfplay;

// Re-exports so main.rs and tests can `use engine::Search;` etc.
pub use types::*;
pub use error::EngineError;
pub use config::EngineConfig;
pub use position::{parse_uci_move, Applied, Position, TurnGuard};
pub use eval::{can_checkmate_in_one, Evaluator};
pub use ordering::MoveOrderer;
pub use search::Search;
pub use selfplay::{play_game, GameReport, GameResult, SelfPlayConfig, Termination};
