pub mod ai;
pub mod config;
pub mod engine;
pub mod session;

pub use ai::{MoveSelector, RandomSelector, select_move};
pub use engine::{
    Board, ChessError, GameState, GameStatus, Move, apply_move, legal_moves_for, new_game,
    resolve_promotion,
};
pub use session::Session;
