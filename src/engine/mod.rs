pub mod attacks;
pub mod board;
pub mod game;
pub mod movegen;
pub mod rules;
pub mod types;

pub use board::Board;
pub use game::{GameState, apply_move, legal_moves_for, new_game, resolve_promotion};
pub use movegen::all_legal_moves;
pub use types::*;
