pub mod selector;

pub use selector::{MoveSelector, QUEEN_PROMOTION_PROBABILITY, RandomSelector, select_move};
