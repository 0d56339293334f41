//! Automated move selection.
//!
//! The `MoveSelector` trait is the seam for anything that picks a move for
//! the side to move. `RandomSelector` plays a uniformly random legal move and,
//! when that move promotes, usually picks a queen.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::engine::game::GameState;
use crate::engine::movegen::is_promotion;
use crate::engine::types::{ChessError, Move, PieceType};

/// Probability that a random promotion picks a queen.
pub const QUEEN_PROMOTION_PROBABILITY: f64 = 0.9;

/// Promotion choices when the queen is not picked.
const UNDERPROMOTIONS: [PieceType; 3] = [PieceType::Rook, PieceType::Bishop, PieceType::Knight];

// =========================================================================
// MoveSelector trait
// =========================================================================

/// Picks a move for the side to move.
pub trait MoveSelector: Send + Sync {
    /// Select a legal move for `state`. A promoting move always carries its
    /// promotion kind.
    fn select_move(&self, state: &GameState) -> Result<Move, ChessError>;

    /// Human-readable name for this selector.
    fn name(&self) -> &str;
}

// =========================================================================
// RandomSelector
// =========================================================================

/// Uniformly random legal move.
pub struct RandomSelector {
    rng: Option<Mutex<StdRng>>,
}

impl RandomSelector {
    /// Draws from the thread-local RNG.
    pub fn new() -> Self {
        RandomSelector { rng: None }
    }

    /// Reproducible selector: the same seed replays the same game.
    pub fn seeded(seed: u64) -> Self {
        RandomSelector {
            rng: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSelector for RandomSelector {
    fn select_move(&self, state: &GameState) -> Result<Move, ChessError> {
        match &self.rng {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
                pick_random(state, &mut *rng)
            }
            None => pick_random(state, &mut rand::thread_rng()),
        }
    }

    fn name(&self) -> &str {
        "RandomSelector"
    }
}

/// Choose a move for `state` using the thread-local RNG.
pub fn select_move(state: &GameState) -> Result<Move, ChessError> {
    RandomSelector::new().select_move(state)
}

fn pick_random<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> Result<Move, ChessError> {
    if state.is_game_over() {
        return Err(ChessError::GameOver(state.status()));
    }
    if let Some(sq) = state.pending_promotion() {
        return Err(ChessError::PromotionPending(sq));
    }

    let moves = state.legal_moves();
    let mut mv = moves.choose(rng).copied().ok_or(ChessError::NoLegalMoves)?;
    if is_promotion(state.board(), &mv) {
        mv.promotion = Some(random_promotion(rng));
    }

    debug!(side = %state.side_to_move(), choices = moves.len(), mv = %mv, "random move selected");
    Ok(mv)
}

/// Queen most of the time, otherwise a uniformly chosen minor promotion.
fn random_promotion<R: Rng + ?Sized>(rng: &mut R) -> PieceType {
    if rng.gen_bool(QUEEN_PROMOTION_PROBABILITY) {
        PieceType::Queen
    } else {
        UNDERPROMOTIONS[rng.gen_range(0..UNDERPROMOTIONS.len())]
    }
}

// =========================================================================
// Tests
// =========================================================================
