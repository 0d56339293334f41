//! Game state machine.
//!
//! `GameState` is an immutable snapshot: board, side to move, castling
//! bookkeeping, en-passant target, and the derived status. Every operation
//! returns a new snapshot, so a presentation layer can hold the previous one
//! for rendering while the next is being computed.
//!
//! A pawn move onto the last rank without a promotion choice leaves the
//! snapshot in a pending state: the pawn sits on the far rank, the turn has
//! not passed, and only `resolve_promotion` is accepted.

use serde::Serialize;
use tracing::{debug, info};

use crate::engine::attacks::{attackers_of, is_in_check};
use crate::engine::board::Board;
use crate::engine::movegen;
use crate::engine::types::{
    CastlingRights, ChessError, Color, GameStatus, Move, MoveContext, Piece, PieceType, Square,
};

// =========================================================================
// GameState
// =========================================================================

/// A complete, read-only snapshot of a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameState {
    board: Board,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    status: GameStatus,
    /// Square of a pawn waiting for its promotion choice.
    pending_promotion: Option<Square>,
}

impl GameState {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Standard starting position, White to move.
    pub fn new() -> Self {
        Self {
            board: Board::starting(),
            side_to_move: Color::White,
            castling: CastlingRights::INITIAL,
            en_passant: None,
            status: GameStatus::InProgress,
            pending_promotion: None,
        }
    }

    /// Build a custom position. The status is derived from the inputs.
    ///
    /// # Panics
    /// If either king is missing from `board`.
    pub fn from_parts(
        board: Board,
        side_to_move: Color,
        castling: CastlingRights,
        en_passant: Option<Square>,
    ) -> Self {
        let mut state = Self {
            board,
            side_to_move,
            castling,
            en_passant,
            status: GameStatus::InProgress,
            pending_promotion: None,
        };
        state.status = state.compute_status();
        state
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn pending_promotion(&self) -> Option<Square> {
        self.pending_promotion
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board.piece_at(sq)
    }

    /// Auxiliary state for the move rules.
    pub fn context(&self) -> MoveContext {
        MoveContext {
            en_passant: self.en_passant,
            castling: self.castling,
        }
    }

    /// Squares of the pieces giving check to the side to move, row-major.
    pub fn checkers(&self) -> Vec<Square> {
        let side = self.side_to_move;
        attackers_of(&self.board, self.board.king_sq(side), !side)
    }

    /// All legal moves for the side to move. Empty while a promotion is pending.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.pending_promotion.is_some() {
            return Vec::new();
        }
        movegen::all_legal_moves(&self.board, self.side_to_move, &self.context())
    }

    /// Legal destinations for the piece on `from`, for highlighting.
    ///
    /// Empty when `from` does not hold a piece of the side to move.
    pub fn legal_moves_for(&self, from: Square) -> Vec<Square> {
        if self.pending_promotion.is_some() {
            return Vec::new();
        }
        match self.board.piece_at(from) {
            Some(piece) if piece.color == self.side_to_move => {
                movegen::legal_destinations(piece, from, &self.board, &self.context())
            }
            _ => Vec::new(),
        }
    }

    // -----------------------------------------------------------------
    // Apply move
    // -----------------------------------------------------------------

    /// Play a move for the side to move and return the resulting snapshot.
    ///
    /// Fails with `GameOver` after checkmate or stalemate, `PromotionPending`
    /// while a promotion awaits its choice, `InvalidPromotion` for a pawn or
    /// king promotion, and `IllegalMove` when the move is not legal or
    /// carries a promotion it cannot use.
    pub fn apply_move(&self, mv: Move) -> Result<GameState, ChessError> {
        if self.status.is_game_over() {
            return Err(ChessError::GameOver(self.status));
        }
        if let Some(sq) = self.pending_promotion {
            return Err(ChessError::PromotionPending(sq));
        }
        if let Some(kind) = mv.promotion
            && !kind.is_promotion_choice()
        {
            return Err(ChessError::InvalidPromotion(kind));
        }

        let illegal = ChessError::IllegalMove {
            from: mv.from,
            to: mv.to,
        };
        if !self.legal_moves_for(mv.from).contains(&mv.to) {
            return Err(illegal);
        }
        let promoting = movegen::is_promotion(&self.board, &mv);
        if mv.promotion.is_some() && !promoting {
            return Err(illegal);
        }

        let mut next = self.clone();
        let undo = next.board.make_move(mv.from, mv.to, mv.promotion);

        // ---- Castling bookkeeping: leaving or capturing on a home square ----
        next.castling.touch(mv.from);
        next.castling.touch(mv.to);
        if let Some((rook_from, _)) = undo.rook {
            next.castling.touch(rook_from);
        }

        // ---- Double pawn push → set en passant, otherwise clear ----
        next.en_passant = None;
        if undo.moved.kind == PieceType::Pawn && mv.from.row().abs_diff(mv.to.row()) == 2 {
            next.en_passant = mv.from.offset(undo.moved.color.forward(), 0);
        }

        debug!(
            side = %self.side_to_move,
            from = %mv.from,
            to = %mv.to,
            castle = undo.is_castle(),
            en_passant = undo.is_en_passant(),
            "move applied"
        );

        if promoting && mv.promotion.is_none() {
            debug!(square = %mv.to, "promotion pending");
            next.pending_promotion = Some(mv.to);
            return Ok(next);
        }

        next.finish_turn();
        Ok(next)
    }

    // -----------------------------------------------------------------
    // Promotion
    // -----------------------------------------------------------------

    /// Complete a pending promotion with the chosen piece kind.
    pub fn resolve_promotion(&self, kind: PieceType) -> Result<GameState, ChessError> {
        let sq = self
            .pending_promotion
            .ok_or(ChessError::NoPromotionPending)?;
        if !kind.is_promotion_choice() {
            return Err(ChessError::InvalidPromotion(kind));
        }

        let mut next = self.clone();
        next.board.put(sq, Piece::new(kind, self.side_to_move));
        next.pending_promotion = None;
        debug!(square = %sq, piece = %kind, "promotion resolved");

        next.finish_turn();
        Ok(next)
    }

    // -----------------------------------------------------------------
    // Status detection
    // -----------------------------------------------------------------

    fn finish_turn(&mut self) {
        self.side_to_move = !self.side_to_move;
        self.status = self.compute_status();
        if matches!(
            self.status,
            GameStatus::Check { .. } | GameStatus::Checkmate { .. }
        ) {
            let checkers: Vec<String> = self.checkers().iter().map(|sq| sq.to_string()).collect();
            debug!(side = %self.side_to_move, ?checkers, "king in check");
        }
        if self.status.is_game_over() {
            info!(status = %self.status, "game over");
        }
    }

    fn compute_status(&self) -> GameStatus {
        let side = self.side_to_move;
        let in_check = is_in_check(&self.board, side);
        let can_move = movegen::has_legal_move(&self.board, side, &self.context());

        match (in_check, can_move) {
            (true, false) => GameStatus::Checkmate { winner: !side },
            (false, false) => GameStatus::Stalemate,
            (true, true) => GameStatus::Check { side },
            (false, true) => GameStatus::InProgress,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Free-function API
// =========================================================================

/// A fresh game in the standard starting position.
pub fn new_game() -> GameState {
    GameState::new()
}

/// Legal destinations for the piece on `from`.
pub fn legal_moves_for(state: &GameState, from: Square) -> Vec<Square> {
    state.legal_moves_for(from)
}

/// Apply a move, returning the next snapshot.
pub fn apply_move(state: &GameState, mv: Move) -> Result<GameState, ChessError> {
    state.apply_move(mv)
}

/// Resolve a pending promotion.
pub fn resolve_promotion(state: &GameState, kind: PieceType) -> Result<GameState, ChessError> {
    state.resolve_promotion(kind)
}

// =========================================================================
// Tests
// =========================================================================
