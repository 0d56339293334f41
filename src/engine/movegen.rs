//! Legal move generation.
//!
//! Pipeline:
//!   1. Pseudo-legal destinations: run the piece's rule against every square.
//!   2. Filter: make the move on a scratch board, verify the mover's king is
//!      not attacked, unmake.
//!
//! Source and destination squares are always visited in row-major order, so
//! the resulting lists are deterministic.

use crate::engine::attacks::is_in_check;
use crate::engine::board::Board;
use crate::engine::rules::is_valid_move;
use crate::engine::types::{Color, Move, MoveContext, Piece, PieceType, Square};

// =========================================================================
// Public API
// =========================================================================

/// Destinations allowed by `piece`'s movement rule from `from`, ignoring
/// self-check.
///
/// `piece` is expected to stand on `from`.
pub fn pseudo_legal_destinations(
    piece: Piece,
    from: Square,
    board: &Board,
    ctx: &MoveContext,
) -> Vec<Square> {
    debug_assert_eq!(board.piece_at(from), Some(piece));

    let mut targets: Vec<Square> = Square::all()
        .filter(|&to| is_valid_move(board, from, to, ctx))
        .collect();

    // En passant target, appended for pawns adjacent to it.
    if piece.kind == PieceType::Pawn
        && let Some(ep) = ctx.en_passant
        && ep.row() as i8 == from.row() as i8 + piece.color.forward()
        && ep.col().abs_diff(from.col()) == 1
        && board.is_empty(ep)
        && !targets.contains(&ep)
    {
        targets.push(ep);
    }

    targets
}

/// Destinations for `piece` on `from` that do not leave its own king attacked.
pub fn legal_destinations(
    piece: Piece,
    from: Square,
    board: &Board,
    ctx: &MoveContext,
) -> Vec<Square> {
    let pseudo = pseudo_legal_destinations(piece, from, board, ctx);
    let mut scratch = board.clone();
    pseudo
        .into_iter()
        .filter(|&to| leaves_king_safe(&mut scratch, from, to, piece.color))
        .collect()
}

/// Every legal move for `color`, promotion left unset.
pub fn all_legal_moves(board: &Board, color: Color, ctx: &MoveContext) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    for (from, piece) in board.pieces(color) {
        for to in legal_destinations(piece, from, board, ctx) {
            moves.push(Move::new(from, to));
        }
    }
    moves
}

/// Does `color` have at least one legal move? Stops at the first one found.
pub fn has_legal_move(board: &Board, color: Color, ctx: &MoveContext) -> bool {
    let mut scratch = board.clone();
    board.pieces(color).any(|(from, piece)| {
        pseudo_legal_destinations(piece, from, board, ctx)
            .into_iter()
            .any(|to| leaves_king_safe(&mut scratch, from, to, color))
    })
}

/// Is `mv` a pawn move onto its promotion rank?
pub fn is_promotion(board: &Board, mv: &Move) -> bool {
    matches!(
        board.piece_at(mv.from),
        Some(p) if p.kind == PieceType::Pawn && mv.to.row() == p.color.promotion_rank()
    )
}

// =========================================================================
// Self-check simulation (internal)
// =========================================================================

fn leaves_king_safe(scratch: &mut Board, from: Square, to: Square, color: Color) -> bool {
    let undo = scratch.make_move(from, to, None);
    let safe = !is_in_check(scratch, color);
    scratch.unmake_move(&undo);
    safe
}

// =========================================================================
// Tests
// =========================================================================
