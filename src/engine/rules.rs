//! Per-piece movement rules.
//!
//! Each predicate answers whether a single `(from, to)` move is physically
//! possible for one kind of piece on a given board. None of them look at
//! whose turn it is or whether the mover's own king ends up in check; the
//! move generator filters for that afterwards.

use crate::engine::attacks::{bishop_reaches, is_square_attacked, rook_reaches, tables};
use crate::engine::board::Board;
use crate::engine::types::{Color, MoveContext, Piece, PieceType, Square};

/// Is moving the piece on `from` to `to` allowed by that piece's rule?
///
/// Rejects up front: an empty `from`, `from == to`, and a destination held
/// by a piece of the mover's own colour.
pub fn is_valid_move(board: &Board, from: Square, to: Square, ctx: &MoveContext) -> bool {
    let Some(piece) = board.piece_at(from) else {
        return false;
    };
    if from == to {
        return false;
    }
    if let Some(target) = board.piece_at(to)
        && target.color == piece.color
    {
        return false;
    }
    is_valid_for_piece(board, piece, from, to, ctx)
}

/// Dispatch to the per-kind rule. Assumes the friendly-fire check is done.
pub fn is_valid_for_piece(
    board: &Board,
    piece: Piece,
    from: Square,
    to: Square,
    ctx: &MoveContext,
) -> bool {
    match piece.kind {
        PieceType::Pawn => is_valid_pawn_move(board, piece.color, from, to, ctx.en_passant),
        PieceType::Knight => is_valid_knight_move(from, to),
        PieceType::Bishop => bishop_reaches(board, from, to),
        PieceType::Rook => rook_reaches(board, from, to),
        PieceType::Queen => rook_reaches(board, from, to) || bishop_reaches(board, from, to),
        PieceType::King => is_valid_king_move(board, piece.color, from, to, ctx),
    }
}

// =========================================================================
// Pawn
// =========================================================================

pub fn is_valid_pawn_move(
    board: &Board,
    color: Color,
    from: Square,
    to: Square,
    en_passant: Option<Square>,
) -> bool {
    let dir = color.forward();
    let dr = to.row() as i8 - from.row() as i8;
    let dc = from.col().abs_diff(to.col());

    // Single step.
    if dc == 0 && dr == dir {
        return board.is_empty(to);
    }

    // Double step from the starting rank.
    if dc == 0 && dr == 2 * dir && from.row() == color.pawn_rank() {
        return match from.offset(dir, 0) {
            Some(mid) => board.is_empty(mid) && board.is_empty(to),
            None => false,
        };
    }

    if dc == 1 && dr == dir {
        match board.piece_at(to) {
            Some(target) => return target.color != color,
            // Capture by exception onto the skipped square.
            None => return en_passant == Some(to),
        }
    }

    false
}

// =========================================================================
// Knight
// =========================================================================

pub fn is_valid_knight_move(from: Square, to: Square) -> bool {
    let dr = from.row().abs_diff(to.row());
    let dc = from.col().abs_diff(to.col());
    (dr == 1 && dc == 2) || (dr == 2 && dc == 1)
}

// =========================================================================
// King
// =========================================================================

pub fn is_valid_king_move(
    board: &Board,
    color: Color,
    from: Square,
    to: Square,
    ctx: &MoveContext,
) -> bool {
    if tables().king_targets(from).contains(&to) {
        return !is_square_attacked(board, to, !color);
    }

    let dr = from.row().abs_diff(to.row());
    let dc = from.col().abs_diff(to.col());
    if dr == 0 && dc == 2 {
        return is_valid_castle(board, color, from, to, ctx);
    }

    false
}

/// Castling: king steps two squares toward an unmoved rook.
///
/// Every clause must hold: king on its home square and unmoved, the rook on
/// that side unmoved and present, every square between them empty, the king
/// not in check, and no square the king crosses or lands on attacked.
fn is_valid_castle(
    board: &Board,
    color: Color,
    from: Square,
    to: Square,
    ctx: &MoveContext,
) -> bool {
    let rank = color.back_rank();
    if from != Square::new(rank, 4) {
        return false;
    }

    let king_side = to.col() > from.col();
    let rights_ok = if king_side {
        ctx.castling.can_castle_kingside(color)
    } else {
        ctx.castling.can_castle_queenside(color)
    };
    if !rights_ok {
        return false;
    }

    let rook_sq = Square::new(rank, if king_side { 7 } else { 0 });
    if board.piece_at(rook_sq) != Some(Piece::new(PieceType::Rook, color)) {
        return false;
    }

    let (lo, hi) = if king_side { (5, 6) } else { (1, 3) };
    if (lo..=hi).any(|col| !board.is_empty(Square::new(rank, col))) {
        return false;
    }

    let them = !color;
    if is_square_attacked(board, from, them) {
        return false;
    }

    // Transit square and destination.
    let step: i8 = if king_side { 1 } else { -1 };
    [from.offset(0, step), Some(to)]
        .into_iter()
        .flatten()
        .all(|sq| !is_square_attacked(board, sq, them))
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::CastlingRights;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn board(placement: &str) -> Board {
        Board::from_placement(placement).unwrap()
    }

    fn ctx() -> MoveContext {
        MoveContext {
            en_passant: None,
            castling: CastlingRights::INITIAL,
        }
    }

    fn valid(b: &Board, from: &str, to: &str) -> bool {
        is_valid_move(b, sq(from), sq(to), &ctx())
    }

    // -------------------------------------------------------------------
    // Gatekeeping
    // -------------------------------------------------------------------

    #[test]
    fn empty_source_rejected() {
        assert!(!valid(&Board::starting(), "e4", "e5"));
    }

    #[test]
    fn friendly_fire_rejected() {
        let b = Board::starting();
        assert!(!valid(&b, "a1", "a2"));
        assert!(!valid(&b, "d1", "e1"));
        assert!(!valid(&b, "g1", "e2"));
    }

    #[test]
    fn null_move_rejected() {
        assert!(!valid(&Board::starting(), "g1", "g1"));
    }

    // -------------------------------------------------------------------
    // Pawn
    // -------------------------------------------------------------------

    #[test]
    fn pawn_single_and_double_step() {
        let b = Board::starting();
        assert!(valid(&b, "e2", "e3"));
        assert!(valid(&b, "e2", "e4"));
        assert!(!valid(&b, "e2", "e5"));
        assert!(valid(&b, "d7", "d6"));
        assert!(valid(&b, "d7", "d5"));
    }

    #[test]
    fn pawn_never_moves_backward() {
        let b = board("4k3/8/8/8/4P3/8/8/4K3");
        assert!(!valid(&b, "e4", "e3"));
        assert!(valid(&b, "e4", "e5"));
    }

    #[test]
    fn pawn_double_step_only_from_start() {
        let b = board("4k3/8/8/8/8/4P3/8/4K3");
        assert!(!valid(&b, "e3", "e5"));
    }

    #[test]
    fn pawn_blocked_forward() {
        let b = board("4k3/8/8/8/8/4p3/4P3/4K3");
        assert!(!valid(&b, "e2", "e3"));
        assert!(!valid(&b, "e2", "e4"));

        let b = board("4k3/8/8/8/4p3/8/4P3/4K3");
        assert!(valid(&b, "e2", "e3"));
        assert!(!valid(&b, "e2", "e4"));
    }

    #[test]
    fn pawn_captures_diagonally_only_enemies() {
        let b = board("4k3/8/8/8/8/3p1N2/4P3/4K3");
        assert!(valid(&b, "e2", "d3"));
        assert!(!valid(&b, "e2", "f3"));
        // Diagonal onto an empty square without an en-passant target.
        let b = board("4k3/8/8/8/8/8/4P3/4K3");
        assert!(!valid(&b, "e2", "d3"));
    }

    #[test]
    fn pawn_en_passant_target() {
        let b = board("4k3/8/8/3pP3/8/8/8/4K3");
        let with_ep = MoveContext {
            en_passant: Some(sq("d6")),
            castling: CastlingRights::NONE,
        };
        assert!(is_valid_move(&b, sq("e5"), sq("d6"), &with_ep));
        assert!(!is_valid_move(&b, sq("e5"), sq("d6"), &ctx()));
        assert!(!is_valid_move(&b, sq("e5"), sq("f6"), &with_ep));
    }

    // -------------------------------------------------------------------
    // Leapers and sliders
    // -------------------------------------------------------------------

    #[test]
    fn knight_l_shapes() {
        let b = Board::starting();
        assert!(valid(&b, "g1", "f3"));
        assert!(valid(&b, "g1", "h3"));
        assert!(!valid(&b, "g1", "g3"));
        assert!(is_valid_knight_move(sq("d4"), sq("e6")));
        assert!(!is_valid_knight_move(sq("d4"), sq("f6")));
    }

    #[test]
    fn bishop_needs_clear_diagonal() {
        let b = board("4k3/8/8/8/8/2p5/8/B3K3");
        assert!(valid(&b, "a1", "b2"));
        assert!(valid(&b, "a1", "c3"));
        assert!(!valid(&b, "a1", "d4"));
        assert!(!valid(&b, "a1", "a2"));
    }

    #[test]
    fn rook_needs_clear_line() {
        let b = board("4k3/8/8/8/R2p4/8/8/4K3");
        assert!(valid(&b, "a4", "c4"));
        assert!(valid(&b, "a4", "d4"));
        assert!(!valid(&b, "a4", "e4"));
        assert!(valid(&b, "a4", "a1"));
        assert!(!valid(&b, "a4", "b5"));
    }

    #[test]
    fn queen_is_rook_or_bishop() {
        let b = board("4k3/8/8/8/3Q4/8/8/4K3");
        assert!(valid(&b, "d4", "d8"));
        assert!(valid(&b, "d4", "h8"));
        assert!(valid(&b, "d4", "a4"));
        assert!(!valid(&b, "d4", "e6"));
    }

    // -------------------------------------------------------------------
    // King
    // -------------------------------------------------------------------

    #[test]
    fn king_cannot_step_into_attack() {
        let b = board("4k3/8/8/8/8/8/r7/4K3");
        assert!(!valid(&b, "e1", "e2"));
        assert!(valid(&b, "e1", "f1"));
    }

    #[test]
    fn king_cannot_jump() {
        let b = board("4k3/8/8/8/8/8/8/4K3");
        assert!(!valid(&b, "e1", "e3"));
        assert!(!valid(&b, "e1", "c3"));
    }

    // -------------------------------------------------------------------
    // Castling: each clause on its own
    // -------------------------------------------------------------------

    const CASTLE_READY: &str = "r3k2r/8/8/8/8/8/8/R3K2R";

    #[test]
    fn castling_both_sides_when_clear() {
        let b = board(CASTLE_READY);
        assert!(valid(&b, "e1", "g1"));
        assert!(valid(&b, "e1", "c1"));
        assert!(valid(&b, "e8", "g8"));
        assert!(valid(&b, "e8", "c8"));
    }

    #[test]
    fn castling_forbidden_after_king_moved() {
        let b = board(CASTLE_READY);
        let mut c = ctx();
        c.castling.white.king_moved = true;
        assert!(!is_valid_move(&b, sq("e1"), sq("g1"), &c));
        assert!(!is_valid_move(&b, sq("e1"), sq("c1"), &c));
        assert!(is_valid_move(&b, sq("e8"), sq("g8"), &c));
    }

    #[test]
    fn castling_forbidden_after_rook_moved() {
        let b = board(CASTLE_READY);
        let mut c = ctx();
        c.castling.white.king_side_rook_moved = true;
        assert!(!is_valid_move(&b, sq("e1"), sq("g1"), &c));
        assert!(is_valid_move(&b, sq("e1"), sq("c1"), &c));
    }

    #[test]
    fn castling_forbidden_when_path_occupied() {
        let b = board("r3k2r/8/8/8/8/8/8/RN2K1NR");
        assert!(!valid(&b, "e1", "g1"));
        assert!(!valid(&b, "e1", "c1"));
        // Only the b-file square blocked still forbids queen-side.
        let b = board("r3k2r/8/8/8/8/8/8/RN2K2R");
        assert!(!valid(&b, "e1", "c1"));
        assert!(valid(&b, "e1", "g1"));
    }

    #[test]
    fn castling_forbidden_out_of_check() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K1qR");
        assert!(!valid(&b, "e1", "c1"));
        let b = board("r3k2r/8/8/8/4r3/8/8/R3K2R");
        assert!(!valid(&b, "e1", "g1"));
        assert!(!valid(&b, "e1", "c1"));
    }

    #[test]
    fn castling_forbidden_through_attacked_square() {
        let b = board("r3kr2/8/8/8/8/8/8/R3K2R");
        assert!(!valid(&b, "e1", "g1"));
        assert!(valid(&b, "e1", "c1"));
    }

    #[test]
    fn castling_forbidden_into_attacked_square() {
        let b = board("r3k1r1/8/8/8/8/8/8/R3K2R");
        assert!(!valid(&b, "e1", "g1"));
        assert!(valid(&b, "e1", "c1"));
    }

    #[test]
    fn queen_side_b_file_may_be_attacked() {
        // Only the king's squares matter; b1 under attack is fine.
        let b = board("1r2k3/8/8/8/8/8/8/R3K3");
        assert!(valid(&b, "e1", "c1"));
    }

    #[test]
    fn castling_requires_rook_present() {
        let b = board("4k3/8/8/8/8/8/8/4K2R");
        assert!(valid(&b, "e1", "g1"));
        assert!(!valid(&b, "e1", "c1"));
    }
}
