//! Attack detection.
//!
//! `is_square_attacked` answers "can any piece of this colour reach that
//! square?" using each attacker's own movement pattern. It knows nothing
//! about whose turn it is or about pins; callers layer those on top.
//!
//! Knight and king offsets are pre-computed per square once (via `OnceLock`)
//! and live for the lifetime of the process.

use std::sync::OnceLock;

use crate::engine::board::Board;
use crate::engine::types::{Color, Piece, PieceType, Square};

// =========================================================================
// Leaper tables
// =========================================================================

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Get a reference to the global leaper tables.
pub fn tables() -> &'static LeaperTables {
    static TABLES: OnceLock<LeaperTables> = OnceLock::new();
    TABLES.get_or_init(LeaperTables::init)
}

/// On-board knight and king destinations for every square.
pub struct LeaperTables {
    knight: Vec<Vec<Square>>,
    king: Vec<Vec<Square>>,
}

impl LeaperTables {
    fn init() -> Self {
        LeaperTables {
            knight: init_leaper(&KNIGHT_OFFSETS),
            king: init_leaper(&KING_OFFSETS),
        }
    }

    /// Squares a knight on `sq` reaches.
    #[inline]
    pub fn knight_targets(&self, sq: Square) -> &[Square] {
        &self.knight[sq.index()]
    }

    /// Squares a king on `sq` reaches with a single step.
    #[inline]
    pub fn king_targets(&self, sq: Square) -> &[Square] {
        &self.king[sq.index()]
    }
}

fn init_leaper(offsets: &[(i8, i8)]) -> Vec<Vec<Square>> {
    Square::all()
        .map(|sq| {
            let mut targets: Vec<Square> = offsets
                .iter()
                .filter_map(|&(dr, dc)| sq.offset(dr, dc))
                .collect();
            targets.sort();
            targets
        })
        .collect()
}

// =========================================================================
// Slider geometry
// =========================================================================

/// Are all squares strictly between `from` and `to` empty?
///
/// Only meaningful when the two squares share a row, column, or diagonal.
pub fn path_clear(board: &Board, from: Square, to: Square) -> bool {
    let dr = (to.row() as i8 - from.row() as i8).signum();
    let dc = (to.col() as i8 - from.col() as i8).signum();
    let mut cur = from.offset(dr, dc);
    while let Some(sq) = cur {
        if sq == to {
            return true;
        }
        if !board.is_empty(sq) {
            return false;
        }
        cur = sq.offset(dr, dc);
    }
    true
}

/// Diagonal line with a clear path.
pub fn bishop_reaches(board: &Board, from: Square, to: Square) -> bool {
    let dr = from.row().abs_diff(to.row());
    let dc = from.col().abs_diff(to.col());
    dr == dc && dr > 0 && path_clear(board, from, to)
}

/// Straight line with a clear path.
pub fn rook_reaches(board: &Board, from: Square, to: Square) -> bool {
    let same_row = from.row() == to.row();
    let same_col = from.col() == to.col();
    (same_row != same_col) && path_clear(board, from, to)
}

// =========================================================================
// Attack queries
// =========================================================================

/// Does `piece`, standing on `from`, attack `target`?
pub fn piece_attacks(board: &Board, from: Square, piece: Piece, target: Square) -> bool {
    match piece.kind {
        PieceType::Pawn => {
            // Diagonal forward, whatever stands on the target.
            target.row() as i8 == from.row() as i8 + piece.color.forward()
                && from.col().abs_diff(target.col()) == 1
        }
        PieceType::Knight => tables().knight_targets(from).contains(&target),
        PieceType::King => tables().king_targets(from).contains(&target),
        PieceType::Bishop => bishop_reaches(board, from, target),
        PieceType::Rook => rook_reaches(board, from, target),
        PieceType::Queen => {
            rook_reaches(board, from, target) || bishop_reaches(board, from, target)
        }
    }
}

/// Is `target` attacked by any piece of colour `by`?
pub fn is_square_attacked(board: &Board, target: Square, by: Color) -> bool {
    board
        .pieces(by)
        .any(|(from, piece)| piece_attacks(board, from, piece, target))
}

/// Squares holding a piece of colour `by` that attacks `target`, row-major.
pub fn attackers_of(board: &Board, target: Square, by: Color) -> Vec<Square> {
    board
        .pieces(by)
        .filter(|&(from, piece)| piece_attacks(board, from, piece, target))
        .map(|(from, _)| from)
        .collect()
}

/// Is `color`'s king attacked by the other side?
///
/// # Panics
/// If `color` has no king on the board.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    is_square_attacked(board, board.king_sq(color), !color)
}

// =========================================================================
// Tests
// =========================================================================
