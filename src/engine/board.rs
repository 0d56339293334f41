//! 8×8 mailbox board.
//!
//! `Board` is a plain value: 64 optional pieces plus a cached king square per
//! colour. It knows nothing about turn order or legality; it only places,
//! removes, and relocates pieces. `make_move` / `unmake_move` give the move
//! generator a cheap way to try a move and take it back on one scratch board.

use serde::{Deserialize, Serialize};

use crate::engine::types::{ChessError, Color, Piece, PieceType, Square};

/// Piece placement of the standard starting position (row 0 first).
pub const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

// ---------------------------------------------------------------------------
// Undo: saved state for reversing a trial move
// ---------------------------------------------------------------------------

/// Everything `unmake_move` needs to restore the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Undo {
    pub from: Square,
    pub to: Square,
    /// The piece as it stood on `from` (a pawn, even if it promoted).
    pub moved: Piece,
    /// Captured piece and the square it was taken from (differs from `to`
    /// for en passant).
    pub captured: Option<(Square, Piece)>,
    /// Rook relocation `(from, to)` when the move was a castle.
    pub rook: Option<(Square, Square)>,
}

impl Undo {
    #[inline]
    pub fn is_castle(&self) -> bool {
        self.rook.is_some()
    }

    #[inline]
    pub fn is_en_passant(&self) -> bool {
        matches!(self.captured, Some((sq, _)) if sq != self.to)
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Piece placement on an 8×8 grid, indexed `[row][col]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[[Option<Piece>; 8]; 8]", into = "[[Option<Piece>; 8]; 8]")]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
    /// Cached king location per colour, kept in sync by `put` / `take`.
    king_squares: [Option<Square>; 2],
}

impl Board {
    /// A board with no pieces.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
            king_squares: [None; 2],
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        Self::from_placement(STARTING_PLACEMENT).expect("starting placement is always valid")
    }

    // -----------------------------------------------------------------------
    // Piece manipulation (low-level)
    // -----------------------------------------------------------------------

    /// What piece (if any) is on a given square?
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.row() as usize][sq.col() as usize]
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.piece_at(sq).is_none()
    }

    /// Place a piece, replacing whatever stood there. Returns the replaced piece.
    pub fn put(&mut self, sq: Square, piece: Piece) -> Option<Piece> {
        let old = self.take(sq);
        self.squares[sq.row() as usize][sq.col() as usize] = Some(piece);
        if piece.kind == PieceType::King {
            self.king_squares[piece.color.index()] = Some(sq);
        }
        old
    }

    /// Remove and return the piece on a square.
    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        let old = self.squares[sq.row() as usize][sq.col() as usize].take();
        if let Some(p) = old
            && p.kind == PieceType::King
            && self.king_squares[p.color.index()] == Some(sq)
        {
            self.king_squares[p.color.index()] = None;
        }
        old
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Cached king square, or `None` if that king is not on the board.
    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.king_squares[color.index()]
    }

    /// King square for a colour.
    ///
    /// # Panics
    /// If the king is missing. A board without a king is a corrupted state,
    /// not a game outcome.
    #[inline]
    pub fn king_sq(&self, color: Color) -> Square {
        self.king_square(color).expect("king must exist")
    }

    /// All pieces of one colour with their squares, in row-major order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.piece_at(sq) {
            Some(p) if p.color == color => Some((sq, p)),
            _ => None,
        })
    }

    /// Number of pieces of the given kind and colour.
    pub fn count(&self, kind: PieceType, color: Color) -> usize {
        self.pieces(color).filter(|(_, p)| p.kind == kind).count()
    }

    // -----------------------------------------------------------------------
    // Make / Unmake move
    // -----------------------------------------------------------------------

    /// Relocate the piece on `from` to `to` with all side effects of the
    /// move's shape:
    ///
    /// - a king moving two columns also moves the matching rook;
    /// - a pawn moving diagonally onto an empty square removes the pawn it
    ///   passed (en passant);
    /// - `promotion` replaces the arriving piece.
    ///
    /// No legality checks are done here.
    ///
    /// # Panics
    /// If `from` is empty.
    pub fn make_move(&mut self, from: Square, to: Square, promotion: Option<PieceType>) -> Undo {
        let moved = self
            .take(from)
            .unwrap_or_else(|| panic!("no piece on {from} (board:\n{})", self.board_string()));

        let mut captured = self.take(to).map(|p| (to, p));

        // ---- En passant: the captured pawn sits beside the departure square ----
        if moved.kind == PieceType::Pawn && captured.is_none() && from.col() != to.col() {
            let cap_sq = Square::new(from.row(), to.col());
            captured = self.take(cap_sq).map(|p| (cap_sq, p));
        }

        // ---- Castling: move the rook ----
        let mut rook = None;
        if moved.kind == PieceType::King && from.row() == to.row() && from.col().abs_diff(to.col()) == 2 {
            let (rook_from, rook_to) = castling_rook_squares(from, to);
            if let Some(r) = self.take(rook_from) {
                self.put(rook_to, r);
                rook = Some((rook_from, rook_to));
            }
        }

        let landing = match promotion {
            Some(kind) => Piece::new(kind, moved.color),
            None => moved,
        };
        self.put(to, landing);

        Undo {
            from,
            to,
            moved,
            captured,
            rook,
        }
    }

    /// Reverse a move previously applied with `make_move`.
    pub fn unmake_move(&mut self, undo: &Undo) {
        self.take(undo.to);
        self.put(undo.from, undo.moved);

        if let Some((rook_from, rook_to)) = undo.rook
            && let Some(r) = self.take(rook_to)
        {
            self.put(rook_from, r);
        }

        if let Some((sq, p)) = undo.captured {
            self.put(sq, p);
        }
    }

    // -----------------------------------------------------------------------
    // Position setup
    // -----------------------------------------------------------------------

    /// Parse a piece-placement string: eight ranks separated by `/`, the
    /// first rank being row 0 (Black's back rank). Digits count empty squares.
    ///
    /// Requires exactly one king per side.
    pub fn from_placement(s: &str) -> Result<Self, ChessError> {
        let rows: Vec<&str> = s.trim().split('/').collect();
        if rows.len() != 8 {
            return Err(ChessError::InvalidPlacement(format!(
                "expected 8 ranks, got {}",
                rows.len()
            )));
        }

        let mut board = Board::empty();
        for (row, row_str) in rows.iter().enumerate() {
            let mut col: u8 = 0;
            for ch in row_str.chars() {
                if col > 7 {
                    return Err(ChessError::InvalidPlacement(format!(
                        "too many squares in row {row}"
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidPlacement(format!(
                            "invalid empty count '{ch}' in row {row}"
                        )));
                    }
                    col += digit as u8;
                } else if let Some((color, kind)) = PieceType::from_char(ch) {
                    board.put(Square::new(row as u8, col), Piece::new(kind, color));
                    col += 1;
                } else {
                    return Err(ChessError::InvalidPlacement(format!(
                        "invalid character '{ch}'"
                    )));
                }
            }
            if col != 8 {
                return Err(ChessError::InvalidPlacement(format!(
                    "row {row} has {col} squares instead of 8"
                )));
            }
        }

        board.validate_kings()?;
        Ok(board)
    }

    fn validate_kings(&self) -> Result<(), ChessError> {
        for color in [Color::White, Color::Black] {
            let kings = self.count(PieceType::King, color);
            if kings != 1 {
                return Err(ChessError::InvalidPlacement(format!(
                    "{color} has {kings} kings (expected 1)"
                )));
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string, row 0 (rank 8) at the top.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for row in 0..8u8 {
            s.push((b'8' - row) as char);
            s.push(' ');
            for col in 0..8u8 {
                let ch = match self.piece_at(Square::new(row, col)) {
                    Some(p) => p.to_char(),
                    None => '.',
                };
                s.push(ch);
                if col < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

impl TryFrom<[[Option<Piece>; 8]; 8]> for Board {
    type Error = ChessError;

    fn try_from(grid: [[Option<Piece>; 8]; 8]) -> Result<Self, Self::Error> {
        let mut board = Board::empty();
        for sq in Square::all() {
            if let Some(p) = grid[sq.row() as usize][sq.col() as usize] {
                board.put(sq, p);
            }
        }
        board.validate_kings()?;
        Ok(board)
    }
}

impl From<Board> for [[Option<Piece>; 8]; 8] {
    fn from(board: Board) -> Self {
        board.squares
    }
}

// ---------------------------------------------------------------------------
// Castling helpers (free functions)
// ---------------------------------------------------------------------------

/// For a castling king move, return (rook_from, rook_to).
///
/// King-side: rook h→f. Queen-side: rook a→d.
pub fn castling_rook_squares(king_from: Square, king_to: Square) -> (Square, Square) {
    let row = king_from.row();
    if king_to.col() > king_from.col() {
        (Square::new(row, 7), Square::new(row, king_to.col() - 1))
    } else {
        (Square::new(row, 0), Square::new(row, king_to.col() + 1))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn wp(kind: PieceType) -> Piece {
        Piece::new(kind, Color::White)
    }

    fn bp(kind: PieceType) -> Piece {
        Piece::new(kind, Color::Black)
    }

    #[test]
    fn starting_back_ranks() {
        let b = Board::starting();
        assert_eq!(b.piece_at(Square::new(0, 0)), Some(bp(PieceType::Rook)));
        assert_eq!(b.piece_at(Square::new(0, 4)), Some(bp(PieceType::King)));
        assert_eq!(b.piece_at(Square::new(0, 3)), Some(bp(PieceType::Queen)));
        assert_eq!(b.piece_at(Square::new(7, 4)), Some(wp(PieceType::King)));
        assert_eq!(b.piece_at(Square::new(7, 3)), Some(wp(PieceType::Queen)));
        assert_eq!(b.piece_at(Square::new(7, 6)), Some(wp(PieceType::Knight)));
    }

    #[test]
    fn starting_pawns_and_empty_middle() {
        let b = Board::starting();
        for col in 0..8 {
            assert_eq!(b.piece_at(Square::new(1, col)), Some(bp(PieceType::Pawn)));
            assert_eq!(b.piece_at(Square::new(6, col)), Some(wp(PieceType::Pawn)));
            for row in 2..6 {
                assert!(b.is_empty(Square::new(row, col)));
            }
        }
    }

    #[test]
    fn starting_piece_counts() {
        let b = Board::starting();
        for color in [Color::White, Color::Black] {
            assert_eq!(b.pieces(color).count(), 16);
            assert_eq!(b.count(PieceType::Pawn, color), 8);
            assert_eq!(b.count(PieceType::King, color), 1);
        }
    }

    #[test]
    fn king_squares_cached() {
        let b = Board::starting();
        assert_eq!(b.king_sq(Color::White), sq("e1"));
        assert_eq!(b.king_sq(Color::Black), sq("e8"));
    }

    #[test]
    fn king_cache_follows_put_and_take() {
        let mut b = Board::empty();
        assert_eq!(b.king_square(Color::White), None);
        b.put(sq("d4"), wp(PieceType::King));
        assert_eq!(b.king_square(Color::White), Some(sq("d4")));
        b.take(sq("d4"));
        assert_eq!(b.king_square(Color::White), None);
    }

    #[test]
    #[should_panic(expected = "king must exist")]
    fn missing_king_panics() {
        Board::empty().king_sq(Color::Black);
    }

    #[test]
    fn make_unmake_simple() {
        let mut b = Board::starting();
        let before = b.clone();
        let undo = b.make_move(sq("g1"), sq("f3"), None);
        assert!(b.is_empty(sq("g1")));
        assert_eq!(b.piece_at(sq("f3")), Some(wp(PieceType::Knight)));
        b.unmake_move(&undo);
        assert_eq!(b, before);
    }

    #[test]
    fn make_unmake_castle_moves_rook() {
        let mut b = Board::from_placement("r3k2r/8/8/8/8/8/8/R3K2R").unwrap();
        let before = b.clone();
        let undo = b.make_move(sq("e1"), sq("g1"), None);
        assert!(undo.is_castle());
        assert_eq!(b.piece_at(sq("g1")), Some(wp(PieceType::King)));
        assert_eq!(b.piece_at(sq("f1")), Some(wp(PieceType::Rook)));
        assert!(b.is_empty(sq("h1")));
        assert_eq!(b.king_sq(Color::White), sq("g1"));
        b.unmake_move(&undo);
        assert_eq!(b, before);

        let undo = b.make_move(sq("e8"), sq("c8"), None);
        assert_eq!(b.piece_at(sq("d8")), Some(bp(PieceType::Rook)));
        assert!(b.is_empty(sq("a8")));
        b.unmake_move(&undo);
        assert_eq!(b, before);
    }

    #[test]
    fn make_unmake_en_passant() {
        let mut b = Board::from_placement("4k3/8/8/3pP3/8/8/8/4K3").unwrap();
        let before = b.clone();
        let undo = b.make_move(sq("e5"), sq("d6"), None);
        assert!(undo.is_en_passant());
        assert!(b.is_empty(sq("d5")));
        assert_eq!(b.piece_at(sq("d6")), Some(wp(PieceType::Pawn)));
        b.unmake_move(&undo);
        assert_eq!(b, before);
    }

    #[test]
    fn make_unmake_promotion_capture() {
        let mut b = Board::from_placement("3rk3/4P3/8/8/8/8/8/4K3").unwrap();
        let before = b.clone();
        let undo = b.make_move(sq("e7"), sq("d8"), Some(PieceType::Knight));
        assert_eq!(b.piece_at(sq("d8")), Some(wp(PieceType::Knight)));
        assert_eq!(undo.captured, Some((sq("d8"), bp(PieceType::Rook))));
        b.unmake_move(&undo);
        assert_eq!(b, before);
    }

    #[test]
    fn placement_errors() {
        assert!(Board::from_placement("8/8/8").is_err());
        assert!(Board::from_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX").is_err());
        assert!(Board::from_placement("rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR").is_err());
        assert!(Board::from_placement("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQ1BNR").is_err());
        assert!(Board::from_placement("4k3/8/8/8/8/8/8/3KK3").is_err());
        assert!(Board::from_placement("4k3/8/8/8/8/8/8/4K2").is_err());
    }

    #[test]
    fn board_string_starting() {
        let s = Board::starting().board_string();
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines[0], "8 r n b q k b n r");
        assert_eq!(lines[7], "1 R N B Q K B N R");
        assert_eq!(lines[8], "  a b c d e f g h");
    }

    #[test]
    fn castling_rook_squares_both_sides() {
        assert_eq!(castling_rook_squares(sq("e1"), sq("g1")), (sq("h1"), sq("f1")));
        assert_eq!(castling_rook_squares(sq("e1"), sq("c1")), (sq("a1"), sq("d1")));
        assert_eq!(castling_rook_squares(sq("e8"), sq("g8")), (sq("h8"), sq("f8")));
        assert_eq!(castling_rook_squares(sq("e8"), sq("c8")), (sq("a8"), sq("d8")));
    }

    #[test]
    fn grid_conversion_rejects_missing_king() {
        let grid: [[Option<Piece>; 8]; 8] = Board::empty().into();
        assert!(Board::try_from(grid).is_err());
        let grid: [[Option<Piece>; 8]; 8] = Board::starting().into();
        assert_eq!(Board::try_from(grid).unwrap(), Board::starting());
    }
}
