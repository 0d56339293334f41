use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Index for array lookups: White=0, Black=1.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Row delta of a pawn step. White advances toward row 0.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row holding this side's king and rooks at the start.
    #[inline]
    pub const fn back_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    /// Row holding this side's pawns at the start.
    #[inline]
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// Row on which this side's pawns promote.
    #[inline]
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// Parse "white"/"black" (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "white" | "w" => Some(Color::White),
            "black" | "b" => Some(Color::Black),
            _ => None,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceType
// ---------------------------------------------------------------------------

/// The six piece kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    /// Kinds a pawn may become on the far rank.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    #[inline]
    pub fn is_promotion_choice(self) -> bool {
        !matches!(self, PieceType::Pawn | PieceType::King)
    }

    /// Single uppercase letter for white, lowercase for black.
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parse a piece character; case selects the colour.
    pub fn from_char(c: char) -> Option<(Color, PieceType)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };
        Some((color, piece))
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceType::Pawn => write!(f, "pawn"),
            PieceType::Knight => write!(f, "knight"),
            PieceType::Bishop => write!(f, "bishop"),
            PieceType::Rook => write!(f, "rook"),
            PieceType::Queen => write!(f, "queen"),
            PieceType::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// A piece on the board. Two pieces of equal kind and colour are interchangeable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceType, color: Color) -> Self {
        Piece { kind, color }
    }

    pub fn to_char(self) -> char {
        self.kind.to_char(self.color)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.kind)
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A square on the board, stored as `row * 8 + col`.
///
/// Row 0 is Black's back rank (rank 8), row 7 is White's (rank 1);
/// column 0..7 is file a..h. Index order is row-major. Serialised as the
/// index; out-of-range indices are rejected on deserialisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Square(u8);

impl Square {
    pub const NUM: usize = 64;

    #[inline]
    pub fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < 8 && col < 8, "square out of range: ({row}, {col})");
        Square(row * 8 + col)
    }

    /// Bounds-checked constructor for signed coordinates.
    #[inline]
    pub fn try_new(row: i8, col: i8) -> Option<Self> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square(row as u8 * 8 + col as u8))
        } else {
            None
        }
    }

    #[inline]
    pub fn row(self) -> u8 {
        self.0 >> 3
    }

    #[inline]
    pub fn col(self) -> u8 {
        self.0 & 7
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The square `(dr, dc)` away, if it is on the board.
    #[inline]
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        Square::try_new(self.row() as i8 + dr, self.col() as i8 + dc)
    }

    /// All 64 squares in row-major order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    /// Parse a coordinate like "e4" (file a..h, rank 1..8).
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let col = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if col < 8 && rank < 8 {
            Some(Square::new(7 - rank, col))
        } else {
            None
        }
    }

    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.col()) as char;
        let rank = (b'8' - self.row()) as char;
        format!("{file}{rank}")
    }
}

impl TryFrom<u8> for Square {
    type Error = ChessError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        if (index as usize) < Square::NUM {
            Ok(Square(index))
        } else {
            Err(ChessError::InvalidSquare(index))
        }
    }
}

impl From<Square> for u8 {
    fn from(sq: Square) -> u8 {
        sq.0
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// A move request: from-square, to-square, and the promotion choice if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(from: Square, to: Square, promotion: PieceType) -> Self {
        Move {
            from,
            to,
            promotion: Some(promotion),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promo) = self.promotion {
            write!(f, "={}", promo.to_char(Color::Black))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CastlingRights
// ---------------------------------------------------------------------------

/// Per-side record of which castling pieces have left their home squares.
///
/// Flags only ever go from `false` to `true`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovedPieces {
    pub king_moved: bool,
    pub king_side_rook_moved: bool,
    pub queen_side_rook_moved: bool,
}

/// Castling bookkeeping for both sides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastlingRights {
    pub white: MovedPieces,
    pub black: MovedPieces,
}

impl CastlingRights {
    /// Nothing has moved yet.
    pub const INITIAL: CastlingRights = CastlingRights {
        white: MovedPieces {
            king_moved: false,
            king_side_rook_moved: false,
            queen_side_rook_moved: false,
        },
        black: MovedPieces {
            king_moved: false,
            king_side_rook_moved: false,
            queen_side_rook_moved: false,
        },
    };

    /// Every piece counts as moved; castling is never available.
    pub const NONE: CastlingRights = CastlingRights {
        white: MovedPieces {
            king_moved: true,
            king_side_rook_moved: true,
            queen_side_rook_moved: true,
        },
        black: MovedPieces {
            king_moved: true,
            king_side_rook_moved: true,
            queen_side_rook_moved: true,
        },
    };

    #[inline]
    pub fn side(&self, color: Color) -> &MovedPieces {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    #[inline]
    pub fn side_mut(&mut self, color: Color) -> &mut MovedPieces {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    #[inline]
    pub fn can_castle_kingside(&self, color: Color) -> bool {
        let s = self.side(color);
        !s.king_moved && !s.king_side_rook_moved
    }

    #[inline]
    pub fn can_castle_queenside(&self, color: Color) -> bool {
        let s = self.side(color);
        !s.king_moved && !s.queen_side_rook_moved
    }

    /// Record that a move touched `sq`, either leaving it or capturing on it.
    pub fn touch(&mut self, sq: Square) {
        for color in [Color::White, Color::Black] {
            let rank = color.back_rank();
            if sq.row() != rank {
                continue;
            }
            let side = self.side_mut(color);
            match sq.col() {
                0 => side.queen_side_rook_moved = true,
                4 => side.king_moved = true,
                7 => side.king_side_rook_moved = true,
                _ => {}
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MoveContext
// ---------------------------------------------------------------------------

/// Auxiliary state the move rules need beyond piece placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveContext {
    /// Square skipped by the previous move's two-square pawn advance.
    pub en_passant: Option<Square>,
    pub castling: CastlingRights,
}

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// Status of a game, derived after every completed move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    /// The given side is in check and has a reply.
    Check { side: Color },
    Checkmate { winner: Color },
    Stalemate,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::InProgress => "in_progress",
            GameStatus::Check { .. } => "check",
            GameStatus::Checkmate { .. } => "checkmate",
            GameStatus::Stalemate => "stalemate",
        }
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, GameStatus::Checkmate { .. } | GameStatus::Stalemate)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Check { side } => write!(f, "{side} is in check"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Domain errors for the chess engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    #[error("illegal move: {from} -> {to}")]
    IllegalMove { from: Square, to: Square },

    #[error("game is already over: {0}")]
    GameOver(GameStatus),

    #[error("invalid promotion piece: {0}")]
    InvalidPromotion(PieceType),

    #[error("promotion on {0} must be resolved first")]
    PromotionPending(Square),

    #[error("no promotion is pending")]
    NoPromotionPending,

    #[error("another move is already in progress")]
    MoveInProgress,

    #[error("no legal moves available")]
    NoLegalMoves,

    #[error("square index out of range: {0}")]
    InvalidSquare(u8),

    #[error("invalid piece placement: {0}")]
    InvalidPlacement(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
