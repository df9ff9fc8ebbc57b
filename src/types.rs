use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn from_case(c: char) -> Color {
        if c.is_uppercase() {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn other_color(&self) -> Color {
        if *self == Color::White {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn to_human(&self) -> &str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    /// Row delta of a single pawn step. White starts on row 6 and walks towards row 0.
    pub fn pawn_direction(&self) -> i8 {
        match self {
            Self::White => -1,
            Self::Black => 1,
        }
    }

    pub fn pawn_start_row(&self) -> u8 {
        match self {
            Self::White => 6,
            Self::Black => 1,
        }
    }

    /// Row on which a pawn of this color promotes (the opponent's back rank)
    pub fn promotion_row(&self) -> u8 {
        match self {
            Self::White => 0,
            Self::Black => 7,
        }
    }

    pub fn back_row(&self) -> u8 {
        match self {
            Self::White => 7,
            Self::Black => 0,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum PieceType {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceType {
    pub fn from_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'r' => Some(PieceType::Rook),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }

    /// Pieces whose `has_moved` flag matters: pawns for the first step, rooks and kings for castling.
    pub fn tracks_moves(&self) -> bool {
        match *self {
            PieceType::Pawn | PieceType::Rook | PieceType::King => true,
            PieceType::Knight | PieceType::Bishop | PieceType::Queen => false,
        }
    }

    pub fn to_human(&self) -> &str {
        match self {
            Self::Pawn => "pawn",
            Self::Rook => "rook",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Rook => 'R',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }
}

pub const PIECES_CAN_PROMOTE_TO: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

/// A square on the board. Row 0 is black's back rank, row 7 is white's.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Point {
    pub row: u8,
    pub col: u8,
}

impl Point {
    /// Checked constructor, `None` when the coordinates are off the board.
    pub fn new(row: i32, col: i32) -> Option<Point> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Point {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    pub fn offset(&self, row_delta: i8, col_delta: i8) -> Option<Point> {
        Point::new(
            self.row as i32 + row_delta as i32,
            self.col as i32 + col_delta as i32,
        )
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Piece {
    pub color: Color,
    pub piece_type: PieceType,
    pub position: Point,
    pub has_moved: bool,
}

impl Piece {
    pub fn new(color: Color, piece_type: PieceType, position: Point) -> Piece {
        Piece {
            color,
            piece_type,
            position,
            has_moved: false,
        }
    }

    pub fn from_char(piece: char, position: Point) -> Option<Piece> {
        PieceType::from_char(piece).map(|piece_type| Piece::new(Color::from_case(piece), piece_type, position))
    }

    /// Is the piece on the square it starts the game on. Only meaningful for
    /// pieces that track their moves.
    pub fn is_on_home_square(&self) -> bool {
        let pos = self.position;
        match self.piece_type {
            PieceType::Pawn => pos.row == self.color.pawn_start_row(),
            PieceType::Rook => pos.row == self.color.back_row() && (pos.col == 0 || pos.col == 7),
            PieceType::King => pos.row == self.color.back_row() && pos.col == 4,
            PieceType::Knight | PieceType::Bishop | PieceType::Queen => true,
        }
    }

    pub fn to_symbol(&self) -> &str {
        let is_white = self.color == Color::White;
        match self.piece_type {
            PieceType::Pawn => {
                if is_white {
                    "♙"
                } else {
                    "♟︎"
                }
            }
            PieceType::Rook => {
                if is_white {
                    "♖"
                } else {
                    "♜"
                }
            }
            PieceType::Knight => {
                if is_white {
                    "♘"
                } else {
                    "♞"
                }
            }
            PieceType::Bishop => {
                if is_white {
                    "♗"
                } else {
                    "♝"
                }
            }
            PieceType::Queen => {
                if is_white {
                    "♕"
                } else {
                    "♛"
                }
            }
            PieceType::King => {
                if is_white {
                    "♔"
                } else {
                    "♚"
                }
            }
        }
    }

    /// Placement character: uppercase for white, lowercase for black
    pub fn to_char(&self) -> char {
        let c = self.piece_type.to_char();
        if self.color == Color::White {
            c
        } else {
            c.to_ascii_lowercase()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveFlag {
    Regular,
    CastleKingside,
    CastleQueenside,
    /// Pawn promotion. Contains the piece promoted to
    Promotion(PieceType),
}

impl MoveFlag {
    pub fn is_castle(&self) -> bool {
        matches!(self, MoveFlag::CastleKingside | MoveFlag::CastleQueenside)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub piece: Piece,
    pub from: Point,
    pub to: Point,
    pub captured: Option<Piece>,
    pub move_flag: MoveFlag,
}

impl Move {
    pub fn new(piece: Piece, to: Point, captured: Option<Piece>) -> Self {
        let move_flag = if piece.piece_type == PieceType::King && piece.position.col.abs_diff(to.col) == 2 {
            if to.col > piece.position.col {
                MoveFlag::CastleKingside
            } else {
                MoveFlag::CastleQueenside
            }
        } else {
            MoveFlag::Regular
        };
        Self {
            piece,
            from: piece.position,
            to,
            captured,
            move_flag,
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    pub fn to_human(&self) -> String {
        let maybe_capture_str = match self.captured {
            Some(p) => format!(
                " capturing {} {} at {}",
                p.color.to_human(),
                p.piece_type.to_human(),
                p.position
            ),
            None => "".to_string(),
        };
        let maybe_promotion_str = match self.move_flag {
            MoveFlag::Promotion(promoted_to_type) => {
                format!(" promoting to {}", promoted_to_type.to_human())
            }
            _ => "".to_string(),
        };
        if let MoveFlag::CastleKingside = self.move_flag {
            return format!("{} castles kingside", self.piece.color.to_human());
        }
        if let MoveFlag::CastleQueenside = self.move_flag {
            return format!("{} castles queenside", self.piece.color.to_human());
        }
        format!(
            "{} moves {} from {} to {}{}{}",
            self.piece.color.to_human(),
            self.piece.piece_type.to_human(),
            self.from,
            self.to,
            maybe_capture_str,
            maybe_promotion_str,
        )
    }
}
