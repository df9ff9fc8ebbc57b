use std::fmt;

use itertools::{iproduct, Itertools};
use once_cell::sync::Lazy;

use crate::error::{Result, RulesError};
use crate::types::*;

/// Classical back rank, from column 0 to column 7
pub const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

pub const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Registry built once and cloned for every new game
static STARTING_BOARD: Lazy<Board> = Lazy::new(Board::standard_setup);

/// The registry of live pieces. At most one piece stands on any square; pieces
/// leave the registry only by capture or promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub(crate) pieces: Vec<Piece>,
    pawn_double_step: bool,
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl Board {
    /// Standard 32 piece starting position
    pub fn new() -> Board {
        STARTING_BOARD.clone()
    }

    pub fn empty() -> Board {
        Board {
            pieces: Vec::new(),
            pawn_double_step: false,
        }
    }

    fn standard_setup() -> Board {
        let mut pieces = Vec::with_capacity(32);
        for color in [Color::Black, Color::White] {
            for col in 0..8 {
                pieces.push(Piece::new(
                    color,
                    PieceType::Pawn,
                    Point {
                        row: color.pawn_start_row(),
                        col,
                    },
                ));
            }
            for (col, piece_type) in BACK_RANK.iter().enumerate() {
                pieces.push(Piece::new(
                    color,
                    *piece_type,
                    Point {
                        row: color.back_row(),
                        col: col as u8,
                    },
                ));
            }
        }
        Board {
            pieces,
            pawn_double_step: false,
        }
    }

    /// Parse the piece placement field of a FEN string, row 0 (black's back rank) first.
    /// Anything after the first space is ignored.
    ///
    /// Pawns, rooks and kings standing off their home squares are marked as moved,
    /// so castling is only ever offered from the starting squares.
    pub fn from_placement(placement: &str) -> Result<Board> {
        let placement = placement.split_whitespace().next().unwrap_or("");
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return Err(RulesError::InvalidPlacement(format!(
                "expected 8 rows, found {}",
                rows.len()
            )));
        }

        let mut board = Board::empty();
        for (row, row_str) in rows.iter().enumerate() {
            let mut col: u32 = 0;
            for piece_char in row_str.chars() {
                if let Some(skip) = piece_char.to_digit(10) {
                    col += skip;
                    continue;
                }
                if col >= 8 {
                    return Err(RulesError::InvalidPlacement(format!(
                        "row {row} is longer than 8 squares"
                    )));
                }
                let position = Point {
                    row: row as u8,
                    col: col as u8,
                };
                let mut piece = Piece::from_char(piece_char, position).ok_or_else(|| {
                    RulesError::InvalidPlacement(format!("unexpected char {piece_char}"))
                })?;
                if piece.piece_type.tracks_moves() && !piece.is_on_home_square() {
                    piece.has_moved = true;
                }
                board.pieces.push(piece);
                col += 1;
            }
            if col != 8 {
                return Err(RulesError::InvalidPlacement(format!(
                    "row {row} covers {col} squares"
                )));
            }
        }
        Ok(board)
    }

    pub fn to_placement(&self) -> String {
        (0..8u8)
            .map(|row| {
                let mut row_str = String::new();
                let mut empty = 0;
                for col in 0..8u8 {
                    match self.piece_at(Point { row, col }) {
                        Some(p) => {
                            if empty > 0 {
                                row_str.push_str(&empty.to_string());
                                empty = 0;
                            }
                            row_str.push(p.to_char());
                        }
                        None => empty += 1,
                    }
                }
                if empty > 0 {
                    row_str.push_str(&empty.to_string());
                }
                row_str
            })
            .join("/")
    }

    pub fn with_pawn_double_step(mut self, enabled: bool) -> Board {
        self.pawn_double_step = enabled;
        self
    }

    pub fn pawn_double_step(&self) -> bool {
        self.pawn_double_step
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece_at(&self, pos: Point) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.position == pos)
    }

    /// Lookup by raw coordinates; off-board coordinates hold no piece.
    pub fn piece_at_rc(&self, row: i32, col: i32) -> Option<&Piece> {
        Point::new(row, col).and_then(|pos| self.piece_at(pos))
    }

    fn piece_at_mut(&mut self, pos: Point) -> Option<&mut Piece> {
        self.pieces.iter_mut().find(|p| p.position == pos)
    }

    pub(crate) fn index_of(&self, pos: Point) -> Option<usize> {
        self.pieces.iter().position(|p| p.position == pos)
    }

    /// An off-board square is never empty.
    pub fn is_field_empty(&self, row: i32, col: i32) -> bool {
        match Point::new(row, col) {
            Some(pos) => self.piece_at(pos).is_none(),
            None => false,
        }
    }

    pub fn is_field_taken_by_enemy(&self, pos: Point, enemy_color: Color) -> bool {
        self.piece_at(pos).is_some_and(|p| p.color == enemy_color)
    }

    pub fn add_piece(&mut self, piece: Piece) -> Result<()> {
        if self.piece_at(piece.position).is_some() {
            return Err(RulesError::InvalidPlacement(format!(
                "square {} is already occupied",
                piece.position
            )));
        }
        self.pieces.push(piece);
        Ok(())
    }

    pub fn remove_piece_at(&mut self, pos: Point) -> Option<Piece> {
        self.index_of(pos).map(|idx| self.pieces.remove(idx))
    }

    pub fn get_king(&self, color: Color) -> Option<&Piece> {
        self.pieces
            .iter()
            .find(|p| p.color == color && p.piece_type == PieceType::King)
    }

    /// Carry out a move on the registry: capture, castling rook hop, relocation,
    /// `has_moved` bookkeeping and promotion. Turn order is the caller's business.
    ///
    /// Everything is validated before the first mutation, so an `Err` leaves the
    /// board untouched. `promotion` is only consulted when a pawn reaches its
    /// promotion row and defaults to a queen.
    pub fn execute_move(&mut self, from: Point, to: Point, promotion: Option<PieceType>) -> Result<Move> {
        let piece = *self.piece_at(from).ok_or(RulesError::NoPieceAt { at: from })?;
        let captured = self.piece_at(to).copied();

        if captured.is_some_and(|p| p.color == piece.color) {
            return Err(RulesError::FriendlyFireCapture { at: to });
        }

        let promoted_to = if piece.piece_type == PieceType::Pawn && to.row == piece.color.promotion_row() {
            let choice = promotion.unwrap_or(PieceType::Queen);
            if !PIECES_CAN_PROMOTE_TO.contains(&choice) {
                return Err(RulesError::InvalidPromotion(choice));
            }
            Some(choice)
        } else {
            None
        };

        let mut selected_move = Move::new(piece, to, captured);

        // the rook lands on the square the king passes over
        let rook_hop = if selected_move.move_flag.is_castle() {
            let rook_from = Point {
                row: from.row,
                col: if to.col > from.col { 7 } else { 0 },
            };
            match self.piece_at(rook_from) {
                Some(rook) if rook.piece_type == PieceType::Rook && rook.color == piece.color => Some((
                    rook_from,
                    Point {
                        row: from.row,
                        col: (from.col + to.col) / 2,
                    },
                )),
                _ => return Err(RulesError::MissingCastlingRook { at: rook_from }),
            }
        } else {
            None
        };

        if captured.is_some() {
            self.remove_piece_at(to);
        }

        if let Some((rook_from, rook_to)) = rook_hop {
            if let Some(rook) = self.piece_at_mut(rook_from) {
                rook.position = rook_to;
                rook.has_moved = true;
            }
        }

        if let Some(moved) = self.piece_at_mut(from) {
            moved.position = to;
            if moved.piece_type.tracks_moves() {
                moved.has_moved = true;
            }
        }

        if let Some(piece_type) = promoted_to {
            if let Some(pawn) = self.remove_piece_at(to) {
                self.pieces.push(Piece::new(pawn.color, piece_type, to));
            }
            selected_move.move_flag = MoveFlag::Promotion(piece_type);
        }

        debug_assert!(self.is_consistent(), "two pieces share a square after {}", selected_move.to_human());
        Ok(selected_move)
    }

    /// At most one piece on any square
    pub fn is_consistent(&self) -> bool {
        self.pieces.iter().map(|p| p.position).all_unique()
    }

    pub fn draw_board(&self) -> String {
        let mut string = String::new();
        for (row, col) in iproduct!(0..8u8, 0..8u8) {
            let symbol = match self.piece_at(Point { row, col }) {
                Some(p) => p.to_symbol(),
                None => ".",
            };
            string.push_str(symbol);
            string.push(if col == 7 { '\n' } else { ' ' });
        }
        string
    }

    pub fn draw_to_terminal(&self) {
        println!("{}", self.draw_board());
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.draw_board())
    }
}
