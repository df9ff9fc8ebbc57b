//! Per-piece move, capture and coverage generation.
//!
//! None of this looks at checks; see `legality` for filtering out moves that
//! leave the mover's own king attacked.

use std::collections::BTreeSet;

use crate::board::Board;
use crate::types::*;

const ROOK_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
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

/// What a piece finds when it looks at a square
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Target {
    Empty(Point),
    Enemy(Point),
    Friendly(Point),
    OffBoard,
}

/// Which of the three square sets is being generated
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Mode {
    Moves,
    Captures,
    Covered,
}

impl Mode {
    fn accepts(&self, target: Target) -> Option<Point> {
        match (self, target) {
            (_, Target::OffBoard) => None,
            (Mode::Moves, Target::Empty(p)) => Some(p),
            (Mode::Captures, Target::Enemy(p)) => Some(p),
            (Mode::Covered, Target::Empty(p) | Target::Enemy(p) | Target::Friendly(p)) => Some(p),
            _ => None,
        }
    }
}

fn directions(piece_type: PieceType) -> &'static [(i8, i8)] {
    match piece_type {
        PieceType::Rook => &ROOK_DIRECTIONS,
        PieceType::Bishop => &BISHOP_DIRECTIONS,
        // all eight directions
        PieceType::Queen => &KING_OFFSETS,
        PieceType::Pawn | PieceType::Knight | PieceType::King => &[],
    }
}

impl Board {
    /// Empty squares the piece can move to. Includes castling for an unmoved king.
    pub fn possible_moves(&self, piece: &Piece) -> BTreeSet<Point> {
        let mut moves = self.generate(piece, Mode::Moves);
        if piece.piece_type == PieceType::King {
            moves.extend(self.castling_targets(piece));
        }
        moves
    }

    /// Squares holding an enemy piece that the piece can capture on
    pub fn possible_captures(&self, piece: &Piece) -> BTreeSet<Point> {
        self.generate(piece, Mode::Captures)
    }

    /// Squares the piece threatens, whatever stands there. Sliding pieces stop
    /// at (and include) the first occupied square. Castling never covers anything.
    pub fn covered_fields(&self, piece: &Piece) -> BTreeSet<Point> {
        self.generate(piece, Mode::Covered)
    }

    /// Is `pos` covered by any piece of color `by`
    pub fn is_field_under_attack(&self, pos: Point, by: Color) -> bool {
        self.pieces
            .iter()
            .filter(|p| p.color == by)
            .any(|p| self.covered_fields(p).contains(&pos))
    }

    fn probe(&self, piece: &Piece, candidate: Option<Point>) -> Target {
        match candidate {
            None => Target::OffBoard,
            Some(pos) => match self.piece_at(pos) {
                None => Target::Empty(pos),
                Some(other) if other.color == piece.color => Target::Friendly(pos),
                Some(_) => Target::Enemy(pos),
            },
        }
    }

    fn generate(&self, piece: &Piece, mode: Mode) -> BTreeSet<Point> {
        let pos = piece.position;
        match piece.piece_type {
            // pawns move and capture along different lines
            PieceType::Pawn => match mode {
                Mode::Moves => self.pawn_pushes(piece),
                Mode::Captures => self
                    .pawn_diagonals(piece)
                    .filter(|p| self.is_field_taken_by_enemy(*p, piece.color.other_color()))
                    .collect(),
                Mode::Covered => self.pawn_diagonals(piece).collect(),
            },
            PieceType::Knight => KNIGHT_OFFSETS
                .iter()
                .filter_map(|(dr, dc)| mode.accepts(self.probe(piece, pos.offset(*dr, *dc))))
                .collect(),
            PieceType::King => KING_OFFSETS
                .iter()
                .filter_map(|(dr, dc)| mode.accepts(self.probe(piece, pos.offset(*dr, *dc))))
                .collect(),
            PieceType::Rook | PieceType::Bishop | PieceType::Queen => {
                let mut squares = BTreeSet::new();
                for (dr, dc) in directions(piece.piece_type) {
                    let mut current = pos;
                    loop {
                        let target = self.probe(piece, current.offset(*dr, *dc));
                        if let Some(p) = mode.accepts(target) {
                            squares.insert(p);
                        }
                        match target {
                            Target::Empty(next) => current = next,
                            _ => break,
                        }
                    }
                }
                squares
            }
        }
    }

    fn pawn_diagonals<'a>(&'a self, piece: &'a Piece) -> impl Iterator<Item = Point> + 'a {
        let dr = piece.color.pawn_direction();
        [-1, 1]
            .into_iter()
            .filter_map(move |dc| piece.position.offset(dr, dc))
    }

    /// One step forward onto an empty square. Two steps from the starting row
    /// for an unmoved pawn when the board allows it and both squares are empty.
    fn pawn_pushes(&self, piece: &Piece) -> BTreeSet<Point> {
        let mut moves = BTreeSet::new();
        let dr = piece.color.pawn_direction();

        if let Some(one_step) = piece.position.offset(dr, 0) {
            if self.piece_at(one_step).is_none() {
                moves.insert(one_step);

                if self.pawn_double_step()
                    && !piece.has_moved
                    && piece.position.row == piece.color.pawn_start_row()
                {
                    if let Some(two_step) = one_step.offset(dr, 0) {
                        if self.piece_at(two_step).is_none() {
                            moves.insert(two_step);
                        }
                    }
                }
            }
        }
        moves
    }

    /// Two-square king moves towards an unmoved rook of the same color on column
    /// 0 or 7, provided every square strictly between them is empty and not
    /// covered by the opponent.
    fn castling_targets(&self, king: &Piece) -> Vec<Point> {
        if king.has_moved {
            return vec![];
        }
        let row = king.position.row;
        let enemy = king.color.other_color();

        [0u8, 7u8]
            .into_iter()
            .filter(|rook_col| {
                let rook_ready = self
                    .piece_at(Point { row, col: *rook_col })
                    .is_some_and(|r| r.piece_type == PieceType::Rook && r.color == king.color && !r.has_moved);
                if !rook_ready {
                    return false;
                }
                let (low, high) = if *rook_col < king.position.col {
                    (*rook_col + 1, king.position.col)
                } else {
                    (king.position.col + 1, *rook_col)
                };
                if high - low < 2 {
                    return false;
                }
                (low..high).all(|col| {
                    let square = Point { row, col };
                    self.piece_at(square).is_none() && !self.is_field_under_attack(square, enemy)
                })
            })
            .filter_map(|rook_col| {
                if rook_col < king.position.col {
                    king.position.offset(0, -2)
                } else {
                    king.position.offset(0, 2)
                }
            })
            .collect()
    }
}
