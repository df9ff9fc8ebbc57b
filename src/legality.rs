//! Self-check prevention.
//!
//! Candidate moves are tried on the live registry through a [`Simulation`]
//! guard, which relocates the mover (and lifts a captured piece off the board)
//! when it is created and puts everything back when it is dropped, including
//! during unwinding. The guard holds the only `&mut Board` while it lives, so
//! nothing else can observe the half-moved position.

use std::collections::BTreeSet;
use std::ops::Deref;

use crate::board::Board;
use crate::types::*;

/// A speculative move on a board, reverted on drop.
pub struct Simulation<'a> {
    board: &'a mut Board,
    from: Point,
    mover_index: Option<usize>,
    // the lifted piece and the index it came from
    captured: Option<(usize, Piece)>,
}

impl<'a> Simulation<'a> {
    fn new(board: &'a mut Board, from: Point, to: Point) -> Self {
        let mover_index = board.index_of(from);
        let captured_index = if from == to { None } else { board.index_of(to) };

        if let Some(idx) = mover_index {
            board.pieces[idx].position = to;
        }
        let captured = captured_index.map(|idx| (idx, board.pieces.remove(idx)));

        Simulation {
            board,
            from,
            mover_index,
            captured,
        }
    }
}

impl Deref for Simulation<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl Drop for Simulation<'_> {
    fn drop(&mut self) {
        // re-insert first so the mover's index is valid again
        if let Some((idx, piece)) = self.captured.take() {
            self.board.pieces.insert(idx, piece);
        }
        if let Some(idx) = self.mover_index {
            self.board.pieces[idx].position = self.from;
        }
    }
}

impl Board {
    /// Tentatively move whatever stands on `from` to `to`. The board is restored
    /// when the returned guard goes out of scope.
    pub fn simulate(&mut self, from: Point, to: Point) -> Simulation<'_> {
        Simulation::new(self, from, to)
    }

    /// Is the king of `color` attacked by any enemy piece's captures.
    /// A side without a king is never in check.
    pub fn is_king_in_check(&self, color: Color) -> bool {
        match self.get_king(color) {
            Some(king) => {
                let king_position = king.position;
                self.pieces
                    .iter()
                    .filter(|p| p.color != color)
                    .any(|p| self.possible_captures(p).contains(&king_position))
            }
            None => false,
        }
    }

    /// Would moving the piece on `from` to `to` leave `color`'s king in check
    pub fn will_move_cause_check(&mut self, color: Color, from: Point, to: Point) -> bool {
        let simulation = self.simulate(from, to);
        simulation.is_king_in_check(color)
    }

    /// The candidates that do not leave `mover`'s king in check.
    pub fn legal_subset(
        &mut self,
        candidates: impl IntoIterator<Item = Point>,
        mover: Color,
        from: Point,
    ) -> BTreeSet<Point> {
        candidates
            .into_iter()
            .filter(|to| !self.will_move_cause_check(mover, from, *to))
            .collect()
    }

    /// Legal moves and legal captures of the piece standing on `at`, in that order.
    /// Both sets are empty when the square is empty.
    pub fn legal_moves_for(&mut self, at: Point) -> (BTreeSet<Point>, BTreeSet<Point>) {
        let piece = match self.piece_at(at) {
            Some(piece) => *piece,
            None => return (BTreeSet::new(), BTreeSet::new()),
        };
        let moves = self.possible_moves(&piece);
        let captures = self.possible_captures(&piece);
        (
            self.legal_subset(moves, piece.color, at),
            self.legal_subset(captures, piece.color, at),
        )
    }

    /// Every legal move of side `color`
    pub fn legal_moves(&mut self, color: Color) -> Vec<Move> {
        let movers: Vec<Piece> = self
            .pieces
            .iter()
            .filter(|p| p.color == color)
            .copied()
            .collect();

        let mut moves = Vec::new();
        for piece in movers {
            let (quiet, captures) = self.legal_moves_for(piece.position);
            moves.extend(quiet.into_iter().map(|to| Move::new(piece, to, None)));
            moves.extend(
                captures
                    .into_iter()
                    .map(|to| Move::new(piece, to, self.piece_at(to).copied())),
            );
        }
        moves
    }
}
