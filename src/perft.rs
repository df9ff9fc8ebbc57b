use rayon::prelude::*;

use crate::board::Board;
use crate::error::Result;
use crate::types::{Color, Move};

/// Count the leaf nodes of the legal move tree, `depth` plies deep, with
/// `color` to move. Promotions always pick a queen.
pub fn run_perft_test(board: &Board, color: Color, depth: u8) -> Result<u64> {
    if depth == 0 {
        return Ok(1);
    }

    let mut board = board.clone();
    let moves = board.legal_moves(color);
    if depth == 1 {
        return Ok(moves.len() as u64);
    }

    moves
        .iter()
        .map(|m| child_nodes(&board, m, color, depth))
        .sum()
}

/// Same count, with the root moves spread over the rayon thread pool
pub fn run_perft_test_parallel(board: &Board, color: Color, depth: u8) -> Result<u64> {
    if depth <= 1 {
        return run_perft_test(board, color, depth);
    }

    let mut board = board.clone();
    let moves = board.legal_moves(color);
    moves
        .par_iter()
        .map(|m| child_nodes(&board, m, color, depth))
        .sum()
}

fn child_nodes(board: &Board, m: &Move, color: Color, depth: u8) -> Result<u64> {
    let mut child = board.clone();
    child.execute_move(m.from, m.to, None)?;
    run_perft_test(&child, color.other_color(), depth - 1)
}
