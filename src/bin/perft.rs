//! Count legal move tree leaves from a position, depth by depth
//!
//! Usage: cargo run --release --bin perft -- --depth 4 --double-step

use std::time::Instant;

use clap::Parser;
use color_eyre::eyre::Result;

use chess_rules::board::{Board, STARTING_PLACEMENT};
use chess_rules::perft::run_perft_test_parallel;
use chess_rules::types::Color;

#[derive(Parser, Debug)]
#[command(name = "perft")]
#[command(about = "Count legal move sequences from a position")]
struct Args {
    /// Deepest ply to count
    #[arg(short, long, default_value_t = 4)]
    depth: u8,

    /// Let unmoved pawns advance two squares
    #[arg(long)]
    double_step: bool,

    /// Piece placement, rows from black's back rank down
    #[arg(long, default_value = STARTING_PLACEMENT)]
    placement: String,

    /// Start with black to move
    #[arg(long)]
    black: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let board = Board::from_placement(&args.placement)?.with_pawn_double_step(args.double_step);
    let color = if args.black { Color::Black } else { Color::White };

    board.draw_to_terminal();
    println!("{:>5} {:>15} {:>12} {:>12}", "Depth", "Nodes", "Time (ms)", "kN/s");
    println!("----------------------------------------------");

    for depth in 1..=args.depth {
        let start = Instant::now();
        let nodes = run_perft_test_parallel(&board, color, depth)?;
        let elapsed_ms = start.elapsed().as_millis();

        let knps = if elapsed_ms > 0 {
            nodes as u128 / elapsed_ms
        } else {
            nodes as u128
        };
        println!("{:>5} {:>15} {:>12} {:>12}", depth, nodes, elapsed_ms, knps);
    }
    Ok(())
}
