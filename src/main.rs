//! Play through the click interface from the terminal.
//!
//! Usage: cargo run --release -- --plies 40 --seed 7
//!        cargo run --release -- --interactive --double-step

use std::io::{self, BufRead, Write};
use std::time::Instant;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use rand::prelude::*;
use rand::rngs::StdRng;

use chess_rules::game::*;

#[derive(Parser, Debug)]
#[command(name = "chess_rules")]
#[command(about = "Drive a chess game through square clicks")]
struct Args {
    /// Let unmoved pawns advance two squares
    #[arg(long)]
    double_step: bool,

    /// Do not print the game log
    #[arg(long)]
    silent: bool,

    /// Number of random plies to play
    #[arg(short, long, default_value_t = 20)]
    plies: usize,

    /// Seed for the random playout
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Read `row col` clicks from stdin instead of playing randomly
    #[arg(short, long)]
    interactive: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let mut game = Game::with_config(GameConfig {
        pawn_double_step: args.double_step,
        silent: args.silent,
    });

    if args.interactive {
        play_interactive(&mut game)
    } else {
        play_random(&mut game, args.plies, args.seed)
    }
}

fn play_random(game: &mut Game, plies: usize, seed: u64) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let now = Instant::now();

    for _ in 0..plies {
        let moves = game.legal_moves();
        let Some(m) = moves.choose(&mut rng) else {
            println!("{} has no legal moves", game.current_turn().to_human());
            break;
        };

        game.select_square(m.from.row as i32, m.from.col as i32);
        match game.attempt_move(m.to.row as i32, m.to.col as i32)? {
            MoveOutcome::Moved(_) => {}
            MoveOutcome::Ignored => return Err(eyre!("legal move {} was ignored", m.to_human())),
        }
    }

    game.board().draw_to_terminal();
    println!(
        "{} plies in {:.3}s ({}ms since the game started), {} to move",
        game.move_count(),
        now.elapsed().as_secs_f32(),
        game.elapsed().num_milliseconds(),
        game.current_turn().to_human()
    );
    Ok(())
}

fn play_interactive(game: &mut Game) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    game.board().draw_to_terminal();
    prompt(game, &mut stdout)?;

    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line == "quit" {
            break;
        }

        let coords: Vec<i32> = line.split_whitespace().filter_map(|s| s.parse().ok()).collect();
        let &[row, col] = coords.as_slice() else {
            println!("expected `row col`, got `{line}`");
            prompt(game, &mut stdout)?;
            continue;
        };

        match game.click(row, col)? {
            ClickOutcome::Selection(SelectionResult::Selected(selection)) => {
                let targets: Vec<String> = selection
                    .legal_moves
                    .iter()
                    .chain(selection.legal_captures.iter())
                    .map(|p| p.to_string())
                    .collect();
                println!("targets: {}", targets.join(" "));
            }
            ClickOutcome::Selection(SelectionResult::OpponentPiece) => {
                println!("not your piece");
            }
            ClickOutcome::Selection(SelectionResult::Empty) => {}
            ClickOutcome::Move(MoveOutcome::Moved(m)) => {
                println!("{}", m.to_human());
                game.board().draw_to_terminal();
                let turn = game.current_turn();
                if game.king_checked(turn) {
                    println!("{} is in check", turn.to_human());
                }
            }
            ClickOutcome::Move(MoveOutcome::Ignored) => {
                println!("selection dropped");
            }
        }
        prompt(game, &mut stdout)?;
    }
    Ok(())
}

fn prompt(game: &Game, stdout: &mut io::Stdout) -> Result<()> {
    print!("{}> ", game.current_turn().to_human());
    stdout.flush()?;
    Ok(())
}
