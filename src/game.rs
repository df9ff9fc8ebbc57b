use chrono::prelude::*;
use std::collections::BTreeSet;

use crate::board::*;
use crate::error::Result;
use crate::types::*;

/// Picks the piece a pawn turns into when it reaches its promotion row.
///
/// Asked for both colors. Any `FnMut(Color, Point) -> PieceType` closure works.
pub trait PromotionChooser {
    fn choose(&mut self, color: Color, at: Point) -> PieceType;
}

/// Always promotes to a queen
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoQueen;

impl PromotionChooser for AutoQueen {
    fn choose(&mut self, _color: Color, _at: Point) -> PieceType {
        PieceType::Queen
    }
}

impl<F> PromotionChooser for F
where
    F: FnMut(Color, Point) -> PieceType,
{
    fn choose(&mut self, color: Color, at: Point) -> PieceType {
        self(color, at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameConfig {
    /// Let unmoved pawns advance two squares
    pub pawn_double_step: bool,
    /// Suppress the timestamped event log on stdout
    pub silent: bool,
}

/// A selected piece together with the squares it may legally go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub piece: Piece,
    pub legal_moves: BTreeSet<Point>,
    pub legal_captures: BTreeSet<Point>,
}

impl Selection {
    pub fn is_target(&self, pos: Point) -> bool {
        self.legal_moves.contains(&pos) || self.legal_captures.contains(&pos)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionResult {
    Selected(Selection),
    /// Empty or off-board square
    Empty,
    /// The piece belongs to the side not on move
    OpponentPiece,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved(Move),
    /// No selection, or the target is not a legal square for it
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Selection(SelectionResult),
    Move(MoveOutcome),
}

/// One game between two sides clicking on squares.
///
/// The game owns its board. Between clicks it is either waiting for a piece to
/// be selected or holds a [`Selection`]; the next click then either moves the
/// selected piece or drops the selection.
pub struct Game {
    board: Board,
    turn: Color,
    white_king_checked: bool,
    black_king_checked: bool,
    selection: Option<Selection>,
    chooser: Box<dyn PromotionChooser + Send>,
    config: GameConfig,
    move_count: usize,
    game_start_time: DateTime<Local>,
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Game::with_config(GameConfig::default())
    }

    pub fn new_silent() -> Self {
        Game::with_config(GameConfig {
            silent: true,
            ..GameConfig::default()
        })
    }

    pub fn with_config(config: GameConfig) -> Self {
        let mut game = Game {
            board: Board::new(),
            turn: Color::White,
            white_king_checked: false,
            black_king_checked: false,
            selection: None,
            chooser: Box::new(AutoQueen),
            config,
            move_count: 0,
            game_start_time: Local::now(),
        };
        game.initialize_game();
        game
    }

    /// Start from an arbitrary position with `turn` to move. Check flags are
    /// computed from the position.
    pub fn from_placement(placement: &str, turn: Color, config: GameConfig) -> Result<Self> {
        let board = Board::from_placement(placement)?.with_pawn_double_step(config.pawn_double_step);
        let game = Game {
            white_king_checked: board.is_king_in_check(Color::White),
            black_king_checked: board.is_king_in_check(Color::Black),
            board,
            turn,
            selection: None,
            chooser: Box::new(AutoQueen),
            config,
            move_count: 0,
            game_start_time: Local::now(),
        };
        game.log(format!("game started from {placement}, {} to move", turn.to_human()));
        Ok(game)
    }

    /// Reset to the standard starting position with white to move.
    pub fn initialize_game(&mut self) {
        self.board = Board::new().with_pawn_double_step(self.config.pawn_double_step);
        self.turn = Color::White;
        self.white_king_checked = false;
        self.black_king_checked = false;
        self.selection = None;
        self.move_count = 0;
        self.game_start_time = Local::now();
        self.log("new game");
    }

    pub fn set_promotion_chooser(&mut self, chooser: impl PromotionChooser + Send + 'static) {
        self.chooser = Box::new(chooser);
    }

    /// Select the piece on (`row`, `col`) for the side on move.
    ///
    /// Empty and off-board squares and pieces of the other side leave the game
    /// without a selection.
    pub fn select_square(&mut self, row: i32, col: i32) -> SelectionResult {
        self.selection = None;

        let piece = match self.board.piece_at_rc(row, col) {
            Some(piece) => *piece,
            None => return SelectionResult::Empty,
        };
        if piece.color != self.turn {
            return SelectionResult::OpponentPiece;
        }

        let (legal_moves, legal_captures) = self.board.legal_moves_for(piece.position);
        self.log(format!(
            "{} {} at {} selected: {} moves, {} captures",
            piece.color.to_human(),
            piece.piece_type.to_human(),
            piece.position,
            legal_moves.len(),
            legal_captures.len()
        ));

        let selection = Selection {
            piece,
            legal_moves,
            legal_captures,
        };
        self.selection = Some(selection.clone());
        SelectionResult::Selected(selection)
    }

    /// Move the selected piece to (`row`, `col`) if that is one of its legal
    /// targets. The selection is dropped either way.
    ///
    /// An `Err` means the board refused a move the legality filter let through;
    /// the board is left as it was.
    pub fn attempt_move(&mut self, row: i32, col: i32) -> Result<MoveOutcome> {
        let selection = match self.selection.take() {
            Some(selection) => selection,
            None => return Ok(MoveOutcome::Ignored),
        };

        let target = match Point::new(row, col) {
            Some(target) if selection.is_target(target) => target,
            _ => {
                self.log(format!("({row}, {col}) is not a legal target, selection dropped"));
                return Ok(MoveOutcome::Ignored);
            }
        };

        let piece = selection.piece;
        let promotion = if piece.piece_type == PieceType::Pawn && target.row == piece.color.promotion_row() {
            Some(self.chooser.choose(piece.color, target))
        } else {
            None
        };

        let executed = self.board.execute_move(piece.position, target, promotion)?;
        self.move_count += 1;
        self.turn = self.turn.other_color();

        let opponent = piece.color.other_color();
        let checked = self.board.is_king_in_check(opponent);
        match opponent {
            Color::White => self.white_king_checked = checked,
            Color::Black => self.black_king_checked = checked,
        }

        self.log(format!("move {}: {}", self.move_count, executed.to_human()));
        if checked {
            self.log(format!("{} king is in check", opponent.to_human()));
        }
        Ok(MoveOutcome::Moved(executed))
    }

    /// A click on (`row`, `col`): moves the selected piece when there is a
    /// selection, otherwise tries to select.
    pub fn click(&mut self, row: i32, col: i32) -> Result<ClickOutcome> {
        if self.selection.is_some() {
            Ok(ClickOutcome::Move(self.attempt_move(row, col)?))
        } else {
            Ok(ClickOutcome::Selection(self.select_square(row, col)))
        }
    }

    /// Every legal move of the side on move
    pub fn legal_moves(&mut self) -> Vec<Move> {
        self.board.legal_moves(self.turn)
    }

    /// The check flag recorded after the last move against `color`
    pub fn king_checked(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_king_checked,
            Color::Black => self.black_king_checked,
        }
    }

    pub fn is_king_in_check(&self, color: Color) -> bool {
        self.board.is_king_in_check(color)
    }

    pub fn piece_at(&self, row: i32, col: i32) -> Option<&Piece> {
        self.board.piece_at_rc(row, col)
    }

    pub fn is_square_empty(&self, row: i32, col: i32) -> bool {
        self.board.is_field_empty(row, col)
    }

    pub fn is_square_attacked_by(&self, row: i32, col: i32, color: Color) -> bool {
        Point::new(row, col).is_some_and(|pos| self.board.is_field_under_attack(pos, color))
    }

    pub fn current_turn(&self) -> Color {
        self.turn
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn move_count(&self) -> usize {
        self.move_count
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.game_start_time
    }

    /// Wall time since the game was started or last reset
    pub fn elapsed(&self) -> chrono::Duration {
        Local::now().signed_duration_since(self.game_start_time)
    }

    fn log(&self, message: impl AsRef<str>) {
        if !self.config.silent {
            let now = Local::now();
            let elapsed = now.signed_duration_since(self.game_start_time);
            println!(
                "[{} +{:.3}s] {}",
                now.format("%H:%M:%S"),
                elapsed.num_milliseconds() as f64 / 1000.0,
                message.as_ref()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn pt(row: u8, col: u8) -> Point {
        Point { row, col }
    }

    fn silent() -> GameConfig {
        GameConfig {
            silent: true,
            ..GameConfig::default()
        }
    }

    #[test]
    fn new_game_starts_with_white() {
        let game = Game::new_silent();
        assert_eq!(game.current_turn(), Color::White);
        assert_eq!(game.board().pieces().len(), 32);
        assert_eq!(game.move_count(), 0);
        assert!(game.selection().is_none());
        assert!(!game.king_checked(Color::White));
        assert!(!game.king_checked(Color::Black));
    }

    #[test]
    fn select_then_move() {
        let mut game = Game::new_silent();
        match game.click(6, 3).unwrap() {
            ClickOutcome::Selection(SelectionResult::Selected(selection)) => {
                assert_eq!(selection.legal_moves, [pt(5, 3)].into_iter().collect::<BTreeSet<_>>());
                assert!(selection.legal_captures.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(game.selection().is_some());

        let outcome = game.click(5, 3).unwrap();
        assert!(matches!(outcome, ClickOutcome::Move(MoveOutcome::Moved(_))));
        assert!(game.selection().is_none());
        assert_eq!(game.current_turn(), Color::Black);
        assert_eq!(game.move_count(), 1);
        assert!(game.is_square_empty(6, 3));
        assert_eq!(game.piece_at(5, 3).unwrap().piece_type, PieceType::Pawn);
    }

    #[test]
    fn attempt_without_selection_is_ignored() {
        let mut game = Game::new_silent();
        assert_eq!(game.attempt_move(5, 3).unwrap(), MoveOutcome::Ignored);
        assert_eq!(game.current_turn(), Color::White);
    }

    #[test]
    fn empty_and_off_board_squares_select_nothing() {
        let mut game = Game::new_silent();
        assert_eq!(game.select_square(4, 4), SelectionResult::Empty);
        assert_eq!(game.select_square(-1, 4), SelectionResult::Empty);
        assert_eq!(game.select_square(3, 8), SelectionResult::Empty);
        assert!(game.selection().is_none());
    }

    #[test]
    fn off_board_target_drops_selection() {
        let mut game = Game::new_silent();
        game.select_square(6, 0);
        assert_eq!(game.attempt_move(5, -1).unwrap(), MoveOutcome::Ignored);
        assert!(game.selection().is_none());
        assert_eq!(game.board(), &Board::new());
    }

    #[test]
    fn initialize_game_resets_everything() {
        let mut game = Game::new_silent();
        game.click(6, 4).unwrap();
        game.click(5, 4).unwrap();
        game.click(1, 4).unwrap();
        game.initialize_game();
        assert_eq!(game.board(), &Board::new());
        assert_eq!(game.current_turn(), Color::White);
        assert_eq!(game.move_count(), 0);
        assert!(game.selection().is_none());
    }

    #[test]
    fn start_time_resets_with_the_game() {
        let mut game = Game::new_silent();
        let first_start = game.started_at();
        assert!(game.elapsed() >= chrono::Duration::zero());

        std::thread::sleep(std::time::Duration::from_millis(5));
        let before_reset = Local::now();
        game.initialize_game();
        assert!(game.started_at() >= before_reset);
        assert!(game.started_at() > first_start);
        assert!(game.elapsed() < Local::now().signed_duration_since(first_start));
    }

    #[test]
    fn double_step_follows_config() {
        let mut game = Game::with_config(GameConfig {
            pawn_double_step: true,
            silent: true,
        });
        match game.select_square(6, 4) {
            SelectionResult::Selected(selection) => {
                assert_eq!(
                    selection.legal_moves,
                    [pt(4, 4), pt(5, 4)].into_iter().collect::<BTreeSet<_>>()
                )
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn from_placement_sets_check_flags() {
        let game = Game::from_placement("4k3/8/8/8/8/8/8/r3K3", Color::White, silent()).unwrap();
        assert!(game.king_checked(Color::White));
        assert!(!game.king_checked(Color::Black));
        assert!(game.is_square_attacked_by(7, 2, Color::Black));
        assert!(!game.is_square_attacked_by(6, 2, Color::Black));
        assert!(!game.is_square_attacked_by(8, 2, Color::Black));
    }

    #[test]
    fn from_placement_rejects_garbage() {
        assert!(Game::from_placement("4k3/8/x", Color::White, silent()).is_err());
    }

    #[test]
    fn giving_check_sets_opponent_flag() {
        // . . . . ♚ . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // ♖ . . . ♔ . . .
        let mut game = Game::from_placement("4k3/8/8/8/8/8/8/R3K3", Color::White, silent()).unwrap();
        game.click(7, 0).unwrap();
        game.click(0, 0).unwrap();
        assert!(game.king_checked(Color::Black));

        // the king steps out, the flag is cleared on the next white move only
        game.click(0, 4).unwrap();
        let outcome = game.click(1, 4).unwrap();
        assert!(matches!(outcome, ClickOutcome::Move(MoveOutcome::Moved(_))));
        assert!(game.king_checked(Color::Black));
        assert!(!game.is_king_in_check(Color::Black));

        game.click(7, 4).unwrap();
        game.click(7, 3).unwrap();
        assert!(!game.king_checked(Color::Black));
    }

    #[test]
    fn default_promotion_is_a_queen_that_gives_check() {
        // . . . . ♚ . . .
        // ♙ . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . ♔ . . .
        let mut game = Game::from_placement("4k3/P7/8/8/8/8/8/4K3", Color::White, silent()).unwrap();
        game.click(1, 0).unwrap();
        let outcome = game.click(0, 0).unwrap();
        match outcome {
            ClickOutcome::Move(MoveOutcome::Moved(m)) => {
                assert_eq!(m.move_flag, MoveFlag::Promotion(PieceType::Queen))
            }
            other => panic!("unexpected {other:?}"),
        }
        let promoted = game.piece_at(0, 0).unwrap();
        assert_eq!(promoted.piece_type, PieceType::Queen);
        assert_eq!(promoted.color, Color::White);
        assert_eq!(game.board().pieces().len(), 3);
        assert!(game.king_checked(Color::Black));
    }

    #[test]
    fn chooser_is_asked_for_both_colors() {
        let asked = Arc::new(Mutex::new(Vec::new()));
        let log = asked.clone();

        let mut game = Game::from_placement("4k3/P7/8/8/8/8/p7/4K3", Color::White, silent()).unwrap();
        game.set_promotion_chooser(move |color: Color, at: Point| {
            log.lock().unwrap().push((color, at));
            PieceType::Knight
        });

        game.click(1, 0).unwrap();
        game.click(0, 0).unwrap();
        game.click(6, 0).unwrap();
        game.click(7, 0).unwrap();

        assert_eq!(
            *asked.lock().unwrap(),
            vec![(Color::White, pt(0, 0)), (Color::Black, pt(7, 0))]
        );
        assert_eq!(game.piece_at(0, 0).unwrap().piece_type, PieceType::Knight);
        assert_eq!(game.piece_at(7, 0).unwrap().piece_type, PieceType::Knight);
        assert!(!game.king_checked(Color::White));
        assert!(!game.king_checked(Color::Black));
    }

    #[test]
    fn invalid_chooser_answer_leaves_board_untouched() {
        let mut game = Game::from_placement("4k3/P7/8/8/8/8/8/4K3", Color::White, silent()).unwrap();
        game.set_promotion_chooser(|_: Color, _: Point| PieceType::King);
        let before = game.board().clone();

        game.click(1, 0).unwrap();
        assert!(game.click(0, 0).is_err());
        assert_eq!(game.board(), &before);
        assert_eq!(game.current_turn(), Color::White);
        assert_eq!(game.move_count(), 0);
    }
}
