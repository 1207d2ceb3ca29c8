//! A game in progress: the committed board, whose turn it is and the result

use anyhow::{anyhow, Result};

use crate::board::{Board, Mark};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GameState {
    Playing,
    PlayerOneWin,
    PlayerTwoWin,
    Draw,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameState::Playing)
    }
}

/// Owns the one real board of a game
///
/// Moves are taken 1-indexed, the way players enter them, and checked before
/// they reach the board. The search never sees this board mutably; callers
/// hand it [`board`](Game::board) and apply the column it returns with
/// [`play_checked`](Game::play_checked).
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    to_move: Mark,
    history: String,
    state: GameState,
}

impl Game {
    pub fn new() -> Self {
        Self::with_board(Board::new())
    }

    /// Starts a game on an empty board of a custom size
    ///
    /// The history records one digit per move, so at most 9 columns are
    /// allowed.
    pub fn with_size(rows: usize, cols: usize) -> Self {
        assert!(cols <= 9, "a game has at most 9 columns, got {}", cols);
        Self::with_board(Board::with_size(rows, cols))
    }

    fn with_board(board: Board) -> Self {
        Self {
            board,
            to_move: Mark::PlayerOne,
            history: String::new(),
            state: GameState::Playing,
        }
    }

    /// Replays a string of 1-indexed column digits
    pub fn from_moves(moves: &str) -> Result<Self> {
        let mut game = Self::new();

        for column_char in moves.chars() {
            match column_char.to_digit(10) {
                Some(column) => {
                    let _ = game.play_checked(column as usize)?;
                }
                _ => return Err(anyhow!("could not parse '{}' as a valid move", column_char)),
            }
        }
        Ok(game)
    }

    /// Plays a 1-indexed column for the side to move and returns the new state
    pub fn play_checked(&mut self, column_one_indexed: usize) -> Result<GameState> {
        if self.state.is_over() {
            return Err(anyhow!("Invalid move, the game is already over"));
        }
        let cols = self.board.cols();
        if column_one_indexed < 1 || column_one_indexed > cols {
            return Err(anyhow!(
                "Invalid move, column {} out of range. Columns must be between 1 and {}",
                column_one_indexed,
                cols
            ));
        }
        self.board
            .drop(column_one_indexed - 1, self.to_move)
            .map_err(|_| anyhow!("Invalid move, column {} full", column_one_indexed))?;
        self.history.push_str(&column_one_indexed.to_string());

        self.state = match self.board.winner() {
            Some(Mark::PlayerOne) => GameState::PlayerOneWin,
            Some(Mark::PlayerTwo) => GameState::PlayerTwoWin,
            _ if self.board.legal_columns().is_empty() => GameState::Draw,
            _ => GameState::Playing,
        };
        self.to_move = self.to_move.opponent();

        Ok(self.state)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The mark of the side whose turn it is
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Moves played so far, as 1-indexed column digits
    pub fn history(&self) -> &str {
        &self.history
    }

    pub fn state(&self) -> GameState {
        self.state
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
