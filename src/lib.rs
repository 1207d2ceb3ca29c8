//! A depth-limited minimax agent for playing the board game 'Connect 4'
//!
//! The agent searches a fixed number of plies ahead with alpha-beta pruning
//! and scores the positions at the search horizon with a pattern-counting
//! heuristic.
//!
//! # Basic Usage
//!
//! ```
//! use connect4_minimax::{board::Board, search::{select_move, MoveChoice}, Mark};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! // player one has three in a row along the bottom, player two to move
//! let board = Board::from_moves("16273")?;
//! let choice = select_move(&board, Mark::PlayerTwo);
//!
//! // the engine plays the only column that does not lose on the spot
//! assert!(choice == MoveChoice::Column(3));
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod error;

pub mod board;

pub mod eval;

pub mod search;

pub mod game;

mod test;

pub use board::{Board, Mark};
pub use error::BoardError;
pub use game::{Game, GameState};
pub use search::{select_move, Minimax, MoveChoice, SearchConfig, TieBreak};

/// The default width of the game board in tiles
pub const WIDTH: usize = 7;

/// The default height of the game board in tiles
pub const HEIGHT: usize = 6;

/// The number of aligned tiles needed to win
pub const CONNECT: usize = 4;

/// The default number of plies searched below the root move
pub const MAX_DEPTH: usize = 4;

// the default board must be able to hold an alignment in every orientation
const_assert!(WIDTH >= CONNECT && HEIGHT >= CONNECT);
// columns are entered as single digits on the command line
const_assert!(WIDTH <= 9);
