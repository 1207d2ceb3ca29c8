//! Static scoring of positions at the search horizon
//!
//! Scores are always given from the agent's point of view: the agent is the
//! maximizing side of the search, so a larger score is a better position for
//! the agent regardless of whose turn it is.

use crate::board::{Board, Mark};

/// Score of a four-in-a-row for the agent, before the token penalty
pub const WIN_SCORE: i32 = 1000;
/// Score of a four-in-a-row for the opponent, before the token penalty
pub const LOSS_SCORE: i32 = -WIN_SCORE;
/// Score of a full board without a winner, before the token penalty
pub const DRAW_SCORE: i32 = 100;

/// How a position ended, as far as the caller has determined
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Outcome {
    /// No alignment and at least one legal column
    Ongoing,
    /// The side that moved last completed an alignment
    Win,
    /// No legal column remains and nobody has won
    Draw,
}

/// Weights of the patterns counted by the heuristic
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct EvalWeights {
    /// A window of four holding exactly three agent tiles
    pub own_three: i32,
    /// A window of four holding exactly three opponent tiles
    pub opponent_three: i32,
    /// Two adjacent agent tiles
    pub own_pair: i32,
    /// Two adjacent opponent tiles
    pub opponent_pair: i32,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            own_three: 30,
            opponent_three: -30,
            own_pair: 5,
            opponent_pair: -2,
        }
    }
}

impl EvalWeights {
    /// Sums the pattern weights over every window of the board. Overlapping
    /// windows each count, so positions with several threats score higher.
    pub fn heuristic(&self, board: &Board, agent: Mark) -> i32 {
        let opponent = agent.opponent();
        let mut score = 0;

        for window in board.windows::<4>() {
            let own = window.iter().filter(|&&m| m == agent).count();
            let theirs = window.iter().filter(|&&m| m == opponent).count();
            if own == 3 {
                score += self.own_three;
            } else if theirs == 3 {
                score += self.opponent_three;
            }
        }

        for [first, second] in board.windows::<2>() {
            if first == second {
                if first == agent {
                    score += self.own_pair;
                } else if first == opponent {
                    score += self.opponent_pair;
                }
            }
        }

        score
    }
}

/// Scores `board` for `agent`
///
/// `agent_to_move` tells whose turn it is on `board`; for a won position the
/// winner is the other side, the one that just moved. Every branch subtracts
/// the number of tiles on the board, in the direction that favours quicker
/// wins and slower losses. Heuristic scores are kept strictly between the
/// loss and win scores of a board with the same number of tiles.
pub fn evaluate(
    board: &Board,
    agent: Mark,
    agent_to_move: bool,
    outcome: Outcome,
    weights: &EvalWeights,
) -> i32 {
    let tokens = board.total_tokens() as i32;
    match outcome {
        Outcome::Win if agent_to_move => LOSS_SCORE + tokens,
        Outcome::Win => WIN_SCORE - tokens,
        Outcome::Draw => DRAW_SCORE - tokens,
        Outcome::Ongoing => (weights.heuristic(board, agent) - tokens)
            .clamp(LOSS_SCORE + tokens + 1, WIN_SCORE - tokens - 1),
    }
}
