//! A depth-limited minimax agent with alpha-beta pruning

use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::{
    board::{Board, Mark},
    eval::{evaluate, EvalWeights, Outcome},
    MAX_DEPTH,
};

/// Stands in for an unbounded score; real scores stay within a few thousand
const INFINITY: i32 = i32::MAX;

/// How the agent picks between root moves that score the same
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TieBreak {
    /// Visit the root moves left to right and keep the first best one
    LowestColumn,
    /// Visit the root moves in a shuffled order derived from the seed and the
    /// position, keeping the first best one
    Seeded(u64),
}

impl Default for TieBreak {
    fn default() -> Self {
        TieBreak::LowestColumn
    }
}

/// Parameters of the search
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SearchConfig {
    /// Plies searched below each root move before falling back to the heuristic
    pub max_depth: usize,
    /// Skip branches that cannot change the result. Turning this off only
    /// makes the search slower.
    pub pruning: bool,
    /// Score the root moves on the rayon thread pool
    pub parallel: bool,
    pub tie_break: TieBreak,
    pub weights: EvalWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            pruning: true,
            parallel: false,
            tie_break: TieBreak::default(),
            weights: EvalWeights::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_pruning(mut self, pruning: bool) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_weights(mut self, weights: EvalWeights) -> Self {
        self.weights = weights;
        self
    }
}

/// The decision reached for a position
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum MoveChoice {
    /// Drop a tile in this column
    Column(usize),
    /// The board is full, there is nothing to play. Holds the draw score from
    /// the agent's point of view.
    Draw { score: i32 },
}

impl MoveChoice {
    pub fn column(&self) -> Option<usize> {
        match self {
            MoveChoice::Column(column) => Some(*column),
            MoveChoice::Draw { .. } => None,
        }
    }
}

/// The result of a root search, with diagnostics
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SearchReport {
    pub choice: MoveChoice,
    /// Minimax value of the chosen move from the agent's point of view
    pub score: i32,
    /// Nodes visited to reach the decision
    pub nodes: usize,
}

/// Chooses a column for `agent` with the default configuration
pub fn select_move(board: &Board, agent: Mark) -> MoveChoice {
    Minimax::new(SearchConfig::default()).choose(board, agent)
}

/// A minimax agent
///
/// # Notes
/// The agent is always the maximizing side. Each root move is followed by
/// `max_depth` more plies, alternating between the opponent and the agent,
/// and positions at the horizon are scored with the heuristic in
/// [`eval`](crate::eval). Won and drawn positions end a line early.
///
/// Only scores are passed back up the recursion; no part of the game tree is
/// kept once a node has been scored. Every explored position is a fresh copy
/// made with [`Board::simulate_drop`], so the board passed in is never
/// modified.
#[derive(Clone, Debug)]
pub struct Minimax {
    config: SearchConfig,

    /// The number of nodes searched by this `Minimax` so far (for diagnostics only)
    pub node_count: usize,
}

impl Minimax {
    /// Creates a new agent from a search configuration
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            node_count: 0,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Picks the best column for `agent` on `board`
    pub fn choose(&mut self, board: &Board, agent: Mark) -> MoveChoice {
        self.analyse(board, agent).choice
    }

    /// Picks the best column for `agent` on `board`, reporting its score and
    /// the number of nodes visited
    pub fn analyse(&mut self, board: &Board, agent: Mark) -> SearchReport {
        assert!(!agent.is_empty(), "the agent must be one of the players");
        let start_nodes = self.node_count;
        self.node_count += 1;

        let columns = self.root_order(board);
        if columns.is_empty() {
            let score = evaluate(board, agent, true, Outcome::Draw, &self.config.weights);
            debug!(score, "no legal columns, reporting a draw");
            return SearchReport {
                choice: MoveChoice::Draw { score },
                score,
                nodes: self.node_count - start_nodes,
            };
        }

        let (best_column, best_score) = if self.config.parallel {
            self.parallel_root(board, agent, &columns)
        } else {
            self.sequential_root(board, agent, &columns)
        };

        let report = SearchReport {
            choice: MoveChoice::Column(best_column),
            score: best_score,
            nodes: self.node_count - start_nodes,
        };
        debug!(
            column = best_column,
            score = best_score,
            nodes = report.nodes,
            "search complete"
        );
        report
    }

    /// The legal columns in the order the root visits them
    fn root_order(&self, board: &Board) -> Vec<usize> {
        let mut columns = board.legal_columns();
        if let TieBreak::Seeded(seed) = self.config.tie_break {
            // vary the order between positions, not only between seeds
            let position_seed =
                seed.wrapping_add((board.total_tokens() as u64).wrapping_mul(0x9E3779B97F4A7C15));
            columns.shuffle(&mut ChaCha8Rng::seed_from_u64(position_seed));
        }
        columns
    }

    fn sequential_root(&mut self, board: &Board, agent: Mark, columns: &[usize]) -> (usize, i32) {
        let mut alpha = -INFINITY;
        let beta = INFINITY;
        let mut best_score = -INFINITY;
        let mut best_column = columns[0];

        for &column in columns {
            let child = match board.simulate_drop(column, agent) {
                Ok(child) => child,
                Err(_) => continue,
            };
            // the opponent replies to every root move
            let score = self.score_node(&child, agent, 0, false, alpha, beta);
            debug!(column, score, "root move scored");

            if score > best_score {
                best_score = score;
                best_column = column;
            }
            alpha = alpha.max(best_score);
            if self.config.pruning && beta < alpha {
                break;
            }
        }
        (best_column, best_score)
    }

    /// Scores every root move on its own thread with a full window, then
    /// picks the first best one in visiting order
    fn parallel_root(&mut self, board: &Board, agent: Mark, columns: &[usize]) -> (usize, i32) {
        let config = self.config;
        let scored: Vec<(usize, i32, usize)> = columns
            .par_iter()
            .filter_map(|&column| {
                let child = board.simulate_drop(column, agent).ok()?;
                let mut worker = Minimax::new(config);
                let score = worker.score_node(&child, agent, 0, false, -INFINITY, INFINITY);
                Some((column, score, worker.node_count))
            })
            .collect();

        let mut best_score = -INFINITY;
        let mut best_column = columns[0];
        for (column, score, nodes) in scored {
            debug!(column, score, "root move scored");
            self.node_count += nodes;
            if score > best_score {
                best_score = score;
                best_column = column;
            }
        }
        (best_column, best_score)
    }

    /// Scores `board` from the agent's point of view
    ///
    /// `maximizing` is true when the agent is the side to move on `board`.
    fn score_node(
        &mut self,
        board: &Board,
        agent: Mark,
        depth: usize,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.node_count += 1;
        let weights = &self.config.weights;

        // a won position is decided by the move that led here
        if board.has_connect_four() {
            return evaluate(board, agent, maximizing, Outcome::Win, weights);
        }
        let columns = board.legal_columns();
        if columns.is_empty() {
            return evaluate(board, agent, maximizing, Outcome::Draw, weights);
        }
        if depth == self.config.max_depth {
            return evaluate(board, agent, maximizing, Outcome::Ongoing, weights);
        }

        let mark = if maximizing { agent } else { agent.opponent() };
        let mut score = if maximizing { -INFINITY } else { INFINITY };

        for column in columns {
            let child = match board.simulate_drop(column, mark) {
                Ok(child) => child,
                Err(_) => continue,
            };
            let child_score = self.score_node(&child, agent, depth + 1, !maximizing, alpha, beta);

            if maximizing {
                score = score.max(child_score);
                alpha = alpha.max(score);
            } else {
                score = score.min(child_score);
                beta = beta.min(score);
            }
            // neither side lets the game reach this node, skip the remaining moves
            if self.config.pruning && beta < alpha {
                trace!(depth, column, alpha, beta, "cutoff");
                break;
            }
        }
        score
    }
}
