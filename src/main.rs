use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::io::{stdin, stdout, Write};
use std::str::FromStr;
use std::time::Duration;

use connect4_minimax::{
    search::SearchReport, Game, GameState, Mark, Minimax, MoveChoice, SearchConfig, TieBreak,
};

mod display;
use display::display;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Controller {
    Human,
    Ai,
}

impl FromStr for Controller {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "ai" => Ok(Self::Ai),
            _ => Err(anyhow!("unknown controller '{}', expected human|ai", s)),
        }
    }
}

#[derive(Debug, StructOpt)]
#[structopt(about = "Connect 4 against a minimax agent")]
struct Opts {
    #[structopt(long, default_value = "human", help = "human|ai, who controls player 1")]
    player_one: Controller,

    #[structopt(long, default_value = "ai", help = "human|ai, who controls player 2")]
    player_two: Controller,

    #[structopt(short = "d", long, default_value = "4", help = "Plies searched below each move")]
    depth: usize,

    #[structopt(long, help = "Break ties between equal moves with this seed (self-play series default to one seed per game)")]
    seed: Option<u64>,

    #[structopt(long, help = "Search root moves in parallel")]
    parallel: bool,

    #[structopt(long, help = "Starting position as 1-indexed columns, e.g. 4453")]
    moves: Option<String>,

    #[structopt(long, default_value = "3000", help = "Pause between moves when both players are AI")]
    delay_ms: u64,

    #[structopt(long, help = "Play this many unattended AI vs AI games and report the results")]
    games: Option<usize>,
}

impl Opts {
    fn search_config(&self, game_index: u64) -> SearchConfig {
        let tie_break = match (self.seed, self.games) {
            (Some(seed), _) => TieBreak::Seeded(seed.wrapping_add(game_index)),
            // a deterministic series would replay the same game every time
            (None, Some(_)) => TieBreak::Seeded(game_index),
            (None, None) => TieBreak::LowestColumn,
        };
        SearchConfig::default()
            .with_depth(self.depth)
            .with_parallel(self.parallel)
            .with_tie_break(tie_break)
    }

    fn opening(&self) -> Result<Game> {
        Game::from_moves(self.moves.as_deref().unwrap_or(""))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::from_args();

    match opts.games {
        Some(games) => play_series(&opts, games),
        None => play_interactive(&opts),
    }
}

/// Asks the agent for a move for the side to play
fn agent_move(minimax: &mut Minimax, game: &Game) -> Result<(usize, SearchReport)> {
    let report = minimax.analyse(game.board(), game.to_move());
    match report.choice {
        MoveChoice::Column(column) => Ok((column + 1, report)),
        MoveChoice::Draw { .. } => Err(anyhow!("no legal moves left")),
    }
}

fn play_interactive(opts: &Opts) -> Result<()> {
    let mut game = opts.opening()?;
    let mut minimax = Minimax::new(opts.search_config(0));
    let both_ai = (opts.player_one, opts.player_two) == (Controller::Ai, Controller::Ai);

    let stdin = stdin();

    println!("Welcome to Connect 4\n");

    // game loop
    loop {
        display(game.board())?;

        match game.state() {
            GameState::Playing => {
                let (player, controller) = match game.to_move() {
                    Mark::PlayerTwo => (2, opts.player_two),
                    _ => (1, opts.player_one),
                };

                let next_move = match controller {
                    Controller::Ai => {
                        println!("AI is thinking...");
                        stdout().flush()?;

                        // slow down play if both players are AI
                        if both_ai {
                            std::thread::sleep(Duration::from_millis(opts.delay_ms));
                        }

                        let (column, report) = agent_move(&mut minimax, &game)?;
                        println!(
                            "Player {} evaluation: {}, {} positions searched",
                            player, report.score, report.nodes
                        );
                        println!("Best move: {}", column);
                        column
                    }
                    Controller::Human => {
                        print!("Player {} move input > ", player);
                        stdout().flush()?;
                        let mut input_str = String::new();
                        if stdin.read_line(&mut input_str)? == 0 {
                            // stdin closed, nobody is left to play
                            return Ok(());
                        }

                        match input_str.trim().parse::<usize>() {
                            Err(_) => {
                                println!("Invalid number: {}", input_str.trim());
                                continue;
                            }
                            Ok(column) => column,
                        }
                    }
                };

                if let Err(err) = game.play_checked(next_move) {
                    println!("{}", err);
                    // try the move again
                    continue;
                }
            }

            // end states
            GameState::PlayerOneWin => {
                println!("Player 1 wins!");
                break;
            }
            GameState::PlayerTwoWin => {
                println!("Player 2 wins!");
                break;
            }
            GameState::Draw => {
                println!("Draw!");
                break;
            }
        }
    }
    println!("Moves played: {}", game.history());
    Ok(())
}

fn play_series(opts: &Opts, games: usize) -> Result<()> {
    let progress = ProgressBar::new(games as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("Self-play: {bar:40.cyan/blue} {pos}/{len} {msg} ~{eta} remaining")
            .progress_chars("█▓▒░  "),
    );

    let (mut player_one, mut player_two, mut draws) = (0usize, 0usize, 0usize);
    for game_index in 0..games {
        let mut game = opts.opening()?;
        let mut minimax = Minimax::new(opts.search_config(game_index as u64));

        while !game.state().is_over() {
            let (column, _) = agent_move(&mut minimax, &game)?;
            game.play_checked(column)?;
        }

        match game.state() {
            GameState::PlayerOneWin => player_one += 1,
            GameState::PlayerTwoWin => player_two += 1,
            _ => draws += 1,
        }
        info!(game = game_index, moves = %game.history(), state = ?game.state(), "game finished");

        progress.set_message(&format!(
            "(P1 {} / P2 {} / draw {})",
            player_one, player_two, draws
        ));
        progress.inc(1);
    }
    progress.finish();

    println!(
        "{} games played: player 1 won {}, player 2 won {}, {} drawn",
        games, player_one, player_two, draws
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn series_games_break_ties_differently() {
        let opts = Opts::from_iter(vec!["connect4", "--games", "3"]);
        let tie_breaks: Vec<_> = (0..3).map(|i| opts.search_config(i).tie_break).collect();
        assert_eq!(
            tie_breaks,
            vec![TieBreak::Seeded(0), TieBreak::Seeded(1), TieBreak::Seeded(2)]
        );

        let opts = Opts::from_iter(vec!["connect4", "--games", "2", "--seed", "10"]);
        assert_eq!(opts.search_config(1).tie_break, TieBreak::Seeded(11));
    }

    #[test]
    pub fn interactive_play_is_deterministic_by_default() {
        let opts = Opts::from_iter(vec!["connect4"]);
        assert_eq!(opts.search_config(0).tie_break, TieBreak::LowestColumn);
        assert_eq!(opts.search_config(0).max_depth, 4);
    }
}
