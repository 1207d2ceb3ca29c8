use anyhow::Result;
use crossterm::{
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::io::{stdout, Write};

use connect4_minimax::{Board, Mark};

/// Draws the board to stdout with column numbers above it
pub fn display(board: &Board) -> Result<()> {
    let mut stdout = stdout();

    let cols: String = (1..=board.cols()).map(|x| x.to_string()).collect();
    stdout.queue(PrintStyledContent(style(cols + "\n")))?;

    for row in 0..board.rows() {
        for column in 0..board.cols() {
            stdout.queue(PrintStyledContent(
                style("O")
                    .attribute(Attribute::Bold)
                    .on(Color::DarkBlue)
                    .with(match board.get(row, column) {
                        Mark::PlayerOne => Color::Red,
                        Mark::PlayerTwo => Color::Yellow,
                        Mark::Empty => Color::DarkBlue,
                    }),
            ))?;
        }
        stdout.queue(PrintStyledContent(style("\n")))?;
    }
    stdout.flush()?;
    Ok(())
}
