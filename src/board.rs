//! Grid state, move application and alignment detection

use anyhow::{anyhow, Result};

use std::fmt;

use crate::{error::BoardError, CONNECT, HEIGHT, WIDTH};

/// The four orientations an alignment can run in, as (row, column) steps.
/// Rows grow downwards, so `(1, 1)` is the down-right diagonal.
static DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// The mark occupying a single cell of the grid
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Mark {
    PlayerOne,
    PlayerTwo,
    Empty,
}

impl Mark {
    pub fn is_empty(&self) -> bool {
        matches!(self, Mark::Empty)
    }

    /// The other player's mark. `Empty` has no opponent and maps to itself.
    pub fn opponent(&self) -> Mark {
        match self {
            Mark::PlayerOne => Mark::PlayerTwo,
            Mark::PlayerTwo => Mark::PlayerOne,
            Mark::Empty => Mark::Empty,
        }
    }

    /// Single character used in text diagrams
    pub fn symbol(&self) -> char {
        match self {
            Mark::PlayerOne => 'X',
            Mark::PlayerTwo => 'O',
            Mark::Empty => '.',
        }
    }

    fn from_symbol(symbol: char) -> Option<Mark> {
        match symbol {
            'X' | 'x' => Some(Mark::PlayerOne),
            'O' | 'o' => Some(Mark::PlayerTwo),
            '.' => Some(Mark::Empty),
            _ => None,
        }
    }
}

/// A Connect 4 grid
///
/// Row 0 is the top of the grid and tiles fall towards the highest row index.
/// Every column is filled contiguously from the bottom, so a column's contents
/// are fully described by its height.
///
/// Boards are plain values: [`simulate_drop`](Board::simulate_drop) returns a
/// new board and never touches the receiver, which is what the search relies
/// on to explore hypothetical moves.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Mark>, // cells are stored left-to-right, top-to-bottom
    heights: Vec<usize>,
}

impl Board {
    /// Creates an empty board of the default size
    pub fn new() -> Self {
        Self::with_size(HEIGHT, WIDTH)
    }

    /// Creates an empty board with `rows` rows and `cols` columns
    ///
    /// # Panics
    /// If either dimension is smaller than the alignment length.
    pub fn with_size(rows: usize, cols: usize) -> Self {
        assert!(
            rows >= CONNECT && cols >= CONNECT,
            "a {}x{} board cannot hold an alignment of {}",
            rows,
            cols,
            CONNECT
        );
        Self {
            rows,
            cols,
            cells: vec![Mark::Empty; rows * cols],
            heights: vec![0; cols],
        }
    }

    /// Replays a sequence of 1-indexed column digits on a default sized board,
    /// starting with player one and alternating
    pub fn from_moves<S: AsRef<str>>(moves: S) -> Result<Self> {
        let mut board = Self::new();
        let mut mark = Mark::PlayerOne;

        for column_char in moves.as_ref().chars() {
            match column_char.to_digit(10).map(|c| c as usize) {
                Some(column @ 1..=WIDTH) => {
                    // abort if the position is already won
                    if board.has_connect_four() {
                        return Err(anyhow!("Invalid position, game is over"));
                    }
                    board.drop(column - 1, mark)?;
                    mark = mark.opponent();
                }
                _ => return Err(anyhow!("could not parse '{}' as a valid move", column_char)),
            }
        }
        Ok(board)
    }

    /// Parses a text diagram, one line per row from top to bottom, using
    /// `X`, `O` and `.` for the cells. Blank lines and surrounding whitespace
    /// are ignored.
    pub fn from_diagram<S: AsRef<str>>(diagram: S) -> Result<Self> {
        let lines: Vec<&str> = diagram
            .as_ref()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let rows = lines.len();
        let cols = lines.first().map_or(0, |line| line.chars().count());
        if rows < CONNECT || cols < CONNECT {
            return Err(anyhow!("a {}x{} board is too small", rows, cols));
        }

        let mut board = Self::with_size(rows, cols);
        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(anyhow!("row {} has a different width to row 0", row));
            }
            for (column, symbol) in line.chars().enumerate() {
                let mark = Mark::from_symbol(symbol)
                    .ok_or_else(|| anyhow!("unknown cell '{}' in row {}", symbol, row))?;
                board.cells[row * cols + column] = mark;
            }
        }

        // rebuild the heights, rejecting floating tiles
        for column in 0..cols {
            let height = (0..rows)
                .rev()
                .take_while(|&row| !board.get(row, column).is_empty())
                .count();
            if (0..rows - height).any(|row| !board.get(row, column).is_empty()) {
                return Err(anyhow!("column {} has a floating tile", column));
            }
            board.heights[column] = height;
        }
        Ok(board)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The mark at `row` (counted from the top) and `column`
    pub fn get(&self, row: usize, column: usize) -> Mark {
        self.cells[row * self.cols + column]
    }

    /// The number of tiles in `column`
    pub fn height(&self, column: usize) -> usize {
        self.heights[column]
    }

    pub fn playable(&self, column: usize) -> bool {
        self.heights[column] < self.rows
    }

    /// Places `mark` in the lowest empty cell of `column`, returning the row
    /// it landed in
    ///
    /// A full column leaves the board untouched.
    ///
    /// # Panics
    /// If `column` is outside the board.
    pub fn drop(&mut self, column: usize, mark: Mark) -> Result<usize, BoardError> {
        assert!(
            column < self.cols,
            "column {} out of range, columns must be below {}",
            column,
            self.cols
        );
        debug_assert!(!mark.is_empty(), "cannot drop an empty tile");

        if !self.playable(column) {
            return Err(BoardError::ColumnFull { column });
        }
        let row = self.rows - 1 - self.heights[column];
        self.cells[row * self.cols + column] = mark;
        self.heights[column] += 1;
        Ok(row)
    }

    /// Same as [`drop`](Board::drop) but on a copy, leaving this board as it is
    pub fn simulate_drop(&self, column: usize, mark: Mark) -> Result<Board, BoardError> {
        assert!(
            column < self.cols,
            "column {} out of range, columns must be below {}",
            column,
            self.cols
        );
        if !self.playable(column) {
            return Err(BoardError::ColumnFull { column });
        }
        let mut next = self.clone();
        next.drop(column, mark)?;
        Ok(next)
    }

    /// Columns that can still take a tile, in ascending order
    pub fn legal_columns(&self) -> Vec<usize> {
        (0..self.cols).filter(|&column| self.playable(column)).collect()
    }

    pub fn total_tokens(&self) -> usize {
        self.heights.iter().sum()
    }

    pub fn is_full(&self) -> bool {
        self.total_tokens() == self.rows * self.cols
    }

    pub fn has_connect_four(&self) -> bool {
        self.winner().is_some()
    }

    /// The owner of the first four-in-a-row found, if any
    pub fn winner(&self) -> Option<Mark> {
        self.windows::<CONNECT>()
            .find(|window| !window[0].is_empty() && window.iter().all(|&m| m == window[0]))
            .map(|window| window[0])
    }

    /// Every run of `N` consecutive cells on the board, across rows, columns
    /// and both diagonals
    pub fn windows<const N: usize>(&self) -> impl Iterator<Item = [Mark; N]> + '_ {
        let (rows, cols) = (self.rows as isize, self.cols as isize);
        let span = N as isize - 1;

        DIRECTIONS.iter().flat_map(move |&(dr, dc)| {
            (0..rows)
                .flat_map(move |row| (0..cols).map(move |column| (row, column)))
                .filter(move |&(row, column)| {
                    let (end_row, end_column) = (row + dr * span, column + dc * span);
                    end_row >= 0 && end_row < rows && end_column >= 0 && end_column < cols
                })
                .map(move |(row, column)| {
                    let mut window = [Mark::Empty; N];
                    for (i, cell) in window.iter_mut().enumerate() {
                        let i = i as isize;
                        *cell = self.get((row + dr * i) as usize, (column + dc * i) as usize);
                    }
                    window
                })
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            let line: String = (0..self.cols).map(|c| self.get(row, c).symbol()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
