use thiserror::Error;

/// Errors raised by moves on a [`Board`](crate::board::Board)
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
pub enum BoardError {
    /// The column has no empty cell left; the board was not modified
    #[error("column {column} is full")]
    ColumnFull { column: usize },
}
