use thiserror::Error;

/// Problems with the structure of a grid template or entry list.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GridError {
    #[error("Row {row} has {found} cells, but the grid is {expected} cells wide")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Cell ({row}, {col}) is claimed by more than one entry in the same direction or by more than two entries")]
    OverlappingEntries { row: usize, col: usize },
}

/// Problems reading a word list.
#[derive(Error, Debug)]
pub enum WordListError {
    #[error("IO error, more details: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read word list {1}, more details: {0}")]
    FileReadingError(std::io::Error, String),
}
