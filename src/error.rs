use std::path::PathBuf;

use crate::grid::GridLocation;

/// Everything that can go wrong between reading a terrain and returning a flood map.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("grid has no cells")]
    EmptyGrid,

    #[error("row {row} has {found} columns, expected {expected}")]
    NotRectangular {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("source {source_loc} out of range for {rows}x{cols} grid")]
    SourceOutOfBounds {
        source_loc: GridLocation,
        rows: usize,
        cols: usize,
    },

    #[error("invalid dimension sizes {rows} and {cols}")]
    InvalidDimensions { rows: i64, cols: i64 },

    #[error("{cells} cells exceeds the limit of {max}")]
    TooManyCells { cells: u64, max: usize },

    #[error("invalid number of sources: {0}")]
    InvalidSourceCount(i64),

    #[error("expected {expected} heights, found {found}")]
    MissingHeights { expected: usize, found: usize },

    #[error("line {line}: cannot parse {value:?}")]
    Parse { line: usize, value: String },

    #[error("unexpected end of terrain data at line {0}")]
    UnexpectedEof(usize),

    #[error("remote terrain source {0} is not supported")]
    RemoteSource(String),

    #[error("{path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
