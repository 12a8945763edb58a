//! Error types for hyperseg

use thiserror::Error;

/// Half-open pixel bounds `(x0, x1, y0, y1)` used in error reports.
pub type Bounds = (usize, usize, usize, usize);

/// Main error type for hyperseg operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {samples}x{lines}")]
    InvalidDimensions { samples: usize, lines: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Band {band} out of range for a cube with {bands} bands")]
    BandOutOfRange { band: usize, bands: usize },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Regions {first:?} and {second:?} do not share a border")]
    RegionsNotAdjacent { first: Bounds, second: Bounds },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for hyperseg operations
pub type Result<T> = std::result::Result<T, Error>;
