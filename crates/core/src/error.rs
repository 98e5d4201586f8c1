//! Error types for gridshade

use thiserror::Error;

/// Main error type for gridshade operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid block dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in block of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Band {band} out of range: source has {bands} band(s)")]
    BandOutOfRange { band: usize, bands: usize },

    #[error("Insufficient data: {context}")]
    InsufficientData { context: &'static str },

    #[error("Invalid configuration: {name} = {value} ({reason})")]
    InvalidConfiguration {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Malformed persisted state: {what}")]
    MalformedPersistedState { what: String },
}

/// Result type alias for gridshade operations
pub type Result<T> = std::result::Result<T, Error>;
