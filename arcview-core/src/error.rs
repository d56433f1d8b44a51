/// Error types for mesh loading and viewer setup
use thiserror::Error;

/// Main error type for arcview operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("no input mesh supplied")]
    MissingInput,

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result type alias for arcview operations
pub type Result<T> = std::result::Result<T, Error>;
