use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for the seqbatch crates.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum SeqBatchError {
    /// Invalid stream declaration, transform parameter or source setup.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Malformed input data, reported with the offending source and 1-based line.
    #[error("Format error in {origin} at line {line}: {message}")]
    Format {
        origin: String,
        line: usize,
        message: String,
    },

    #[error("Unknown or ambiguous stream '{name}'")]
    Lookup { name: String },

    /// A value handed to the text format encoder is not numeric tensor data.
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("I/O error at '{path}': {message}")]
    Io { path: PathBuf, message: String },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Array creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },
}

pub type Result<T> = std::result::Result<T, SeqBatchError>;

// Convenience constructors
impl SeqBatchError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn format(origin: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            origin: origin.into(),
            line,
            message: message.into(),
        }
    }

    pub fn lookup(name: impl Into<String>) -> Self {
        Self::Lookup { name: name.into() }
    }

    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
