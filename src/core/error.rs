use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while sorting a single trajectory.
#[derive(Debug, Error)]
pub enum SortError {
    #[error("I/O operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed record layout, unparseable numbers or missing metadata tokens.
    #[error("malformed trajectory: {details} (at line {line})")]
    Format { line: usize, details: String },

    /// A configured bond pair points outside the frame.
    #[error("bond pair does not fit the trajectory: {0}")]
    ConfigMismatch(String),

    /// No division point, so one side of the split has nothing to classify.
    #[error("segment {0} has no frames")]
    EmptySegment(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SortError {
    /// `line` is 1-based, counted from the top of the file.
    pub fn format(line: usize, details: impl Into<String>) -> Self {
        Self::Format {
            line,
            details: details.into(),
        }
    }
}

pub type SortResult<T> = Result<T, SortError>;

/// A per-file failure, carrying the path so the batch can report and move on.
#[derive(Debug, Error)]
#[error("{}: {error}", .path.display())]
pub struct FileFailure {
    pub path: PathBuf,
    #[source]
    pub error: SortError,
}
