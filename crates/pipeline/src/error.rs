use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// A structural guarantee this crate itself is responsible for did not
    /// hold. Always a bug; never recoverable.
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),

    /// A chapter could not be generated within the retry budget. The run
    /// aborts: a missing chapter would leave dangling links everywhere.
    #[error("Chapter {position} ('{name}') failed after {attempts} attempts: {message}")]
    GenerationFailed {
        position: usize,
        name: String,
        attempts: u32,
        message: String,
    },

    #[error("Pipeline cancelled before chapter {position}")]
    Cancelled { position: usize },
}
