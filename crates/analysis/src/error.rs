use thiserror::Error;
use tutor_llm::LlmError;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("LLM error: {0}")]
    LlmError(#[from] LlmError),

    #[error("Analysis gave up after {attempts} attempts: {last_error}")]
    Exhausted {
        attempts: u32,
        #[source]
        last_error: LlmError,
    },

    #[error("Invalid analysis data: {0}")]
    InvalidData(String),
}
