use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrawlerError>;

#[derive(Error, Debug)]
pub enum CrawlerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid glob pattern: {0}")]
    PatternError(#[from] globset::Error),

    #[error("Invalid project path: {0}")]
    InvalidPath(String),

    #[error("Invalid repository URL: {0}")]
    InvalidUrl(String),

    #[error("git {operation} failed: {message}")]
    GitError { operation: String, message: String },

    #[error("No files matched in {0}")]
    NoFiles(String),
}
