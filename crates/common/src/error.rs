use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Market data could not be retrieved for a pair.
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// A chat notification could not be delivered.
    #[error("Notify error: {0}")]
    Notify(String),

    /// Fetched bars could not be turned into a classification.
    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
