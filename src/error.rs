use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(code(calcache::config))]
    Config(String),

    #[error("Calendar fetch error: {0}")]
    #[diagnostic(code(calcache::fetch))]
    Fetch(String),

    #[error("Calendar source error: {0}")]
    #[diagnostic(code(calcache::source))]
    Source(String),

    #[error(transparent)]
    #[diagnostic(code(calcache::io))]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    #[diagnostic(code(calcache::other))]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Fetch(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create fetch errors
pub fn fetch_error(message: &str) -> Error {
    Error::Fetch(message.to_string())
}

/// Helper to create source format errors
pub fn source_error(message: &str) -> Error {
    Error::Source(message.to_string())
}
