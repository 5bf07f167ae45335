use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Browser session error: {0}")]
    Session(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(String),
}
