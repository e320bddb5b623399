/// Errors raised by collaborators and domain parsing.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Reading from or writing to the script store failed.
    #[error("Repository error: {0}")]
    Repository(String),

    /// A resource-access session could not be opened or used.
    #[error("Session error: {0}")]
    Session(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
