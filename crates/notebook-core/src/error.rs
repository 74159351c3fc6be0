use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("note not found: {0}")]
    NotFound(String),

    /// A stored timestamp could not be decoded.
    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn note_not_found(id: &str) -> Self {
        Error::NotFound(id.to_string())
    }
}
