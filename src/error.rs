use sqlx::error::ErrorKind;

pub type Result<T> = std::result::Result<T, SorterError>;

#[derive(Debug, thiserror::Error)]
pub enum SorterError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Integrity error: {0}")]
    Integrity(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for SorterError {
    fn from(err: reqwest::Error) -> Self {
        SorterError::Transport(err.to_string())
    }
}

impl From<std::io::Error> for SorterError {
    fn from(err: std::io::Error) -> Self {
        SorterError::Transport(err.to_string())
    }
}

impl From<sqlx::Error> for SorterError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let message = db.message();
            // SQLite reports a missing table from the prepare step, without a kind
            if message.contains("no such table") || !matches!(db.kind(), ErrorKind::Other) {
                return SorterError::Integrity(message.to_string());
            }
        }
        SorterError::Transport(err.to_string())
    }
}
