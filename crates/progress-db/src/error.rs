use thiserror::Error;

/// Every data-access operation reports failure through this one type.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("record not found")]
    NotFound,

    #[error("constraint violated: {0}")]
    Constraint(String),

    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("database request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote database error: {0}")]
    Remote(String),

    #[error("unexpected database response: {0}")]
    Protocol(String),

    #[error("invalid database url '{0}'")]
    InvalidUrl(String),

    #[error("connection lock poisoned: {0}")]
    Poisoned(String),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DbError::Constraint(msg.unwrap_or_else(|| e.to_string()))
            }
            other => DbError::Sqlite(other),
        }
    }
}
