use sqlx::error::ErrorKind;
use tracing::debug;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => classify(db.kind(), db.constraint(), db.message()),
            _ => {
                debug!(error = %err, "sqlx operation failed");
                StoreError::Unavailable(err.to_string())
            }
        }
    }
}

/// Maps a database-reported failure onto the store taxonomy.
pub(crate) fn classify(kind: ErrorKind, constraint: Option<&str>, message: &str) -> StoreError {
    debug!(?kind, ?constraint, db_message = message, "database operation failed");
    match kind {
        ErrorKind::UniqueViolation => {
            let field = match constraint {
                Some(c) if c.contains("email") => "email",
                _ => "username",
            };
            StoreError::Conflict(format!("{field} already registered"))
        }
        ErrorKind::ForeignKeyViolation => {
            StoreError::ForeignKeyViolation("owner user does not exist".into())
        }
        _ => StoreError::Unavailable(message.to_string()),
    }
}
