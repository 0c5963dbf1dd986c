use crate::patch::PatchError;
use rusqlite::Error as SqliteError;
use rusqlite::ffi;

/// Database failure, classified so handlers can pick a status code
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Foreign key constraint violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Not null constraint violation: {0}")]
    NotNullViolation(String),

    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Statement(#[from] PatchError),

    #[error("Database error: {0}")]
    Sqlite(#[source] SqliteError),
}

impl DbError {
    /// Whether the request itself caused the failure (constraint violations).
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DbError::UniqueViolation(_)
                | DbError::ForeignKeyViolation(_)
                | DbError::NotNullViolation(_)
        )
    }
}

/// Classify SQLite errors by their extended result code
pub fn handle_db_error(error: SqliteError) -> DbError {
    let classified = match &error {
        SqliteError::SqliteFailure(err, msg) => {
            let msg_str = msg.clone().unwrap_or_else(|| err.to_string());
            match err.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    Some(DbError::UniqueViolation(msg_str))
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(DbError::ForeignKeyViolation(msg_str)),
                ffi::SQLITE_CONSTRAINT_NOTNULL => Some(DbError::NotNullViolation(msg_str)),
                _ => None,
            }
        }
        _ => None,
    };
    classified.unwrap_or(DbError::Sqlite(error))
}

impl From<SqliteError> for DbError {
    fn from(error: SqliteError) -> Self {
        handle_db_error(error)
    }
}
