//! Typed error type for the db crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The store rejected a row (CHECK, NOT NULL or UNIQUE constraint).
    #[error("{0}")]
    ConstraintViolation(String),

    /// The table does not accept writes from this client.
    #[error("permission denied for table {0}")]
    PermissionDenied(&'static str),

    #[error("column '{column}' does not exist on table {table}")]
    UnknownColumn { table: &'static str, column: String },

    /// A row came back in a shape that could not be decoded.
    #[error("could not decode row: {0}")]
    Decode(String),
}

impl DbError {
    /// The store's own message text, without the variant prefix used by
    /// `Display`. For errors raised by Postgres itself this is exactly what
    /// the server reported.
    pub fn message(&self) -> String {
        match self {
            Self::Sqlx(sqlx::Error::Database(db_err)) => db_err.message().to_owned(),
            Self::ConstraintViolation(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// Classify a raw sqlx error, keeping the backend's own message for
    /// constraint and permission failures.
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let message = db_err.message().to_owned();
            if db_err.is_check_violation()
                || db_err.is_unique_violation()
                || db_err.is_foreign_key_violation()
                // 23502 = not_null_violation
                || db_err.code().as_deref() == Some("23502")
            {
                return Self::ConstraintViolation(message);
            }
        }
        Self::Sqlx(err)
    }
}
