//! Application error types.

use thiserror::Error;

/// Result alias used across the workspace.
pub type AppResult<T> = Result<T, AppError>;

/// Errors shared by the workspace crates.
#[derive(Debug, Error)]
pub enum AppError {
    /// Neither a connection string nor the discrete host/password pair is set.
    #[error(
        "Missing DB credentials. Set POSTGRES_URL_WITH_PASSWORD or POSTGRES_HOST, POSTGRES_PASSWORD, and optionally PGPORT, POSTGRES_DATABASE, POSTGRES_USER."
    )]
    MissingDatabaseCredentials,

    /// A configuration value was present but unusable.
    #[error("invalid configuration for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    /// The database pool could not be established.
    #[error("database connection failed: {0}")]
    DatabaseConnection(String),

    /// A statement failed to execute.
    #[error("{0}")]
    DatabaseQuery(String),

    /// A SQL script could not be located.
    #[error("SQL file not found: {0}")]
    SqlFileNotFound(String),

    /// A result column has a type with no JSON rendering.
    #[error("cannot export column {column}: unsupported type {type_name}")]
    UnsupportedColumnType { column: String, type_name: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => AppError::DatabaseQuery(db.message().to_string()),
            other => AppError::DatabaseQuery(other.to_string()),
        }
    }
}
