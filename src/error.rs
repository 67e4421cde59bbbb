//! Error types for the entity manager.
//!

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EntityManagerError {
    /// Failure raised by the database engine, passed through untouched so tests
    /// can inspect the underlying `sqlx::Error` (constraint violations, bad SQL, ...).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Entity not found in {table} for id {id}")]
    EntityNotFound { table: &'static str, id: String },
    #[error("Entity of {table} has no identifier")]
    MissingIdentifier { table: &'static str },
    #[error("Query returned no result")]
    NoResult,
    #[error("Query returned {count} results where one was expected")]
    NonUniqueResult { count: usize },
    #[error("No value bound for query parameter :{0}")]
    MissingParameter(String),
    #[error("Invalid query parameter: {0}")]
    InvalidParameter(String),
    #[error("Invalid entity for {table}: {reason}")]
    InvalidEntity { table: &'static str, reason: String },
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<config::ConfigError> for EntityManagerError {
    fn from(error: config::ConfigError) -> Self {
        EntityManagerError::Configuration(error.to_string())
    }
}

impl EntityManagerError {
    /// Whether the underlying engine reported a unique or primary key violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            EntityManagerError::Database(sqlx::Error::Database(db_error)) => {
                db_error.is_unique_violation()
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, EntityManagerError>;
