use thiserror::Error;

use crate::models::trip::TripId;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error("not found")]
    NotFound,
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Finishing odometer reading that is not past the starting one.
///
/// Raised only by the finish paths when no override was given, so callers can
/// ask the user for confirmation and retry with the override set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct KmInconsistency {
    pub message: String,
    pub start_km: i32,
    pub end_km: i32,
}

#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("trip {0} not found")]
    NotFound(TripId),
    #[error("{0}")]
    ValidationFailed(String),
    #[error(transparent)]
    KmInconsistency(#[from] KmInconsistency),
    #[error(transparent)]
    Unexpected(#[from] AppError),
}

impl UseCaseError {
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_km_inconsistency(&self) -> bool {
        matches!(self, UseCaseError::KmInconsistency(_))
    }

    pub fn km_inconsistency(&self) -> Option<&KmInconsistency> {
        match self {
            UseCaseError::KmInconsistency(inner) => Some(inner),
            _ => None,
        }
    }
}

/// Uniform result of every use case.
pub type Outcome<T> = Result<T, UseCaseError>;
