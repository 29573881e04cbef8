use crate::domain::DomainError;
use crate::ports::{ConfigError, RepositoryError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => AppError::NotFound(format!("Not found: {what}")),
            RepositoryError::Conflict { .. } => AppError::Conflict(err.to_string()),
            RepositoryError::Storage(_) => AppError::Repository(err),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::WrongParty { .. } => AppError::Forbidden(err.to_string()),
            _ => AppError::Validation(err.to_string()),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Maps a repository `NotFound` to a caller-facing message, leaving other
/// failures untouched.
pub trait NotFoundExt<T> {
    fn or_not_found(self, message: &str) -> AppResult<T>;
}

impl<T> NotFoundExt<T> for Result<T, RepositoryError> {
    fn or_not_found(self, message: &str) -> AppResult<T> {
        self.map_err(|e| match e {
            RepositoryError::NotFound(_) => AppError::NotFound(message.to_string()),
            other => other.into(),
        })
    }
}
