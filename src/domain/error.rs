use thiserror::Error;

use super::ProjectStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Required field missing: {0}")]
    MissingField(String),

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Cannot move project from {from} to {to}")]
    InvalidTransition {
        from: ProjectStatus,
        to: ProjectStatus,
    },

    #[error("Only the {party} can move a project from {from} to {to}")]
    WrongParty {
        party: &'static str,
        from: ProjectStatus,
        to: ProjectStatus,
    },
}

pub type DomainResult<T> = Result<T, DomainError>;
