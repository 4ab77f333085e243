use thiserror::Error;

use crate::repository::RepositoryError;

/// Result alias used by the service layer.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by services to the HTTP layer and binaries.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A payload field failed validation.
    #[error("{field}: {message}")]
    InvalidField { field: String, message: String },
    #[error("{0}")]
    AlreadyExists(String),
    #[error("{0}")]
    NotFound(String),
    #[error("you cannot subscribe to yourself")]
    SelfSubscription,
    #[error("authentication required")]
    Unauthorized,
    #[error("you do not have permission to perform this action")]
    Forbidden,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        ServiceError::AlreadyExists(message.into())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ServiceError::not_found("Not found."),
            RepositoryError::AlreadyExists => ServiceError::already_exists("Record already exists."),
            RepositoryError::MissingReference => {
                ServiceError::not_found("Referenced record does not exist.")
            }
            RepositoryError::ConstraintViolation(message) => {
                ServiceError::invalid_field("non_field_errors", message)
            }
            RepositoryError::Database(_) | RepositoryError::Pool(_) => {
                ServiceError::Internal(value.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_errors_map_to_service_errors() {
        assert!(matches!(
            ServiceError::from(RepositoryError::NotFound),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::AlreadyExists),
            ServiceError::AlreadyExists(_)
        ));
        assert!(matches!(
            ServiceError::from(RepositoryError::ConstraintViolation("CHECK failed".into())),
            ServiceError::InvalidField { ref field, .. } if field == "non_field_errors"
        ));
    }
}
