use thiserror::Error;

use crate::validation::ValidationErrors;

/// Application-wide error types for Twixxer.
#[derive(Error, Debug)]
pub enum AppError {
    /// Submitted form data failed validation.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// A unique field (username, email) is already taken.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unknown account or wrong password. Deliberately does not say which.
    #[error("Invalid username/email or password")]
    InvalidCredentials,

    /// Credentials were correct but the email address is not verified yet.
    #[error("Email address {email} has not been verified")]
    VerificationRequired { email: String },

    /// No valid session.
    #[error("Authentication required")]
    Unauthorized,

    /// Authenticated, but not allowed to touch this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Password hashing failed.
    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    /// Handing a message to the mailer failed.
    #[error("Mail error: {0}")]
    MailError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl AppError {
    /// Returns true for errors caused by the client rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::Conflict(_)
                | AppError::NotFound(_)
                | AppError::InvalidCredentials
                | AppError::VerificationRequired { .. }
                | AppError::Unauthorized
                | AppError::Forbidden(_)
        )
    }
}
