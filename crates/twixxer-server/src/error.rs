use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use twixxer_core::error::AppError;

use crate::dto::ErrorResponse;

/// Wrapper so we can implement `IntoResponse` for `AppError`.
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AppError::VerificationRequired { .. } => {
                (StatusCode::FORBIDDEN, "verification_required")
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::ConfigError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::MailError(_) => (StatusCode::BAD_GATEWAY, "mail_error"),
            AppError::PasswordHash(_) | AppError::SerializationError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        // Server-side details stay in the log.
        let message = if self.0.is_client_error() {
            match &self.0 {
                AppError::Conflict(msg) | AppError::NotFound(msg) | AppError::Forbidden(msg) => {
                    msg.clone()
                }
                AppError::Validation(_) => "Please correct the highlighted fields".to_string(),
                other => other.to_string(),
            }
        } else {
            tracing::error!(error = %self.0, "Request failed");
            "Something went wrong, please try again later".to_string()
        };

        let mut body = ErrorResponse::new(error_type, message);
        match self.0 {
            AppError::Validation(errors) => body.fields = serde_json::to_value(&errors).ok(),
            AppError::VerificationRequired { email } => body.email = Some(email),
            _ => {}
        }

        (status, axum::Json(body)).into_response()
    }
}
