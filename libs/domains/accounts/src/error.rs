use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid phone number or password.";
pub const INCORRECT_OLD_PASSWORD_MESSAGE: &str = "Incorrect old password.";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(Uuid),

    #[error("No user registered with phone number {0}")]
    NotFoundByPhone(String),

    /// `field` is `email` or `phone_number`
    #[error("Unique constraint violated on {field}")]
    UniqueConstraintViolation { field: &'static str },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Incorrect old password")]
    IncorrectOldPassword,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    pub fn duplicate_email() -> Self {
        UserError::UniqueConstraintViolation { field: "email" }
    }

    pub fn duplicate_phone() -> Self {
        UserError::UniqueConstraintViolation {
            field: "phone_number",
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => AppError::NotFound(format!("User {} not found", id)),
            // The phone number is not echoed back
            UserError::NotFoundByPhone(_) => {
                AppError::NotFound("No user registered with that phone number".to_string())
            }
            UserError::UniqueConstraintViolation { field } => AppError::Conflict(format!(
                "A user with this {} already exists.",
                field.replace('_', " ")
            )),
            UserError::Validation(msg) => AppError::BadRequest(msg),
            UserError::InvalidCredentials => {
                AppError::Unauthorized(INVALID_CREDENTIALS_MESSAGE.to_string())
            }
            UserError::IncorrectOldPassword => {
                AppError::BadRequest(INCORRECT_OLD_PASSWORD_MESSAGE.to_string())
            }
            UserError::PasswordHash(msg) => {
                tracing::error!("Password hash error: {}", msg);
                AppError::InternalServerError(msg)
            }
            UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (UserError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (UserError::duplicate_phone(), StatusCode::CONFLICT),
            (UserError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (UserError::IncorrectOldPassword, StatusCode::BAD_REQUEST),
            (
                UserError::Internal("pool closed".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_conflict_names_only_the_field() {
        let app_error = AppError::from(UserError::duplicate_phone());
        match app_error {
            AppError::Conflict(msg) => {
                assert_eq!(msg, "A user with this phone number already exists.")
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }
}
