use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Level of the hierarchy an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Region,
    District,
    Ward,
    Street,
}

impl std::fmt::Display for LocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LocationKind::Region => "Region",
            LocationKind::District => "District",
            LocationKind::Ward => "Ward",
            LocationKind::Street => "Street",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: LocationKind, id: Uuid },

    #[error("Location code '{0}' is already in use")]
    DuplicateCode(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LocationError {
    pub fn not_found(kind: LocationKind, id: Uuid) -> Self {
        LocationError::NotFound { kind, id }
    }
}

pub type LocationResult<T> = Result<T, LocationError>;

impl From<LocationError> for AppError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::NotFound { kind, id } => {
                AppError::NotFound(format!("{} {} not found", kind, id))
            }
            LocationError::DuplicateCode(code) => {
                AppError::Conflict(format!("Location code '{}' is already in use", code))
            }
            LocationError::Validation(msg) => AppError::BadRequest(msg),
            LocationError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for LocationError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
