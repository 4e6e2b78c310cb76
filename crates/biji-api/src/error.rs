use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<biji_core::Error> for AppError {
    fn from(error: biji_core::Error) -> Self {
        use biji_core::Error;

        match error {
            Error::MalformedInput(message) => Self::BadRequest(message),
            // Only a local store raises this; the relay never checks names.
            Error::NameConflict(name) => Self::BadRequest(format!("name is already taken: {name}")),
            Error::Unauthorized => Self::unauthorized("missing sync code"),
            Error::NotFound(message) => Self::NotFound(message),
            Error::RegistrationExhausted { attempts } => {
                tracing::error!(attempts, "Sync code generation exhausted");
                Self::Internal("failed to generate unique sync code, please try again".to_string())
            }
            other @ (Error::Io(_) | Error::Serialization(_) | Error::Http(_)) => {
                tracing::error!(error = %other, "Storage failure");
                Self::Internal("storage failure".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
