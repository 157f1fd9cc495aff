use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use dalryeok_core::{DateKeyError, StorageError, ValidationError};

/// Errors a handler can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Admin access required")]
    Forbidden,

    #[error("Event not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid date: {0}")]
    DateKey(#[from] DateKeyError),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Invalid(v) => ApiError::Validation(v),
            other => ApiError::Storage(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Validation(_) | ApiError::DateKey(_) | ApiError::InvalidId(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}
