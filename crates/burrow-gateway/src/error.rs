use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use burrow_core::{CoreError, ShortenerError};
use thiserror::Error;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("param `{0}` is required")]
    MissingParameter(&'static str),
    #[error("short code not known: {0}")]
    UnknownShortCode(String),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
}

impl From<CoreError> for AppError {
    fn from(value: CoreError) -> Self {
        Self::Shortener(value.into())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            AppError::UnknownShortCode(_) => StatusCode::NOT_FOUND,
            AppError::Shortener(err) => match err {
                ShortenerError::InvalidUrl(_) | ShortenerError::InvalidShortCode(_) => {
                    StatusCode::BAD_REQUEST
                }
                ShortenerError::Generator(_)
                | ShortenerError::Storage(_)
                | ShortenerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // server-side details stay in the log
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
