use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::crypto::CipherError;
use crate::db::StoreError;

/// Failure of a request handler. The HTTP status is decided here, once,
/// rather than at each call site.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Cipher error: {0}")]
    Cipher(#[from] CipherError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Task join: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Cipher(CipherError::EmptyPassphrase) => StatusCode::BAD_REQUEST,
            ApiError::Cipher(_) | ApiError::Store(_) | ApiError::Join(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::NotFound(_) => self.to_string(),
            ApiError::Cipher(CipherError::EmptyPassphrase) => {
                "User name is required to protect the password".to_string()
            }
            _ => {
                tracing::error!("Request failed: {}", self);
                "Internal server error".to_string()
            }
        };
        (status, message).into_response()
    }
}
