//! HTTP-facing error type.
//!
//! Handlers return `Result<_, ServerError>`; the variant decides the
//! status code and the message becomes a plain-text body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// The posted payload could not be turned into an image
    #[error("Invalid image: {0:#}")]
    BadImage(anyhow::Error),

    /// Model, filesystem or worker failure
    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadImage(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}
