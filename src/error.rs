use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Request-facing failures. Store errors carry their anyhow context chain for the log,
/// callers only ever see the status code.
#[derive(Debug, thiserror::Error)]
pub enum BlogError {
    #[error("page not found")]
    NotFound,
    #[error("access to {0} is restricted")]
    Forbidden(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl BlogError {
    pub fn status(&self) -> StatusCode {
        match self {
            BlogError::NotFound => StatusCode::NOT_FOUND,
            BlogError::Forbidden(_) => StatusCode::FORBIDDEN,
            BlogError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BlogError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            BlogError::Store(e) => tracing::error!(error = ?e, "Request failed"),
            other => tracing::debug!(%status, reason = %other, "Request rejected"),
        }
        (status, status.canonical_reason().unwrap_or_default()).into_response()
    }
}
