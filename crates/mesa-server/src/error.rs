//! OrderError → HTTP response mapping.
//!
//! Error bodies are always `{"error": "<message>"}`. Unexpected failures are
//! logged here and surfaced with a generic message; the other three kinds
//! carry their message verbatim (customer and admin UIs render it inline).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use mesa_core::OrderError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Newtype so `OrderError` can travel through `?` in handlers.
#[derive(Debug)]
pub struct ApiError(pub OrderError);

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            OrderError::InvalidInput(m) | OrderError::InvalidState(m) => {
                (StatusCode::BAD_REQUEST, m)
            }
            OrderError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            OrderError::Unexpected(m) => {
                tracing::error!(error = %m, "unexpected failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
