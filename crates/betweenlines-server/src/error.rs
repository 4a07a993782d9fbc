use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use betweenlines_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// The request body went over the configured upload limit.
    #[error("Request too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServerError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            ServerError::Store(e) => match e {
                StoreError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
                StoreError::BlobTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, e.to_string()),
                StoreError::Upload(_) => {
                    (StatusCode::BAD_GATEWAY, "Audio upload failed".to_string())
                }
                _ => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Letter store unavailable".to_string(),
                ),
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
