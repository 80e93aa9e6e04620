use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use interview_types::FeedbackOutcome;

/// Errors surfaced by the HTTP layer. Bodies share the `{success, error}`
/// shape of the feedback contract.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Feedback not found")]
    NotFound,
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(e) => {
                tracing::error!("request failed: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(FeedbackOutcome::failed(self.to_string()))).into_response()
    }
}
