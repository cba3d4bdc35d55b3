use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("internal error: {0}")]
    Internal(anyhow::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("cannot book a date in the past")]
    PastDate,

    #[error("{0}")]
    AdvanceWindow(String),

    #[error("salon is closed on {0}")]
    ClosedDay(&'static str),

    #[error("{0}")]
    SlotRange(String),

    #[error("requested time slot is already booked")]
    Conflict,

    #[error("{0}")]
    IllegalTransition(String),

    #[error("{0}")]
    PolicyViolation(String),

    #[error("{0}")]
    Authorization(String),
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_)
            | AppError::PastDate
            | AppError::AdvanceWindow(_)
            | AppError::ClosedDay(_)
            | AppError::SlotRange(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict | AppError::IllegalTransition(_) => StatusCode::CONFLICT,
            AppError::PolicyViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
        };

        let message = match &self {
            AppError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
