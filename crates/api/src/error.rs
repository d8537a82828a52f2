use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use waba_core::error::{OnboardingError, MSG_INVALID_SESSION};
use waba_core::onboarding::OnboardingStep;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`OnboardingError`] for the completion flow and adds HTTP-specific
/// variants. Every response carries `{ ok: false, step, message }` where
/// `message` is generic; details are only logged.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A failed completion attempt.
    #[error(transparent)]
    Onboarding(#[from] OnboardingError),

    /// A well-formed session token with no pending, unexpired record.
    #[error("Session not found")]
    SessionNotFound,

    /// A database error from sqlx outside the completion transaction.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// HTTP status, step tag and public message for this error.
    pub fn classify(&self) -> (StatusCode, OnboardingStep, &'static str) {
        match self {
            AppError::Onboarding(err) => {
                let status = match err {
                    OnboardingError::Validation(_) => StatusCode::BAD_REQUEST,
                    OnboardingError::LimitReached { .. } => StatusCode::FORBIDDEN,
                    OnboardingError::RemoteCallFailed { .. } => StatusCode::BAD_GATEWAY,
                    OnboardingError::PersistenceConflict { .. } => StatusCode::CONFLICT,
                    OnboardingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.step(), err.public_message())
            }
            AppError::SessionNotFound => (
                StatusCode::NOT_FOUND,
                OnboardingStep::ValidateSession,
                MSG_INVALID_SESSION,
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                OnboardingStep::Unknown,
                OnboardingStep::Unknown.failure_message(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, step, message) = self.classify();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Unexpected server error");
        }

        let body = json!({
            "ok": false,
            "step": step,
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
