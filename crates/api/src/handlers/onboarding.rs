//! Handlers for completing WhatsApp Business onboarding.
//!
//! The completion endpoint is public: possession of the one-time session
//! token is the only credential. All failures render through
//! [`AppError`] as `{ ok: false, step, message }`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use waba_core::error::{OnboardingError, MSG_INVALID_SESSION};
use waba_core::onboarding::{is_valid_session_token, CompletionRequest};
use waba_db::repositories::WaConfigurationRepo;

use crate::error::{AppError, AppResult};
use crate::response::{CompletionResponse, SessionStatusResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /onboarding/complete
// ---------------------------------------------------------------------------

/// Complete onboarding for the session in the body.
///
/// A body that is not JSON is handled like an empty object, so the caller
/// gets the same `validate_session` rejection as for absent fields.
pub async fn complete_onboarding(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<CompletionResponse>> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable onboarding payload");
            Value::Null
        }
    };

    let request = CompletionRequest::from_parts(
        text_field(&body, "session"),
        text_field(&body, "code"),
        id_field(&body, "phone_number_id"),
        id_field(&body, "waba_id"),
    )?;

    let outcome = state.onboarding.complete(&request).await?;

    Ok(Json(outcome.into()))
}

fn text_field(body: &Value, name: &str) -> Option<String> {
    body.get(name)?.as_str().map(str::to_owned)
}

/// Graph object ids arrive as strings or as bare JSON numbers.
fn id_field(body: &Value, name: &str) -> Option<String> {
    match body.get(name)? {
        Value::Number(n) => Some(n.to_string()),
        other => other.as_str().map(str::to_owned),
    }
}

// ---------------------------------------------------------------------------
// GET /onboarding/session
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session: Option<String>,
}

/// Report whether a session token can still be completed. Read-only.
pub async fn session_status(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> AppResult<Json<SessionStatusResponse>> {
    let token = query
        .session
        .filter(|token| is_valid_session_token(token))
        .ok_or(OnboardingError::Validation(MSG_INVALID_SESSION))?;

    WaConfigurationRepo::find_pending_by_session(&state.pool, &token)
        .await?
        .ok_or(AppError::SessionNotFound)?;

    Ok(Json(SessionStatusResponse {
        ok: true,
        valid: true,
    }))
}
