use axum::routing::{get, post};
use axum::Router;

use crate::handlers::onboarding;
use crate::state::AppState;

/// Routes mounted at `/onboarding`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/complete", post(onboarding::complete_onboarding))
        .route("/session", get(onboarding::session_status))
}
