pub mod health;
pub mod onboarding;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /onboarding/complete                 complete onboarding (POST)
/// /onboarding/session?session=         session status (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/onboarding", onboarding::router())
}
