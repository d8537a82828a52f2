use std::sync::Arc;

use waba_core::onboarding::{ConfiguredPolicy, OnboardingOrchestrator};
use waba_db::PgSessionStore;
use waba_graph::GraphClient;

use crate::config::ServerConfig;

/// The orchestrator wired to Postgres and the live Graph API.
pub type Onboarding = OnboardingOrchestrator<PgSessionStore, GraphClient, ConfiguredPolicy>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: waba_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Completion flow shared by all requests.
    pub onboarding: Arc<Onboarding>,
}
