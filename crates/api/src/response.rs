//! Success payloads of the onboarding endpoints.
//!
//! Failures are rendered by [`AppError`](crate::error::AppError) with the
//! same `ok` discriminator.

use serde::Serialize;
use waba_core::onboarding::{CompletionOutcome, ConnectionStatus, WebhookStatus};

/// Body of a committed completion.
#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub ok: bool,
    pub status: ConnectionStatus,
    pub webhook_status: WebhookStatus,
    pub waba_name: Option<String>,
    pub phone_number_id: String,
    pub waba_id: String,
}

impl From<CompletionOutcome> for CompletionResponse {
    fn from(outcome: CompletionOutcome) -> Self {
        Self {
            ok: true,
            status: outcome.status,
            webhook_status: outcome.webhook_status,
            waba_name: outcome.waba_name,
            phone_number_id: outcome.phone_number_id,
            waba_id: outcome.waba_id,
        }
    }
}

/// Body of a successful session lookup.
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub ok: bool,
    pub valid: bool,
}
