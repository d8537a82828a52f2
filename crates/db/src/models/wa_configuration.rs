//! WhatsApp configuration entity model and DTOs.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use waba_core::masking::mask;
use waba_core::types::{DbId, Timestamp};

/// Value of `onboarding_status` while a record awaits completion.
pub const ONBOARDING_PENDING: &str = "pending";

/// A row from the `wa_configurations` table.
#[derive(Clone, FromRow, Serialize)]
pub struct WaConfiguration {
    pub id: DbId,
    pub user_id: DbId,
    pub phone_number_id: Option<String>,
    pub waba_id: Option<String>,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub status: Option<String>,
    pub waba_name: Option<String>,
    pub is_active: bool,
    pub onboarding_status: String,
    #[serde(skip_serializing)]
    pub onboarding_session: Option<String>,
    pub onboarding_expires_at: Timestamp,
    pub onboarding_consumed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WaConfiguration {
    pub fn is_pending(&self) -> bool {
        self.onboarding_status == ONBOARDING_PENDING
    }
}

impl fmt::Debug for WaConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaConfiguration")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("phone_number_id", &self.phone_number_id.as_deref().map(mask))
            .field("waba_id", &self.waba_id.as_deref().map(mask))
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("status", &self.status)
            .field("waba_name", &self.waba_name)
            .field("is_active", &self.is_active)
            .field("onboarding_status", &self.onboarding_status)
            .field("onboarding_expires_at", &self.onboarding_expires_at)
            .field("onboarding_consumed_at", &self.onboarding_consumed_at)
            .finish_non_exhaustive()
    }
}

/// Id and owner of a pending, unexpired record.
#[derive(Debug, Clone, FromRow)]
pub struct PendingSession {
    pub id: DbId,
    pub user_id: DbId,
    pub onboarding_expires_at: Timestamp,
}

/// DTO for provisioning a pending configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePendingConfiguration {
    pub user_id: DbId,
    pub onboarding_session: String,
    pub onboarding_expires_at: Timestamp,
}
