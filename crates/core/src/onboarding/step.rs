use std::fmt;

use serde::Serialize;

/// Step of the completion flow a failure is attributed to.
///
/// Serialized as the snake_case tag returned in the `step` field of error
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    ValidateSession,
    ExchangeCode,
    VerifyNumber,
    RegisterNumber,
    WabaName,
    SubscribeApps,
    DbWrite,
    Unknown,
}

impl OnboardingStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidateSession => "validate_session",
            Self::ExchangeCode => "exchange_code",
            Self::VerifyNumber => "verify_number",
            Self::RegisterNumber => "register_number",
            Self::WabaName => "waba_name",
            Self::SubscribeApps => "subscribe_apps",
            Self::DbWrite => "db_write",
            Self::Unknown => "unknown",
        }
    }

    /// Generic public message for a failure at this step.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::ValidateSession => crate::error::MSG_INVALID_SESSION,
            Self::ExchangeCode => "Failed to exchange code.",
            Self::VerifyNumber => "Failed to verify phone number.",
            Self::RegisterNumber => "Failed to register phone number.",
            Self::WabaName => "Failed to fetch WABA name.",
            Self::SubscribeApps => "Failed to subscribe apps.",
            Self::DbWrite => "Session already consumed.",
            Self::Unknown => "Unexpected server error.",
        }
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
