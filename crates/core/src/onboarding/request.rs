use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{OnboardingError, MSG_INVALID_SESSION, MSG_MISSING_FIELDS};

/// Session tokens are 10-64 URL-safe characters.
static SESSION_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{10,64}$").expect("session token pattern is valid")
});

/// Whether `token` has the shape of an onboarding session token.
pub fn is_valid_session_token(token: &str) -> bool {
    SESSION_TOKEN_RE.is_match(token)
}

/// Input of one completion attempt. Never persisted.
#[derive(Clone)]
pub struct CompletionRequest {
    /// One-time onboarding session token.
    pub session: String,
    /// Authorization code returned by the embedded signup popup.
    pub code: String,
    pub phone_number_id: String,
    pub waba_id: String,
}

impl CompletionRequest {
    /// Build a request from optional inbound fields, rejecting absent ones.
    ///
    /// The session token is checked first so a bad link always reports an
    /// invalid session, whatever else is missing.
    pub fn from_parts(
        session: Option<String>,
        code: Option<String>,
        phone_number_id: Option<String>,
        waba_id: Option<String>,
    ) -> Result<Self, OnboardingError> {
        let session = session.ok_or(OnboardingError::Validation(MSG_INVALID_SESSION))?;
        let request = Self {
            session,
            code: code.unwrap_or_default(),
            phone_number_id: phone_number_id.unwrap_or_default(),
            waba_id: waba_id.unwrap_or_default(),
        };
        request.validate()?;
        Ok(request)
    }

    /// Check token shape and presence of the remaining fields.
    pub fn validate(&self) -> Result<(), OnboardingError> {
        if !is_valid_session_token(&self.session) {
            return Err(OnboardingError::Validation(MSG_INVALID_SESSION));
        }
        let blank = [&self.code, &self.phone_number_id, &self.waba_id]
            .iter()
            .any(|field| field.trim().is_empty());
        if blank {
            return Err(OnboardingError::Validation(MSG_MISSING_FIELDS));
        }
        Ok(())
    }
}

// The authorization code is a bearer secret until exchanged.
impl fmt::Debug for CompletionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionRequest")
            .field("session", &crate::masking::mask(&self.session))
            .field("code", &"[REDACTED]")
            .field("phone_number_id", &crate::masking::mask(&self.phone_number_id))
            .field("waba_id", &crate::masking::mask(&self.waba_id))
            .finish()
    }
}
