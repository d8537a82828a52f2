use crate::onboarding::OnboardingStep;
use crate::types::DbId;

/// Public message for an unknown, expired, consumed or malformed session.
pub const MSG_INVALID_SESSION: &str = "Invalid or expired session.";

/// Public message when the token is well-formed but other fields are absent.
pub const MSG_MISSING_FIELDS: &str = "Missing required onboarding fields.";

/// Public message when the owning user hit the onboarding limit.
pub const MSG_LIMIT_REACHED: &str = "limit reached";

/// Errors raised by a [`SessionStore`](crate::onboarding::SessionStore)
/// implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A queried table does not exist. Only meaningful for optional tables.
    #[error("Table does not exist: {0}")]
    UndefinedTable(String),

    /// Any other failure of the underlying store.
    #[error("Store error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Failure of a completion attempt, tagged with the step that failed.
///
/// Every variant aborts the attempt and rolls back its transaction, so the
/// session stays pending and can be retried.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    /// Malformed input or no claimable session. The message is public.
    #[error("Validation failed: {0}")]
    Validation(&'static str),

    /// The owning user reached the onboarding limit and is not whitelisted.
    #[error("Onboarding limit reached for user {user_id}")]
    LimitReached { user_id: DbId },

    /// The Graph API rejected a call or could not be reached.
    #[error("Remote call failed at {step}: {detail}")]
    RemoteCallFailed { step: OnboardingStep, detail: String },

    /// The guarded completion update matched no pending row.
    #[error("Session already consumed (record {record_id})")]
    PersistenceConflict { record_id: DbId },

    /// Unexpected store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OnboardingError {
    /// The step tag exposed to callers.
    pub fn step(&self) -> OnboardingStep {
        match self {
            Self::Validation(_) | Self::LimitReached { .. } => OnboardingStep::ValidateSession,
            Self::RemoteCallFailed { step, .. } => *step,
            Self::PersistenceConflict { .. } => OnboardingStep::DbWrite,
            Self::Store(_) => OnboardingStep::Unknown,
        }
    }

    /// The generic message safe to return to callers.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Validation(msg) => *msg,
            Self::LimitReached { .. } => MSG_LIMIT_REACHED,
            Self::RemoteCallFailed { step, .. } => step.failure_message(),
            Self::PersistenceConflict { .. } => OnboardingStep::DbWrite.failure_message(),
            Self::Store(_) => OnboardingStep::Unknown.failure_message(),
        }
    }
}
