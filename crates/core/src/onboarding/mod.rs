//! Onboarding completion: input validation, the store/Graph/policy seams
//! and the orchestrator that sequences them.

pub mod graph;
pub mod orchestrator;
pub mod policy;
pub mod request;
pub mod step;
pub mod store;

pub use graph::{AccountName, Acknowledgement, GraphApi, NumberStatus, TokenGrant};
pub use orchestrator::{
    CompletionOutcome, ConnectionStatus, OnboardingConfig, OnboardingOrchestrator, WebhookStatus,
};
pub use policy::{ConfiguredPolicy, LimitDecision, LimitPolicy, Unrestricted, WhitelistPolicy};
pub use request::{is_valid_session_token, CompletionRequest};
pub use step::OnboardingStep;
pub use store::{ClaimedSession, CompletionFields, SessionStore, SessionTx};
