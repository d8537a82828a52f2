//! Domain layer for linking pending onboarding records to WhatsApp Business
//! accounts.
//!
//! Contains no I/O: the database, the Graph API and the limit policy are
//! reached through the traits in [`onboarding`], so the orchestrator can be
//! driven by the Postgres/`reqwest` implementations in production and by
//! in-memory fakes in tests.

pub mod error;
pub mod masking;
pub mod onboarding;
pub mod types;
