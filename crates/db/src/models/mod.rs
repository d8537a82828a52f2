//! Row types for the onboarding tables.

pub mod wa_configuration;
