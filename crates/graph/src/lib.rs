//! HTTP client for the Graph API operations used during onboarding.

pub mod client;
pub mod config;
pub mod error;

pub use client::GraphClient;
pub use config::GraphConfig;
pub use error::GraphApiError;
