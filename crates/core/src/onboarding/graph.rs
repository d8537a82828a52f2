//! Seam to the Graph API and the passthrough shapes of its responses.
//!
//! The client only transports; interpreting `success` flags and platform
//! fields is left to the orchestrator.

use std::future::Future;

use secrecy::SecretString;
use serde::Deserialize;

/// Platform type of a number already served by the Cloud API.
pub const CLOUD_API_PLATFORM: &str = "CLOUD_API";

/// Response of the authorization-code exchange.
#[derive(Debug, Deserialize)]
pub struct TokenGrant {
    pub access_token: Option<SecretString>,
}

/// Platform fields of a phone number.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NumberStatus {
    pub is_on_biz_app: Option<bool>,
    pub platform_type: Option<String>,
}

impl NumberStatus {
    /// Whether the number already coexists on the business app and the
    /// Cloud API, in which case it must not be registered again.
    pub fn is_coexisting(&self) -> bool {
        self.is_on_biz_app == Some(true)
            && self.platform_type.as_deref() == Some(CLOUD_API_PLATFORM)
    }
}

/// Body of register/subscribe responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountName {
    pub name: Option<String>,
}

/// The remote operations used to link a number. Each is a single request
/// with no retry.
pub trait GraphApi: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn exchange_code(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<TokenGrant, Self::Error>> + Send;

    fn get_number_status(
        &self,
        phone_number_id: &str,
        access_token: &SecretString,
    ) -> impl Future<Output = Result<NumberStatus, Self::Error>> + Send;

    fn register_number(
        &self,
        phone_number_id: &str,
        access_token: &SecretString,
        pin: &SecretString,
    ) -> impl Future<Output = Result<Acknowledgement, Self::Error>> + Send;

    fn get_account_name(
        &self,
        waba_id: &str,
        access_token: &SecretString,
    ) -> impl Future<Output = Result<AccountName, Self::Error>> + Send;

    fn subscribe_webhooks(
        &self,
        waba_id: &str,
        access_token: &SecretString,
    ) -> impl Future<Output = Result<Acknowledgement, Self::Error>> + Send;
}
