//! REST client for the Graph API endpoints used during onboarding.
//!
//! Every operation is a single request with no retry. Responses are
//! returned as-is; callers interpret `success` flags and platform fields.

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use waba_core::onboarding::{AccountName, Acknowledgement, GraphApi, NumberStatus, TokenGrant};

use crate::config::GraphConfig;
use crate::error::{error_message, GraphApiError};

/// HTTP client bound to one versioned Graph API base URL.
#[derive(Debug, Clone)]
pub struct GraphClient {
    client: reqwest::Client,
    base: Url,
    client_id: String,
    client_secret: SecretString,
}

impl GraphClient {
    /// Create a client with its own connection pool and the configured
    /// request timeout.
    pub fn new(config: &GraphConfig) -> Result<Self, GraphApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Self::with_client(client, config)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        config: &GraphConfig,
    ) -> Result<Self, GraphApiError> {
        let base = Url::parse(&config.versioned_base())
            .map_err(|e| GraphApiError::InvalidBaseUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(GraphApiError::InvalidBaseUrl(base.to_string()));
        }
        Ok(Self {
            client,
            base,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    /// Append path segments to the versioned base. Each segment is
    /// percent-encoded, so identifiers cannot change the path structure.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, turning anything
    /// else into [`GraphApiError::Api`] with the envelope message.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GraphApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GraphApiError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GraphApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

impl GraphApi for GraphClient {
    type Error = GraphApiError;

    /// `POST /oauth/access_token` with the app credentials and the code.
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant, GraphApiError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];

        tracing::debug!("Exchanging authorization code");
        let response = self
            .client
            .post(self.endpoint(&["oauth", "access_token"]))
            .form(&params)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `GET /{phone_number_id}?fields=is_on_biz_app,platform_type`.
    async fn get_number_status(
        &self,
        phone_number_id: &str,
        access_token: &SecretString,
    ) -> Result<NumberStatus, GraphApiError> {
        let response = self
            .client
            .get(self.endpoint(&[phone_number_id]))
            .query(&[("fields", "is_on_biz_app,platform_type")])
            .bearer_auth(access_token.expose_secret())
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `POST /{phone_number_id}/register` with the two-step PIN.
    async fn register_number(
        &self,
        phone_number_id: &str,
        access_token: &SecretString,
        pin: &SecretString,
    ) -> Result<Acknowledgement, GraphApiError> {
        let body = serde_json::json!({
            "messaging_product": "whatsapp",
            "pin": pin.expose_secret(),
        });

        let response = self
            .client
            .post(self.endpoint(&[phone_number_id, "register"]))
            .bearer_auth(access_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `GET /{waba_id}?fields=name`.
    async fn get_account_name(
        &self,
        waba_id: &str,
        access_token: &SecretString,
    ) -> Result<AccountName, GraphApiError> {
        let response = self
            .client
            .get(self.endpoint(&[waba_id]))
            .query(&[("fields", "name")])
            .bearer_auth(access_token.expose_secret())
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// `POST /{waba_id}/subscribed_apps`.
    async fn subscribe_webhooks(
        &self,
        waba_id: &str,
        access_token: &SecretString,
    ) -> Result<Acknowledgement, GraphApiError> {
        let response = self
            .client
            .post(self.endpoint(&[waba_id, "subscribed_apps"]))
            .bearer_auth(access_token.expose_secret())
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
