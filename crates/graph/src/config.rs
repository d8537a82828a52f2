use std::time::Duration;

use secrecy::SecretString;

/// Default Graph API host.
pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com";

/// Default Graph API version segment.
pub const DEFAULT_API_VERSION: &str = "v23.0";

/// Graph API client configuration.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Scheme and host, without trailing slash.
    pub base_url: String,
    /// Version path segment, e.g. `v23.0`.
    pub api_version: String,
    /// App id used for the authorization-code exchange.
    pub client_id: String,
    pub client_secret: SecretString,
    /// Timeout for a single request.
    pub request_timeout: Duration,
}

impl GraphConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                      |
    /// |------------------------------|------------------------------|
    /// | `GRAPH_API_BASE`             | `https://graph.facebook.com` |
    /// | `GRAPH_API_VERSION`          | `v23.0`                      |
    /// | `FB_CLIENT_ID`               | (empty)                      |
    /// | `FB_CLIENT_SECRET`           | (empty)                      |
    /// | `GRAPH_REQUEST_TIMEOUT_SECS` | `15`                         |
    pub fn from_env() -> Self {
        let base_url = std::env::var("GRAPH_API_BASE")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let api_version =
            std::env::var("GRAPH_API_VERSION").unwrap_or_else(|_| DEFAULT_API_VERSION.into());

        let client_id = std::env::var("FB_CLIENT_ID").unwrap_or_default();
        if client_id.is_empty() {
            tracing::warn!("FB_CLIENT_ID is not set; code exchange will fail");
        }

        let client_secret =
            SecretString::from(std::env::var("FB_CLIENT_SECRET").unwrap_or_default());

        let timeout_secs: u64 = std::env::var("GRAPH_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".into())
            .parse()
            .expect("GRAPH_REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url,
            api_version,
            client_id,
            client_secret,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// `{base_url}/{api_version}`, the prefix of every request path.
    pub fn versioned_base(&self) -> String {
        format!("{}/{}", self.base_url, self.api_version)
    }
}
