use serde::Deserialize;

/// Errors from the Graph API client.
#[derive(Debug, thiserror::Error)]
pub enum GraphApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, or an
    /// undecodable body). Never carries the request URL.
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The configured base URL cannot be used to build request paths.
    #[error("Invalid Graph API base URL: {0}")]
    InvalidBaseUrl(String),

    /// The Graph API returned a non-2xx status code.
    #[error("Graph API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// `error.message` from the error envelope, or the raw body.
        message: String,
    },
}

impl From<reqwest::Error> for GraphApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.without_url())
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Extract `error.message` from a Graph error envelope, falling back to the
/// raw body text.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| body.to_string())
}
