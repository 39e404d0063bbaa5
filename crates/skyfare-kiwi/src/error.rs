use thiserror::Error;

/// Errors returned by the Kiwi flight-search client.
#[derive(Debug, Error)]
pub enum KiwiError {
    /// The upstream API answered with a non-success HTTP status. Not retried.
    #[error("Upstream error {status}")]
    Upstream { status: u16 },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not valid JSON.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl KiwiError {
    /// The upstream HTTP status, when the failure came from a non-success response.
    #[must_use]
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status } => Some(*status),
            _ => None,
        }
    }
}
