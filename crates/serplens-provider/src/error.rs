use thiserror::Error;

/// Errors surfaced by the completion backends.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-success status with a message.
    #[error("provider API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The backend returned 429.
    #[error("provider rate limit exceeded")]
    RateLimited,

    /// The named credential is not configured.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// The reply body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The model returned no usable text.
    #[error("analysis engine returned empty result")]
    Empty,
}
