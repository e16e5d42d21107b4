use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error (HTTP {status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} returned no text content")]
    EmptyResponse { provider: &'static str },

    #[error("missing API key for {provider}")]
    MissingApiKey { provider: &'static str },
}
