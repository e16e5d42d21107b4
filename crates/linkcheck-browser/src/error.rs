use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Chrome not available at {0}; start it with --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("navigation to {url} failed: {reason}")]
    NavigationFailed { url: String, reason: String },

    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("DevTools session closed")]
    SessionClosed,

    #[error("cookie store error: {0}")]
    Io(#[from] std::io::Error),

    #[error("login failed: {0}")]
    LoginFailed(String),

    #[error("LinkedIn requires a security checkpoint; complete it in the browser and rerun")]
    CheckpointRequired,

    #[error("page blocked ({reason}) at {url}")]
    Blocked {
        reason: crate::signals::BlockReason,
        url: String,
    },
}

impl From<reqwest::Error> for BrowserError {
    fn from(e: reqwest::Error) -> Self {
        BrowserError::ChromeNotAvailable(e.to_string())
    }
}
