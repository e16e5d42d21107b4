use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("permission denied (HTTP {status}): {message}")]
    PermissionDenied { status: u16, message: String },

    #[error("spreadsheet or range not found: {range}")]
    NotFound { range: String },

    #[error("rate limited by the Sheets API: {message}")]
    RateLimited { message: String },

    #[error("unexpected HTTP status {status} for {range}: {message}")]
    UnexpectedStatus {
        status: u16,
        range: String,
        message: String,
    },

    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SheetsError {
    /// `true` when the spreadsheet rejected the call because the credentials
    /// lack access (not shared, read-only share, expired token).
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        match self {
            SheetsError::PermissionDenied { .. } => true,
            SheetsError::UnexpectedStatus { message, .. } => {
                message.contains("PERMISSION_DENIED")
            }
            _ => false,
        }
    }

    /// Operator-facing explanation of the failure.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        if self.is_permission_denied() {
            format!(
                "the spreadsheet is not writable with the configured credentials; \
                 share it with edit access or refresh the access token ({self})"
            )
        } else {
            format!("spreadsheet request failed: {self}")
        }
    }
}
