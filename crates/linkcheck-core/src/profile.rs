//! Profile, page-signal and classification types shared across the workspace.

use serde::{Deserialize, Serialize};

/// Connection state between the logged-in viewer and a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    NotConnected,
    Unknown,
}

impl ConnectionStatus {
    /// Label written into the status column of the sheet and the export file.
    #[must_use]
    pub fn as_sheet_value(self) -> &'static str {
        match self {
            ConnectionStatus::Pending => "Pending",
            ConnectionStatus::Accepted => "Accepted",
            ConnectionStatus::NotConnected => "Not Connected",
            ConnectionStatus::Unknown => "Unknown",
        }
    }

    /// Parse a status label as produced by [`Self::as_sheet_value`] or the
    /// `SCREAMING_SNAKE_CASE` form. Case and separators are ignored.
    #[must_use]
    pub fn parse_label(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "pending" => Some(ConnectionStatus::Pending),
            "accepted" | "connected" => Some(ConnectionStatus::Accepted),
            "notconnected" => Some(ConnectionStatus::NotConnected),
            "unknown" => Some(ConnectionStatus::Unknown),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sheet_value())
    }
}

/// One profile to check, correlated with its sheet row by position.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub url: String,
    /// 1-based sheet row, assigned at load time and never recomputed.
    pub row: u32,
    status: Option<ConnectionStatus>,
}

impl Profile {
    #[must_use]
    pub fn new(url: impl Into<String>, row: u32) -> Self {
        Self {
            url: url.into(),
            row,
            status: None,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<ConnectionStatus> {
        self.status
    }

    /// Record the classified status. Only the first assignment sticks; later
    /// calls return `false` and leave the status untouched.
    pub fn assign_status(&mut self, status: ConnectionStatus) -> bool {
        if self.status.is_some() {
            return false;
        }
        self.status = Some(status);
        true
    }
}

/// DOM-derived indicators captured from a rendered profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageSignals {
    pub has_connect_button: bool,
    pub has_pending_button: bool,
    pub has_message_button: bool,
    pub connection_degree: String,
    pub is_pending_in_html: bool,
    pub is_connected_in_html: bool,
}

/// Output of a classifier run. Confidence is a heuristic weight in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub status: ConnectionStatus,
    pub confidence: f32,
    pub reasoning: String,
}

impl ClassificationResult {
    /// Builds a result, clamping `confidence` into `[0, 1]` (NaN becomes 0).
    #[must_use]
    pub fn new(status: ConnectionStatus, confidence: f32, reasoning: impl Into<String>) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            status,
            confidence,
            reasoning: reasoning.into(),
        }
    }

    /// Confidence rendered for the sheet's confidence column.
    #[must_use]
    pub fn confidence_label(&self) -> String {
        format!("{:.2}", self.confidence)
    }
}
