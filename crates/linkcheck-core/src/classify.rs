//! Rule-table classifier mapping [`PageSignals`] to a connection status.
//!
//! Rules are evaluated in fixed precedence and the first match wins. A
//! "Pending" indicator is the most specific signal, so it outranks
//! everything else; the later rules are looser substring matches and carry
//! lower confidence.

use crate::profile::{ClassificationResult, ConnectionStatus, PageSignals};

pub const PENDING_CONFIDENCE: f32 = 0.95;
pub const ACCEPTED_CONFIDENCE: f32 = 0.95;
pub const NOT_CONNECTED_CONFIDENCE: f32 = 0.9;
pub const UNKNOWN_CONFIDENCE: f32 = 0.5;

/// Classify a profile page from its DOM signals.
///
/// Never fails: a page with no recognisable indicator is classified as
/// [`ConnectionStatus::Unknown`].
#[must_use]
pub fn classify(signals: &PageSignals) -> ClassificationResult {
    let degree = signals.connection_degree.as_str();

    if signals.is_pending_in_html || signals.has_pending_button {
        return ClassificationResult::new(
            ConnectionStatus::Pending,
            PENDING_CONFIDENCE,
            "pending indicator found",
        );
    }

    if signals.is_connected_in_html
        || (signals.has_message_button && !signals.has_connect_button)
        || degree.contains("1st")
    {
        return ClassificationResult::new(
            ConnectionStatus::Accepted,
            ACCEPTED_CONFIDENCE,
            "first-degree/message-button indicator found",
        );
    }

    if signals.has_connect_button || degree.contains("2nd") || degree.contains("3rd") {
        return ClassificationResult::new(
            ConnectionStatus::NotConnected,
            NOT_CONNECTED_CONFIDENCE,
            "connect button or 2nd/3rd degree found",
        );
    }

    ClassificationResult::new(
        ConnectionStatus::Unknown,
        UNKNOWN_CONFIDENCE,
        "no confident indicator found",
    )
}
