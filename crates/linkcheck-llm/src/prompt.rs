//! Prompt construction and response parsing for the fallback classifier.

use linkcheck_core::{ClassificationResult, ConnectionStatus};
use serde::Deserialize;

pub const SYSTEM_PROMPT: &str = "You classify the relationship between a logged-in LinkedIn \
user and the profile page they are viewing. Answer with a single JSON object and nothing else.";

/// Confidence assigned when the model omits one.
const DEFAULT_CONFIDENCE: f32 = 0.6;

/// Build the user prompt for one page's visible text.
#[must_use]
pub fn build_prompt(page_text: &str) -> String {
    format!(
        "Visible text of a LinkedIn profile page:\n\
         ---\n\
         {page_text}\n\
         ---\n\
         Decide the connection status between the viewer and this profile:\n\
         - PENDING: an invitation was sent and not yet accepted (a \"Pending\" button)\n\
         - ACCEPTED: already connected (1st degree, \"Message\" without \"Connect\")\n\
         - NOT_CONNECTED: not connected (\"Connect\" button, 2nd or 3rd degree)\n\
         - UNKNOWN: the text does not say\n\
         Respond as {{\"status\": \"...\", \"confidence\": 0.0-1.0, \"reasoning\": \"...\"}}"
    )
}

#[derive(Debug, Deserialize)]
struct RawAnswer {
    status: String,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// Extract a classification from a model reply.
///
/// Accepts a JSON object anywhere in the reply (models like to wrap it in
/// prose or code fences). Returns `None` when no object with a recognisable
/// status is found.
#[must_use]
pub fn parse_response(reply: &str) -> Option<ClassificationResult> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    let raw: RawAnswer = match serde_json::from_str(&reply[start..=end]) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(error = %e, "LLM reply is not a classification object");
            return None;
        }
    };

    let status = ConnectionStatus::parse_label(&raw.status)?;
    let reasoning = raw
        .reasoning
        .filter(|r| !r.trim().is_empty())
        .map_or_else(|| "llm classification".to_owned(), |r| format!("llm: {r}"));
    Some(ClassificationResult::new(
        status,
        raw.confidence.unwrap_or(DEFAULT_CONFIDENCE),
        reasoning,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_page_text() {
        let prompt = build_prompt("Jane Doe · 2nd · Connect");
        assert!(prompt.contains("Jane Doe · 2nd · Connect"));
        assert!(prompt.contains("NOT_CONNECTED"));
        assert!(prompt.contains(r#"{"status": "...""#));
    }

    #[test]
    fn parses_bare_json() {
        let r = parse_response(
            r#"{"status":"PENDING","confidence":0.8,"reasoning":"Pending button"}"#,
        )
        .unwrap();
        assert_eq!(r.status, ConnectionStatus::Pending);
        assert!((r.confidence - 0.8).abs() < f32::EPSILON);
        assert_eq!(r.reasoning, "llm: Pending button");
    }

    #[test]
    fn parses_json_inside_prose_and_fences() {
        let reply = "Sure!\n```json\n{\"status\": \"not connected\", \"confidence\": 0.7}\n```";
        let r = parse_response(reply).unwrap();
        assert_eq!(r.status, ConnectionStatus::NotConnected);
        assert_eq!(r.reasoning, "llm classification");
    }

    #[test]
    fn clamps_out_of_range_confidence() {
        let r = parse_response(r#"{"status":"ACCEPTED","confidence":7}"#).unwrap();
        assert!((r.confidence - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn missing_confidence_uses_default() {
        let r = parse_response(r#"{"status":"ACCEPTED"}"#).unwrap();
        assert!((r.confidence - DEFAULT_CONFIDENCE).abs() < f32::EPSILON);
    }

    #[test]
    fn unknown_status_label_is_rejected() {
        assert!(parse_response(r#"{"status":"FOLLOWING"}"#).is_none());
    }

    #[test]
    fn non_json_reply_is_rejected() {
        assert!(parse_response("I cannot tell.").is_none());
        assert!(parse_response("} backwards {").is_none());
    }
}
