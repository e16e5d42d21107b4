//! Extraction of classifier signals from a rendered profile page.

use linkcheck_core::PageSignals;
use serde::Deserialize;
use serde_json::Value;

use crate::error::BrowserError;

/// Maximum characters of visible page text kept for the LLM fallback.
pub const PAGE_TEXT_LIMIT: usize = 4_000;

/// Evaluated in the profile tab. Collects button labels from the profile
/// top card, the connection-degree badge, raw-markup markers, and the
/// visible text, and returns them as one JSON object.
pub const SIGNALS_SCRIPT: &str = r#"(() => {
  const main = document.querySelector('main') || document.body;
  const card = main.querySelector('section') || main;
  const labels = Array.from(card.querySelectorAll('button, a[role="button"], a.artdeco-button'))
    .map(el => ((el.innerText || '') + ' ' + (el.getAttribute('aria-label') || '')).trim().toLowerCase());
  const has = (pred) => labels.some(pred);
  const degreeEl = card.querySelector('.dist-value, .distance-badge, span[class*="distance-badge"]');
  const html = document.documentElement ? document.documentElement.outerHTML : '';
  const text = (document.body ? document.body.innerText : '').replace(/\s+/g, ' ').trim();
  return {
    url: window.location.href,
    title: document.title || '',
    text: text,
    signals: {
      hasConnectButton: has(l => l === 'connect' || l.startsWith('connect ') || /invite .* to connect/.test(l)),
      hasPendingButton: has(l => l.startsWith('pending') || l.includes('withdraw invitation')),
      hasMessageButton: has(l => l === 'message' || l.startsWith('message ')),
      connectionDegree: degreeEl ? degreeEl.innerText.trim() : '',
      isPendingInHtml: html.includes('aria-label="Pending') || html.includes('"invitationState":"PENDING"'),
      isConnectedInHtml: html.includes('"distance":{"value":"DISTANCE_1"') || html.includes('"memberDistance":"DISTANCE_1"')
    }
  };
})()"#;

/// Why a page could not be read as a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Redirected to login, auth wall or security checkpoint.
    AuthWall,
    /// LinkedIn throttled the viewer (commercial use limit, 429 page).
    RateLimited,
    /// The profile does not exist or is not visible.
    Unavailable,
}

impl std::fmt::Display for BlockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockReason::AuthWall => write!(f, "auth wall"),
            BlockReason::RateLimited => write!(f, "rate limited"),
            BlockReason::Unavailable => write!(f, "profile unavailable"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    signals: PageSignals,
}

/// Everything captured from one profile page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    pub signals: PageSignals,
    /// Visible text, whitespace-collapsed and capped at [`PAGE_TEXT_LIMIT`] chars.
    pub page_text: String,
}

impl PageSnapshot {
    /// Detect pages that are not a readable profile.
    #[must_use]
    pub fn block_reason(&self) -> Option<BlockReason> {
        let path = url::Url::parse(&self.url)
            .map(|u| u.path().to_owned())
            .unwrap_or_default();
        if ["/login", "/authwall", "/checkpoint", "/uas/login"]
            .iter()
            .any(|p| path.starts_with(p))
        {
            return Some(BlockReason::AuthWall);
        }

        let text = self.page_text.to_lowercase();
        if text.contains("commercial use limit") || text.contains("too many requests") {
            return Some(BlockReason::RateLimited);
        }
        if path.starts_with("/404")
            || text.contains("this page doesn’t exist")
            || text.contains("this page doesn't exist")
            || text.contains("profile is not available")
        {
            return Some(BlockReason::Unavailable);
        }
        None
    }
}

/// Decode the value returned by [`SIGNALS_SCRIPT`].
///
/// # Errors
///
/// Returns [`BrowserError::Serialization`] if the value is not the expected
/// object shape.
pub fn parse_snapshot(value: Value) -> Result<PageSnapshot, BrowserError> {
    if value.is_null() {
        return Err(BrowserError::JavaScript(
            "signal script returned no value".to_owned(),
        ));
    }
    let raw: RawSnapshot = serde_json::from_value(value)?;
    Ok(PageSnapshot {
        url: raw.url,
        title: raw.title,
        signals: raw.signals,
        page_text: raw.text.chars().take(PAGE_TEXT_LIMIT).collect(),
    })
}
