use std::time::Duration;

use async_trait::async_trait;

use crate::error::BrowserError;
use crate::session::CdpSession;
use crate::signals::{parse_snapshot, PageSnapshot, SIGNALS_SCRIPT};

/// Something that can load a profile URL and report its page signals.
#[async_trait]
pub trait ProfilePageSource: Send {
    /// Load `url` and capture its signals.
    ///
    /// Blocked pages (auth wall, rate limit, missing profile) are errors,
    /// not snapshots, so callers never classify them.
    async fn capture(&mut self, url: &str) -> Result<PageSnapshot, BrowserError>;
}

/// [`ProfilePageSource`] backed by a logged-in Chrome tab.
pub struct LinkedInBrowser {
    session: CdpSession,
    navigation_timeout: Duration,
    /// Wait after `load` for the profile top card to render.
    settle_delay: Duration,
}

impl LinkedInBrowser {
    #[must_use]
    pub fn new(session: CdpSession, navigation_timeout: Duration) -> Self {
        Self {
            session,
            navigation_timeout,
            settle_delay: Duration::from_millis(1_500),
        }
    }

    #[must_use]
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }
}

#[async_trait]
impl ProfilePageSource for LinkedInBrowser {
    async fn capture(&mut self, url: &str) -> Result<PageSnapshot, BrowserError> {
        self.session.navigate(url, self.navigation_timeout).await?;
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let value = self.session.evaluate(SIGNALS_SCRIPT).await?;
        let snapshot = parse_snapshot(value)?;

        if let Some(reason) = snapshot.block_reason() {
            return Err(BrowserError::Blocked {
                reason,
                url: snapshot.url,
            });
        }

        tracing::debug!(url, signals = ?snapshot.signals, "captured page signals");
        Ok(snapshot)
    }
}
