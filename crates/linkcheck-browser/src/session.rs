//! Sequential CDP session attached to one browser tab.
//!
//! Commands are issued one at a time: [`CdpSession::call`] sends a request
//! and reads frames until the matching response arrives, discarding events
//! in between.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

use crate::error::BrowserError;
use crate::protocol::{CdpRequest, CdpResponse, Cookie, PageInfo};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);
const READY_STATE_POLL: Duration = Duration::from_millis(250);

pub struct CdpSession {
    ws: WsStream,
    next_id: u64,
    call_timeout: Duration,
}

impl CdpSession {
    /// Attach to the first open tab of the Chrome instance at `endpoint`
    /// (e.g. `http://127.0.0.1:9222`), opening a new tab if none exists.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::ChromeNotAvailable`] if the discovery endpoint
    /// cannot be reached and [`BrowserError::WebSocket`] if the tab's
    /// debugger socket refuses the connection.
    pub async fn connect(endpoint: &str) -> Result<Self, BrowserError> {
        let ws_url = discover_page_ws_url(endpoint).await?;
        Self::connect_ws(&ws_url).await
    }

    /// Attach directly to a tab's `webSocketDebuggerUrl`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::WebSocket`] if the handshake fails.
    pub async fn connect_ws(ws_url: &str) -> Result<Self, BrowserError> {
        let (ws, _) = tokio_tungstenite::connect_async(ws_url).await?;
        debug!(ws_url, "attached to DevTools page target");
        Ok(Self {
            ws,
            next_id: 1,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Send one CDP command and wait for its result.
    ///
    /// # Errors
    ///
    /// - [`BrowserError::Protocol`] when Chrome answers with an error object.
    /// - [`BrowserError::Timeout`] when no answer arrives within the call timeout.
    /// - [`BrowserError::SessionClosed`] when the socket closes first.
    pub async fn call(&mut self, method: &str, params: Value) -> Result<Value, BrowserError> {
        let id = self.next_id;
        self.next_id += 1;

        let request = serde_json::to_string(&CdpRequest { id, method, params })?;
        trace!(%request, "CDP send");
        self.ws.send(Message::Text(request.into())).await?;

        let timeout = self.call_timeout;
        tokio::time::timeout(timeout, self.read_response(id))
            .await
            .map_err(|_| BrowserError::Timeout(format!("{method} got no response in {timeout:?}")))?
    }

    async fn read_response(&mut self, id: u64) -> Result<Value, BrowserError> {
        while let Some(frame) = self.ws.next().await {
            let text = match frame? {
                Message::Text(text) => text,
                Message::Close(_) => return Err(BrowserError::SessionClosed),
                _ => continue,
            };
            let response: CdpResponse = serde_json::from_str(&text)?;
            if response.id != Some(id) {
                trace!(method = ?response.method, "skipping CDP event");
                continue;
            }
            if let Some(error) = response.error {
                return Err(BrowserError::Protocol {
                    code: error.code,
                    message: error.message,
                });
            }
            return Ok(response.result.unwrap_or(Value::Null));
        }
        Err(BrowserError::SessionClosed)
    }

    /// Evaluate `expression` in the page and return its JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::JavaScript`] if the expression throws.
    pub async fn evaluate(&mut self, expression: &str) -> Result<Value, BrowserError> {
        let result = self
            .call(
                "Runtime.evaluate",
                json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let text = exception
                .pointer("/exception/description")
                .or_else(|| exception.get("text"))
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            return Err(BrowserError::JavaScript(text.to_owned()));
        }

        Ok(result
            .pointer("/result/value")
            .cloned()
            .unwrap_or(Value::Null))
    }

    /// Navigate the tab and wait until `document.readyState` is `complete`.
    ///
    /// # Errors
    ///
    /// - [`BrowserError::NavigationFailed`] when Chrome reports an `errorText`.
    /// - [`BrowserError::Timeout`] when the page does not finish loading in `timeout`.
    pub async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        let result = self.call("Page.navigate", json!({ "url": url })).await?;
        if let Some(reason) = result.get("errorText").and_then(Value::as_str) {
            return Err(BrowserError::NavigationFailed {
                url: url.to_owned(),
                reason: reason.to_owned(),
            });
        }
        self.wait_for_ready_state(url, timeout).await
    }

    async fn wait_for_ready_state(
        &mut self,
        url: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let state = self.evaluate("document.readyState").await?;
            if state.as_str() == Some("complete") {
                debug!(url, "page loaded");
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BrowserError::Timeout(format!(
                    "{url} did not finish loading in {timeout:?}"
                )));
            }
            tokio::time::sleep(READY_STATE_POLL).await;
        }
    }

    /// Current `location.href` of the tab.
    ///
    /// # Errors
    ///
    /// Propagates evaluation failures.
    pub async fn current_url(&mut self) -> Result<String, BrowserError> {
        let value = self.evaluate("window.location.href").await?;
        Ok(value.as_str().unwrap_or_default().to_owned())
    }

    /// All cookies of the browser profile.
    ///
    /// # Errors
    ///
    /// Propagates CDP failures and malformed cookie payloads.
    pub async fn get_cookies(&mut self) -> Result<Vec<Cookie>, BrowserError> {
        let result = self.call("Network.getAllCookies", json!({})).await?;
        let cookies = result.get("cookies").cloned().unwrap_or(Value::Array(Vec::new()));
        Ok(serde_json::from_value(cookies)?)
    }

    /// Install `cookies` into the browser profile.
    ///
    /// # Errors
    ///
    /// Propagates CDP failures.
    pub async fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<(), BrowserError> {
        if cookies.is_empty() {
            return Ok(());
        }
        let params: Vec<Cookie> = cookies.iter().map(Cookie::to_param).collect();
        self.call("Network.setCookies", json!({ "cookies": params }))
            .await?;
        Ok(())
    }
}

/// Resolve the debugger WebSocket URL of a page target via the HTTP
/// discovery endpoints.
pub(crate) async fn discover_page_ws_url(endpoint: &str) -> Result<String, BrowserError> {
    let base = endpoint.trim_end_matches('/');
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let pages: Vec<PageInfo> = client
        .get(format!("{base}/json/list"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if let Some(ws) = pages
        .into_iter()
        .filter(|p| p.page_type == "page")
        .find_map(|p| p.web_socket_debugger_url)
    {
        return Ok(ws);
    }

    debug!(endpoint = base, "no open tab; creating one");
    let created: PageInfo = client
        .put(format!("{base}/json/new?about:blank"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    created.web_socket_debugger_url.ok_or_else(|| {
        BrowserError::ConnectionFailed(format!(
            "new tab at {} has no webSocketDebuggerUrl",
            created.url
        ))
    })
}
