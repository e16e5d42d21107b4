//! Integration tests for `CdpSession` and `LinkedInBrowser` against a fake
//! DevTools endpoint: `wiremock` serves HTTP discovery and a local
//! `tokio-tungstenite` server answers CDP commands.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use linkcheck_browser::{
    ensure_logged_in, BlockReason, BrowserError, CdpSession, CookieStore, Credentials,
    LinkedInBrowser, LoginOutcome, ProfilePageSource,
};

const FEED: &str = "https://www.linkedin.com/feed/";
const LOGIN_WALL: &str = "https://www.linkedin.com/uas/login?session_redirect=%2Ffeed%2F";

type CallLog = Arc<Mutex<Vec<String>>>;

/// One fake browser tab. With `fixed_url` set, `location.href` never changes;
/// otherwise it follows navigation and the LinkedIn session state.
struct FakeTab {
    fixed_url: Option<&'static str>,
    signals: Value,
    logged_in: bool,
    current_url: String,
}

impl FakeTab {
    fn profile_page(page_url: &'static str, signals: Value) -> Self {
        Self {
            fixed_url: Some(page_url),
            signals,
            logged_in: true,
            current_url: page_url.to_owned(),
        }
    }

    fn linkedin(logged_in: bool) -> Self {
        Self {
            fixed_url: None,
            signals: json!({}),
            logged_in,
            current_url: "about:blank".to_owned(),
        }
    }

    fn href(&self) -> String {
        self.fixed_url
            .map_or_else(|| self.current_url.clone(), str::to_owned)
    }

    /// Answers one CDP command. Returns `Err` for a protocol error payload.
    fn answer(&mut self, method: &str, params: &Value) -> Result<Value, Value> {
        match method {
            "Page.navigate" => {
                let url = params["url"].as_str().unwrap_or_default();
                self.current_url = if !self.logged_in && url.contains("/feed") {
                    LOGIN_WALL.to_owned()
                } else if self.logged_in && url.contains("/login") {
                    FEED.to_owned()
                } else {
                    url.to_owned()
                };
                Ok(json!({ "frameId": "F1", "loaderId": "L1" }))
            }
            "Runtime.evaluate" => {
                let expr = params["expression"].as_str().unwrap_or_default();
                if expr == "document.readyState" {
                    Ok(json!({ "result": { "type": "string", "value": "complete" } }))
                } else if expr == "window.location.href" {
                    Ok(json!({ "result": { "type": "string", "value": self.href() } }))
                } else if expr.contains("#username") {
                    let on_login_page = self.current_url.contains("/login");
                    if on_login_page {
                        self.logged_in = true;
                        self.current_url = FEED.to_owned();
                    }
                    Ok(json!({ "result": { "type": "boolean", "value": on_login_page } }))
                } else if expr.contains("hasConnectButton") {
                    Ok(json!({ "result": { "type": "object", "value": {
                        "url": self.href(),
                        "title": "Profile | LinkedIn",
                        "text": "Jane Doe · 2nd",
                        "signals": self.signals
                    } } }))
                } else if expr == "throw new Error('boom')" {
                    Ok(json!({
                        "result": { "type": "object", "subtype": "error" },
                        "exceptionDetails": {
                            "text": "Uncaught",
                            "exception": { "description": "Error: boom" }
                        }
                    }))
                } else {
                    Ok(json!({ "result": { "type": "undefined" } }))
                }
            }
            "Network.getAllCookies" => Ok(json!({ "cookies": [{
                "name": "li_at", "value": "token", "domain": ".www.linkedin.com",
                "path": "/", "expires": -1, "httpOnly": true, "secure": true, "session": true
            }] })),
            "Network.setCookies" => {
                let has_session = params["cookies"]
                    .as_array()
                    .is_some_and(|cookies| cookies.iter().any(|c| c["name"] == "li_at"));
                self.logged_in |= has_session;
                Ok(json!({}))
            }
            other => Err(json!({ "code": -32601, "message": format!("'{other}' wasn't found") })),
        }
    }
}

/// Spawns a fake page target; returns its WebSocket URL and the log of
/// CDP methods it received.
async fn spawn_fake_tab(mut tab: FakeTab) -> (String, CallLog) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = CallLog::default();
    let log = Arc::clone(&calls);

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        while let Some(Ok(msg)) = ws.next().await {
            let Message::Text(text) = msg else { continue };
            let req: Value = serde_json::from_str(&text).unwrap();
            let id = req["id"].as_u64().unwrap();
            let method = req["method"].as_str().unwrap().to_owned();
            log.lock().unwrap().push(method.clone());

            // An unrelated event before every response.
            let event = json!({ "method": "Page.frameStartedLoading", "params": {} });
            ws.send(Message::Text(event.to_string().into())).await.unwrap();

            let reply = match tab.answer(&method, &req["params"]) {
                Ok(result) => json!({ "id": id, "result": result }),
                Err(error) => json!({ "id": id, "error": error }),
            };
            ws.send(Message::Text(reply.to_string().into())).await.unwrap();
        }
    });

    (format!("ws://{addr}/devtools/page/ABC"), calls)
}

async fn spawn_fake_page(page_url: &'static str, signals: Value) -> String {
    spawn_fake_tab(FakeTab::profile_page(page_url, signals)).await.0
}

fn count(calls: &CallLog, method: &str) -> usize {
    calls.lock().unwrap().iter().filter(|m| *m == method).count()
}

async fn discovery_server(ws_url: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "type": "service_worker",
                "url": "chrome://sw",
                "webSocketDebuggerUrl": "ws://127.0.0.1:1/nope"
            },
            { "type": "page", "url": "about:blank", "webSocketDebuggerUrl": ws_url }
        ])))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn capture_returns_signals_for_profile_page() {
    let ws_url = spawn_fake_page(
        "https://www.linkedin.com/in/jane-doe/",
        json!({ "hasConnectButton": true, "connectionDegree": "2nd" }),
    )
    .await;
    let discovery = discovery_server(&ws_url).await;

    let session = CdpSession::connect(&discovery.uri()).await.unwrap();
    let mut browser =
        LinkedInBrowser::new(session, Duration::from_secs(5)).with_settle_delay(Duration::ZERO);

    let snapshot = browser
        .capture("https://www.linkedin.com/in/jane-doe")
        .await
        .expect("capture should succeed");

    assert!(snapshot.signals.has_connect_button);
    assert!(!snapshot.signals.has_pending_button);
    assert_eq!(snapshot.signals.connection_degree, "2nd");
    assert_eq!(snapshot.page_text, "Jane Doe · 2nd");
}

#[tokio::test]
async fn capture_reports_auth_wall_as_blocked() {
    let ws_url = spawn_fake_page("https://www.linkedin.com/authwall?trk=x", json!({})).await;
    let discovery = discovery_server(&ws_url).await;

    let session = CdpSession::connect(&discovery.uri()).await.unwrap();
    let mut browser =
        LinkedInBrowser::new(session, Duration::from_secs(5)).with_settle_delay(Duration::ZERO);

    let err = browser
        .capture("https://www.linkedin.com/in/jane-doe")
        .await
        .unwrap_err();
    assert!(
        matches!(err, BrowserError::Blocked { reason: BlockReason::AuthWall, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn protocol_errors_and_exceptions_are_typed() {
    let ws_url = spawn_fake_page("about:blank", json!({})).await;
    let mut session = CdpSession::connect_ws(&ws_url).await.unwrap();

    let err = session.call("Boom.fail", json!({})).await.unwrap_err();
    assert!(
        matches!(err, BrowserError::Protocol { code: -32601, .. }),
        "got {err:?}"
    );

    let err = session
        .evaluate("throw new Error('boom')")
        .await
        .unwrap_err();
    assert!(
        matches!(err, BrowserError::JavaScript(ref m) if m == "Error: boom"),
        "got {err:?}"
    );

    let cookies = session.get_cookies().await.unwrap();
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, "li_at");
}

#[tokio::test]
async fn unreachable_endpoint_is_chrome_not_available() {
    let err = CdpSession::connect("http://127.0.0.1:1").await.err().unwrap();
    assert!(
        matches!(err, BrowserError::ChromeNotAvailable(_)),
        "got {err:?}"
    );
}

const TIMEOUT: Duration = Duration::from_secs(5);

fn credentials() -> Credentials {
    Credentials {
        email: "jane@example.com".to_owned(),
        password: "hunter2".to_owned(),
    }
}

#[tokio::test]
async fn login_restores_session_from_cookie_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cookies.json");
    std::fs::write(
        &path,
        r#"[{"name":"li_at","value":"saved","domain":".www.linkedin.com","path":"/"}]"#,
    )
    .unwrap();
    let (ws_url, calls) = spawn_fake_tab(FakeTab::linkedin(false)).await;
    let mut session = CdpSession::connect_ws(&ws_url).await.unwrap();

    let outcome = ensure_logged_in(&mut session, &CookieStore::new(&path), None, TIMEOUT, TIMEOUT)
        .await
        .expect("saved cookies should restore the session");

    assert_eq!(outcome, LoginOutcome::RestoredSession);
    assert_eq!(count(&calls, "Network.setCookies"), 1);
    assert_eq!(count(&calls, "Network.getAllCookies"), 0);
    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains("\"saved\""), "cookie file was rewritten: {saved}");
}

#[tokio::test]
async fn fresh_login_saves_cookies_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = CookieStore::new(dir.path().join("cookies.json"));
    let (ws_url, calls) = spawn_fake_tab(FakeTab::linkedin(false)).await;
    let mut session = CdpSession::connect_ws(&ws_url).await.unwrap();

    let outcome = ensure_logged_in(&mut session, &store, Some(&credentials()), TIMEOUT, TIMEOUT)
        .await
        .expect("credentials should log in");

    assert_eq!(outcome, LoginOutcome::FreshLogin);
    assert_eq!(count(&calls, "Network.setCookies"), 0);
    assert_eq!(count(&calls, "Network.getAllCookies"), 1);
    let cookies = store.load().await.unwrap().expect("cookies should be saved");
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].name, "li_at");
}

#[tokio::test]
async fn live_browser_session_is_used_without_cookie_file_or_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let store = CookieStore::new(dir.path().join("cookies.json"));
    let (ws_url, calls) = spawn_fake_tab(FakeTab::linkedin(true)).await;
    let mut session = CdpSession::connect_ws(&ws_url).await.unwrap();

    let outcome = ensure_logged_in(&mut session, &store, None, TIMEOUT, TIMEOUT)
        .await
        .expect("a logged-in browser should be accepted");

    assert_eq!(outcome, LoginOutcome::RestoredSession);
    assert_eq!(count(&calls, "Network.setCookies"), 0);
    assert_eq!(count(&calls, "Network.getAllCookies"), 1);
    assert!(store.load().await.unwrap().is_some());
}

#[tokio::test]
async fn logged_out_browser_without_credentials_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = CookieStore::new(dir.path().join("cookies.json"));
    let (ws_url, _calls) = spawn_fake_tab(FakeTab::linkedin(false)).await;
    let mut session = CdpSession::connect_ws(&ws_url).await.unwrap();

    let err = ensure_logged_in(&mut session, &store, None, TIMEOUT, TIMEOUT)
        .await
        .unwrap_err();

    assert!(matches!(err, BrowserError::LoginFailed(_)), "got {err:?}");
    assert!(store.load().await.unwrap().is_none());
}
