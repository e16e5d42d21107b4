//! LinkedIn session bootstrap: restore saved cookies or log in fresh.

use std::time::Duration;

use crate::cookies::CookieStore;
use crate::error::BrowserError;
use crate::session::CdpSession;

pub const FEED_URL: &str = "https://www.linkedin.com/feed/";
pub const LOGIN_URL: &str = "https://www.linkedin.com/login";

const LOGIN_POLL: Duration = Duration::from_millis(500);

const LOGIN_SCRIPT_TEMPLATE: &str = r#"(() => {
  const email = document.querySelector('#username');
  const password = document.querySelector('#password');
  if (!email || !password) return false;
  const fill = (el, value) => {
    el.focus();
    el.value = value;
    el.dispatchEvent(new Event('input', { bubbles: true }));
  };
  fill(email, __EMAIL__);
  fill(password, __PASSWORD__);
  const submit = document.querySelector('button[type="submit"]');
  if (submit) { submit.click(); } else if (password.form) { password.form.submit(); }
  return true;
})()"#;

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The browser already held a valid session, from saved cookies or its own profile.
    RestoredSession,
    /// Logged in with credentials; cookies were saved.
    FreshLogin,
}

/// Where the tab is after submitting the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoginProgress {
    LoggedIn,
    Checkpoint,
    Waiting,
}

pub(crate) fn login_progress(current_url: &str) -> LoginProgress {
    let path = url::Url::parse(current_url)
        .map(|u| u.path().to_owned())
        .unwrap_or_default();
    if path.starts_with("/feed") || path.starts_with("/mynetwork") {
        LoginProgress::LoggedIn
    } else if path.starts_with("/checkpoint") || path.contains("/challenge") {
        LoginProgress::Checkpoint
    } else {
        LoginProgress::Waiting
    }
}

/// Build the form-filling script with credentials embedded as JSON string
/// literals, so quotes and backslashes cannot break out of the script.
pub(crate) fn login_script(credentials: &Credentials) -> Result<String, BrowserError> {
    let email = serde_json::to_string(&credentials.email)?;
    let password = serde_json::to_string(&credentials.password)?;
    Ok(LOGIN_SCRIPT_TEMPLATE
        .replace("__EMAIL__", &email)
        .replace("__PASSWORD__", &password))
}

/// Make sure the browser holds an authenticated LinkedIn session.
///
/// Saved cookies, when present, are installed first. The feed is then loaded
/// either way, so a Chrome that is already logged in is used as is and its
/// cookies are saved to `store`. Only when the feed is out of reach are
/// `credentials` used for a fresh login, after which the resulting cookies
/// are written back to `store`.
///
/// # Errors
///
/// - [`BrowserError::LoginFailed`] when no valid session exists and no
///   credentials were supplied, or the login form is missing.
/// - [`BrowserError::CheckpointRequired`] when LinkedIn demands verification.
/// - [`BrowserError::Timeout`] when the feed is not reached in `login_timeout`.
pub async fn ensure_logged_in(
    session: &mut CdpSession,
    store: &CookieStore,
    credentials: Option<&Credentials>,
    navigation_timeout: Duration,
    login_timeout: Duration,
) -> Result<LoginOutcome, BrowserError> {
    let saved = store.load().await?;
    if let Some(cookies) = &saved {
        session.set_cookies(cookies).await?;
    }

    session.navigate(FEED_URL, navigation_timeout).await?;
    let url = session.current_url().await?;
    if login_progress(&url) == LoginProgress::LoggedIn {
        if saved.is_some() {
            tracing::info!("restored LinkedIn session from saved cookies");
        } else {
            tracing::info!("browser already logged in to LinkedIn");
            save_session(session, store).await?;
        }
        return Ok(LoginOutcome::RestoredSession);
    }
    if saved.is_some() {
        tracing::info!(url, "saved session is no longer valid");
    }

    let credentials = credentials.ok_or_else(|| {
        BrowserError::LoginFailed(
            "no valid saved session and LINKEDIN_EMAIL/LINKEDIN_PASSWORD are not set".to_owned(),
        )
    })?;

    session.navigate(LOGIN_URL, navigation_timeout).await?;
    let url = session.current_url().await?;
    match login_progress(&url) {
        LoginProgress::LoggedIn => {
            tracing::info!("login page redirected to the feed");
            save_session(session, store).await?;
            return Ok(LoginOutcome::RestoredSession);
        }
        LoginProgress::Checkpoint => return Err(BrowserError::CheckpointRequired),
        LoginProgress::Waiting => {}
    }

    tracing::info!(email = %credentials.email, "logging in to LinkedIn");
    let submitted = session.evaluate(&login_script(credentials)?).await?;
    if submitted.as_bool() != Some(true) {
        return Err(BrowserError::LoginFailed(
            "login form not found on the login page".to_owned(),
        ));
    }

    let deadline = tokio::time::Instant::now() + login_timeout;
    loop {
        tokio::time::sleep(LOGIN_POLL).await;
        let url = session.current_url().await?;
        match login_progress(&url) {
            LoginProgress::LoggedIn => break,
            LoginProgress::Checkpoint => return Err(BrowserError::CheckpointRequired),
            LoginProgress::Waiting if tokio::time::Instant::now() >= deadline => {
                return Err(BrowserError::Timeout(format!(
                    "login did not reach the feed within {login_timeout:?} (last url: {url})"
                )));
            }
            LoginProgress::Waiting => {}
        }
    }

    save_session(session, store).await?;
    tracing::info!("logged in to LinkedIn");
    Ok(LoginOutcome::FreshLogin)
}

async fn save_session(session: &mut CdpSession, store: &CookieStore) -> Result<(), BrowserError> {
    let cookies = session.get_cookies().await?;
    store.save(&cookies).await?;
    Ok(())
}
