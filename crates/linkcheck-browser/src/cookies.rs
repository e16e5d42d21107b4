//! File-backed LinkedIn session cookies.

use std::path::{Path, PathBuf};

use crate::error::BrowserError;
use crate::protocol::Cookie;

/// JSON file holding the cookies of the last successful login.
#[derive(Debug, Clone)]
pub struct CookieStore {
    path: PathBuf,
}

impl CookieStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved cookies, or `None` when no usable file exists. A corrupt file
    /// is logged and treated as absent so a fresh login can replace it.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Io`] for read failures other than not-found.
    pub async fn load(&self) -> Result<Option<Vec<Cookie>>, BrowserError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Vec<Cookie>>(&raw) {
            Ok(cookies) if cookies.is_empty() => Ok(None),
            Ok(cookies) => {
                tracing::debug!(
                    path = %self.path.display(),
                    count = cookies.len(),
                    "loaded saved cookies"
                );
                Ok(Some(cookies))
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring unreadable cookie file"
                );
                Ok(None)
            }
        }
    }

    /// Persist the LinkedIn cookies among `cookies`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError::Io`] if the file cannot be written.
    pub async fn save(&self, cookies: &[Cookie]) -> Result<usize, BrowserError> {
        let linkedin: Vec<&Cookie> = cookies
            .iter()
            .filter(|c| is_linkedin_domain(&c.domain))
            .collect();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_string_pretty(&linkedin)?;
        tokio::fs::write(&self.path, body).await?;
        tracing::info!(
            path = %self.path.display(),
            count = linkedin.len(),
            "saved session cookies"
        );
        Ok(linkedin.len())
    }
}

fn is_linkedin_domain(domain: &str) -> bool {
    let domain = domain.trim_start_matches('.');
    domain == "linkedin.com" || domain.ends_with(".linkedin.com")
}
