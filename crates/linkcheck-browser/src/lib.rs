//! Browser automation for connection-status checks.
//!
//! Talks to an already running Chrome (`--remote-debugging-port`) over the
//! DevTools Protocol: restores or creates a LinkedIn session, then loads
//! profile pages one at a time and extracts the DOM signals the classifier
//! needs.

pub mod cookies;
pub mod error;
pub mod login;
pub mod page;
pub mod protocol;
pub mod session;
pub mod signals;

pub use cookies::CookieStore;
pub use error::BrowserError;
pub use login::{ensure_logged_in, Credentials, LoginOutcome};
pub use page::{LinkedInBrowser, ProfilePageSource};
pub use protocol::Cookie;
pub use session::CdpSession;
pub use signals::{BlockReason, PageSnapshot};
