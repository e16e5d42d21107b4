//! Spreadsheet side of a connection-status run.
//!
//! Reads the profile list from a Google Sheet, writes classified statuses
//! back with a bounded linear-backoff retry, and falls back to a local CSV
//! export when the sheet cannot be written.

pub mod client;
pub mod error;
pub mod export;
pub mod layout;
pub mod profiles;
pub mod retry;
pub mod store;

pub use client::SheetsClient;
pub use error::SheetsError;
pub use export::{export_statuses, ExportEntry, EXPORT_HEADER};
pub use layout::SheetLayout;
pub use profiles::{ensure_header, load_profiles};
pub use retry::{update_with_retry, RetryPolicy, UpdateFailure, UpdateSuccess};
pub use store::SheetStore;
