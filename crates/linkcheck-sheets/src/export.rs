//! Local CSV export used when the sheet cannot be written.
//!
//! The file is plain `url,status` lines under a fixed header with no
//! quoting; neither canonical profile URLs nor status labels contain commas.

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use csv::{QuoteStyle, WriterBuilder};
use linkcheck_core::ConnectionStatus;

use crate::error::SheetsError;

pub const EXPORT_HEADER: [&str; 2] = ["LinkedIn URL", "Connection Status"];

const EXPORT_PREFIX: &str = "linkedin_status";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    pub url: String,
    pub status: ConnectionStatus,
}

/// Write `entries` to a new timestamp-suffixed file in `dir` and return its
/// path. An existing file with the same timestamp is never overwritten; a
/// numeric suffix is appended instead.
///
/// # Errors
///
/// Returns [`SheetsError::Io`] if the directory cannot be created and
/// [`SheetsError::Csv`] if the file cannot be written.
pub fn export_statuses<Tz>(
    dir: &Path,
    entries: &[ExportEntry],
    now: &DateTime<Tz>,
) -> Result<PathBuf, SheetsError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    std::fs::create_dir_all(dir)?;
    let path = unused_export_path(dir, &now.format("%Y%m%d_%H%M%S").to_string());

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_path(&path)?;
    writer.write_record(EXPORT_HEADER)?;
    for entry in entries {
        writer.write_record([entry.url.as_str(), entry.status.as_sheet_value()])?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), rows = entries.len(), "wrote status export");
    Ok(path)
}

fn unused_export_path(dir: &Path, stamp: &str) -> PathBuf {
    let first = dir.join(format!("{EXPORT_PREFIX}_{stamp}.csv"));
    if !first.exists() {
        return first;
    }
    (1u32..)
        .map(|n| dir.join(format!("{EXPORT_PREFIX}_{stamp}_{n}.csv")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}
