//! The `check` command: load profiles from the sheet, check each one in the
//! browser and write statuses back.
//!
//! Setup failures (sheet client, input range, browser, login) abort the run.
//! Everything after setup is per-profile and only counted.

mod runner;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, TimeZone};
use clap::Args;
use linkcheck_browser::{ensure_logged_in, CdpSession, CookieStore, Credentials, LinkedInBrowser};
use linkcheck_core::{AppConfig, ConnectionStatus, Profile};
use linkcheck_llm::{build_classifier, LlmSettings};
use linkcheck_sheets::{
    ensure_header, export_statuses, load_profiles, RetryPolicy, SheetLayout, SheetsClient,
};

use runner::{process_profiles, ProfileOutcome, RunOptions, RunReport};

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Check at most this many profiles
    #[arg(long)]
    pub limit: Option<usize>,

    /// First sheet row to check; earlier rows are skipped (data starts at row 2)
    #[arg(long, value_parser = clap::value_parser!(u32).range(2..))]
    pub start_row: Option<u32>,

    /// Always write the local CSV export, not only on write failures
    #[arg(long)]
    pub export: bool,

    /// Classify profiles without writing to the sheet
    #[arg(long)]
    pub dry_run: bool,
}

/// Apply `--start-row` and `--limit` without touching row numbers.
pub(crate) fn select_profiles(
    profiles: Vec<Profile>,
    start_row: Option<u32>,
    limit: Option<usize>,
) -> Vec<Profile> {
    let from = start_row.unwrap_or(0);
    profiles
        .into_iter()
        .filter(|p| p.row >= from)
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

fn credentials(config: &AppConfig) -> Option<Credentials> {
    match (&config.linkedin_email, &config.linkedin_password) {
        (Some(email), Some(password)) => Some(Credentials {
            email: email.clone(),
            password: password.clone(),
        }),
        _ => None,
    }
}

/// Run a full check.
///
/// # Errors
///
/// Returns an error if the Sheets client or fallback classifier cannot be
/// built, the input range cannot be read, Chrome is unreachable, login
/// fails, or the CSV export cannot be written. The summary is printed before
/// an export error is returned.
pub(crate) async fn run_check(config: &AppConfig, args: &CheckArgs) -> anyhow::Result<()> {
    let sheets = SheetsClient::new(
        &config.sheets_api_base,
        &config.spreadsheet_id,
        &config.sheets_access_token,
        config.navigation_timeout_secs,
    )
    .context("failed to build Google Sheets client")?;
    let layout = SheetLayout::new(config.sheet_name.clone());

    let all = load_profiles(&sheets, &layout)
        .await
        .with_context(|| format!("failed to read profiles from {}", layout.input_range()))?;
    let loaded = all.len();
    let profiles = select_profiles(all, args.start_row, args.limit);
    if profiles.is_empty() {
        println!("no profiles to check ({loaded} loaded from {})", layout.input_range());
        return Ok(());
    }
    tracing::info!(loaded, selected = profiles.len(), "loaded profiles from sheet");

    if !args.dry_run {
        match ensure_header(&sheets, &layout).await {
            Ok(true) => tracing::info!("wrote sheet header row"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "could not verify sheet header row"),
        }
    }

    let fallback = build_classifier(&LlmSettings::from_app_config(config))
        .context("failed to build fallback classifier")?;

    let navigation_timeout = Duration::from_secs(config.navigation_timeout_secs);
    let mut session = CdpSession::connect(&config.cdp_endpoint)
        .await
        .with_context(|| format!("failed to connect to Chrome at {}", config.cdp_endpoint))?
        .with_call_timeout(navigation_timeout);
    let outcome = ensure_logged_in(
        &mut session,
        &CookieStore::new(config.cookies_path.clone()),
        credentials(config).as_ref(),
        navigation_timeout,
        Duration::from_secs(config.login_timeout_secs),
    )
    .await
    .context("LinkedIn login failed")?;
    tracing::info!(?outcome, "LinkedIn session ready");

    let mut browser = LinkedInBrowser::new(session, navigation_timeout);
    let options = RunOptions {
        profile_delay: Duration::from_millis(config.profile_delay_ms),
        retry: RetryPolicy::new(
            config.update_max_attempts,
            Duration::from_millis(config.update_backoff_step_ms),
        ),
        dry_run: args.dry_run,
    };
    let report = process_profiles(
        profiles,
        &mut browser,
        fallback.as_ref(),
        &sheets,
        &layout,
        &options,
    )
    .await;

    let finished = finish_run(&report, &config.export_dir, args.export, &chrono::Local::now());
    for line in &finished.lines {
        println!("{line}");
    }
    finished.export.map(|_| ())
}

/// Summary lines plus the outcome of the CSV export.
pub(crate) struct FinishedRun {
    pub lines: Vec<String>,
    pub export: anyhow::Result<Option<PathBuf>>,
}

/// Write the CSV export when forced or when any sheet write failed, then
/// render the summary. The summary is rendered even if the export fails.
pub(crate) fn finish_run<Tz>(
    report: &RunReport,
    export_dir: &Path,
    force_export: bool,
    now: &DateTime<Tz>,
) -> FinishedRun
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let export = if force_export || !report.write_failures().is_empty() {
        export_statuses(export_dir, &report.export_entries(), now)
            .map(Some)
            .with_context(|| format!("failed to write status export to {}", export_dir.display()))
    } else {
        Ok(None)
    };

    let mut lines = summary_lines(report);
    match &export {
        Ok(Some(path)) => lines.push(format!("export written to {}", path.display())),
        Ok(None) => {}
        Err(e) => lines.push(format!("export failed: {e:#}")),
    }
    FinishedRun { lines, export }
}

fn summary_lines(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();
    for p in &report.profiles {
        if let (ProfileOutcome::DryRun, Some(result)) = (&p.outcome, &p.result) {
            lines.push(format!(
                "row {:>4}  {:<13}  {}  {}",
                p.profile.row,
                result.status.as_sheet_value(),
                result.confidence_label(),
                p.profile.url
            ));
        }
    }

    for (profile, error) in report.capture_failures() {
        lines.push(format!("  failed row {}: {} ({error})", profile.row, profile.url));
    }

    let write_failures = report.write_failures();
    for failure in &write_failures {
        lines.push(format!(
            "  write failed row {}: {}",
            failure.row,
            failure.diagnostic()
        ));
    }

    let (updated, retried) = report.updated();
    lines.push(format!(
        "checked {} profile(s): {} pending, {} accepted, {} not connected, {} unknown, {} failed",
        report.profiles.len(),
        report.count_status(ConnectionStatus::Pending),
        report.count_status(ConnectionStatus::Accepted),
        report.count_status(ConnectionStatus::NotConnected),
        report.count_status(ConnectionStatus::Unknown),
        report.capture_failures().len(),
    ));
    lines.push(format!(
        "sheet: {updated} row(s) updated ({retried} after retry), {} write failure(s)",
        write_failures.len()
    ));
    if write_failures.iter().any(|f| f.is_permission_denied()) {
        lines.push(
            "the sheet rejected writes with a permission error; check the token's scope".to_owned(),
        );
    }
    lines
}

#[cfg(test)]
#[path = "check_test.rs"]
mod tests;
