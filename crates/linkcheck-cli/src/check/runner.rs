//! Sequential per-profile loop for a check run.
//!
//! Capture, classify, write back; one profile at a time with a fixed pause
//! between profiles. Per-profile failures are recorded in the [`RunReport`]
//! and never abort the loop.

use std::time::Duration;

use linkcheck_browser::{BrowserError, PageSnapshot, ProfilePageSource};
use linkcheck_core::{classify, ClassificationResult, ConnectionStatus, Profile};
use linkcheck_llm::PageClassifier;
use linkcheck_sheets::{
    update_with_retry, ExportEntry, RetryPolicy, SheetLayout, SheetStore, UpdateFailure,
};

#[derive(Debug, Clone, Copy)]
pub(crate) struct RunOptions {
    /// Pause between consecutive profiles. Not applied before the first.
    pub profile_delay: Duration,
    pub retry: RetryPolicy,
    /// Classify but never write to the sheet.
    pub dry_run: bool,
}

/// What happened to one profile.
#[derive(Debug)]
pub(crate) enum ProfileOutcome {
    Updated { attempts: u32 },
    DryRun,
    WriteFailed(UpdateFailure),
    CaptureFailed(BrowserError),
}

#[derive(Debug)]
pub(crate) struct ProfileReport {
    pub profile: Profile,
    /// `None` when the page could not be captured.
    pub result: Option<ClassificationResult>,
    pub outcome: ProfileOutcome,
}

#[derive(Debug, Default)]
pub(crate) struct RunReport {
    pub profiles: Vec<ProfileReport>,
}

impl RunReport {
    pub fn count_status(&self, status: ConnectionStatus) -> usize {
        self.profiles
            .iter()
            .filter(|p| p.profile.status() == Some(status))
            .count()
    }

    pub fn capture_failures(&self) -> Vec<(&Profile, &BrowserError)> {
        self.profiles
            .iter()
            .filter_map(|p| match &p.outcome {
                ProfileOutcome::CaptureFailed(error) => Some((&p.profile, error)),
                _ => None,
            })
            .collect()
    }

    pub fn write_failures(&self) -> Vec<&UpdateFailure> {
        self.profiles
            .iter()
            .filter_map(|p| match &p.outcome {
                ProfileOutcome::WriteFailed(failure) => Some(failure),
                _ => None,
            })
            .collect()
    }

    /// `(updated, of which needed more than one attempt)`.
    pub fn updated(&self) -> (usize, usize) {
        self.profiles
            .iter()
            .fold((0, 0), |(updated, retried), p| match p.outcome {
                ProfileOutcome::Updated { attempts } => {
                    (updated + 1, retried + usize::from(attempts > 1))
                }
                _ => (updated, retried),
            })
    }

    /// Every classified profile, in sheet order, for the CSV export.
    pub fn export_entries(&self) -> Vec<ExportEntry> {
        self.profiles
            .iter()
            .filter_map(|p| {
                p.profile.status().map(|status| ExportEntry {
                    url: p.profile.url.clone(),
                    status,
                })
            })
            .collect()
    }
}

/// Rule table first; the fallback classifier only sees pages the table
/// could not place, and only a non-`Unknown` answer replaces the table's.
pub(crate) async fn classify_snapshot(
    snapshot: &PageSnapshot,
    fallback: &dyn PageClassifier,
) -> ClassificationResult {
    let heuristic = classify(&snapshot.signals);
    if heuristic.status != ConnectionStatus::Unknown {
        return heuristic;
    }

    match fallback.classify_page(&snapshot.page_text).await {
        Ok(Some(result)) if result.status != ConnectionStatus::Unknown => {
            tracing::debug!(
                classifier = fallback.name(),
                status = %result.status,
                "fallback classifier placed page"
            );
            result
        }
        Ok(_) => heuristic,
        Err(e) => {
            tracing::warn!(
                classifier = fallback.name(),
                error = %e,
                "fallback classifier failed; keeping rule-table result"
            );
            heuristic
        }
    }
}

/// Process `profiles` in order and return what happened to each.
pub(crate) async fn process_profiles(
    profiles: Vec<Profile>,
    pages: &mut dyn ProfilePageSource,
    fallback: &dyn PageClassifier,
    store: &dyn SheetStore,
    layout: &SheetLayout,
    options: &RunOptions,
) -> RunReport {
    let total = profiles.len();
    let mut report = RunReport::default();

    for (index, mut profile) in profiles.into_iter().enumerate() {
        if index > 0 && !options.profile_delay.is_zero() {
            tokio::time::sleep(options.profile_delay).await;
        }
        tracing::info!(
            row = profile.row,
            url = %profile.url,
            position = index + 1,
            total,
            "checking profile"
        );

        let snapshot = match pages.capture(&profile.url).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::error!(
                    row = profile.row,
                    url = %profile.url,
                    error = %error,
                    "profile check failed"
                );
                report.profiles.push(ProfileReport {
                    profile,
                    result: None,
                    outcome: ProfileOutcome::CaptureFailed(error),
                });
                continue;
            }
        };

        let result = classify_snapshot(&snapshot, fallback).await;
        profile.assign_status(result.status);
        tracing::info!(
            row = profile.row,
            status = %result.status,
            confidence = result.confidence,
            reasoning = %result.reasoning,
            "classified profile"
        );

        let outcome = if options.dry_run {
            ProfileOutcome::DryRun
        } else {
            match update_with_retry(store, layout, profile.row, &result, options.retry).await {
                Ok(success) => ProfileOutcome::Updated {
                    attempts: success.attempts,
                },
                Err(failure) => ProfileOutcome::WriteFailed(failure),
            }
        };
        report.profiles.push(ProfileReport {
            profile,
            result: Some(result),
            outcome,
        });
    }

    report
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
