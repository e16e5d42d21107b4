use chrono::{TimeZone, Utc};
use linkcheck_core::ClassificationResult;
use linkcheck_sheets::{SheetsError, UpdateFailure};

use super::runner::ProfileReport;
use super::*;

fn profiles(rows: &[u32]) -> Vec<Profile> {
    rows.iter()
        .map(|row| Profile::new(format!("https://www.linkedin.com/in/p{row}"), *row))
        .collect()
}

fn rows(profiles: &[Profile]) -> Vec<u32> {
    profiles.iter().map(|p| p.row).collect()
}

#[test]
fn no_filters_keeps_everything() {
    let selected = select_profiles(profiles(&[2, 3, 5]), None, None);
    assert_eq!(rows(&selected), vec![2, 3, 5]);
}

#[test]
fn start_row_skips_earlier_rows_and_keeps_numbers() {
    let selected = select_profiles(profiles(&[2, 3, 5, 6]), Some(4), None);
    assert_eq!(rows(&selected), vec![5, 6]);
}

#[test]
fn limit_applies_after_start_row() {
    let selected = select_profiles(profiles(&[2, 3, 5, 6]), Some(3), Some(2));
    assert_eq!(rows(&selected), vec![3, 5]);
}

#[test]
fn zero_limit_selects_nothing() {
    assert!(select_profiles(profiles(&[2, 3]), None, Some(0)).is_empty());
}

fn classified(
    url: &str,
    row: u32,
    status: ConnectionStatus,
    outcome: ProfileOutcome,
) -> ProfileReport {
    let mut profile = Profile::new(url, row);
    profile.assign_status(status);
    ProfileReport {
        profile,
        result: Some(ClassificationResult::new(status, 0.95, "test")),
        outcome,
    }
}

fn denied_write(row: u32) -> ProfileOutcome {
    ProfileOutcome::WriteFailed(UpdateFailure {
        row,
        attempts: 3,
        last_error: SheetsError::PermissionDenied {
            status: 403,
            message: "The caller does not have permission".to_owned(),
        },
    })
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()
}

#[test]
fn write_failure_exports_and_reports_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let report = RunReport {
        profiles: vec![classified(
            "https://www.linkedin.com/in/a",
            2,
            ConnectionStatus::Pending,
            denied_write(2),
        )],
    };

    let finished = finish_run(&report, dir.path(), false, &now());

    let path = finished.export.unwrap().expect("export should be written");
    assert!(path.ends_with("linkedin_status_20240501_123000.csv"));
    let body = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        body,
        "LinkedIn URL,Connection Status\nhttps://www.linkedin.com/in/a,Pending\n"
    );
    assert!(finished.lines.iter().any(|l| l.starts_with("export written to")));
    assert!(finished.lines.iter().any(|l| l.contains("permission error")));
}

#[test]
fn clean_run_skips_export_unless_forced() {
    let dir = tempfile::tempdir().unwrap();
    let report = RunReport {
        profiles: vec![classified(
            "https://www.linkedin.com/in/a",
            2,
            ConnectionStatus::Accepted,
            ProfileOutcome::Updated { attempts: 1 },
        )],
    };

    let finished = finish_run(&report, dir.path(), false, &now());
    assert!(finished.export.unwrap().is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    let forced = finish_run(&report, dir.path(), true, &now());
    assert!(forced.export.unwrap().is_some());
}

#[test]
fn summary_survives_a_failed_export() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file in the way").unwrap();
    let report = RunReport {
        profiles: vec![classified(
            "https://www.linkedin.com/in/a",
            2,
            ConnectionStatus::Pending,
            denied_write(2),
        )],
    };

    let finished = finish_run(&report, &blocker, false, &now());

    assert!(finished.export.is_err());
    assert!(finished
        .lines
        .iter()
        .any(|l| l.starts_with("checked 1 profile(s): 1 pending")));
    assert!(finished.lines.iter().any(|l| l.contains("write failed row 2")));
    assert!(finished.lines.iter().any(|l| l.starts_with("export failed:")));
}
