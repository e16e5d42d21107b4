//! Loading the profile list from the sheet.

use linkcheck_core::{normalize_profile_url, Profile};

use crate::error::SheetsError;
use crate::layout::{SheetLayout, FIRST_DATA_ROW, HEADER};
use crate::store::SheetStore;

/// Read every profile URL from the sheet's URL column.
///
/// Row numbers are positional: the n-th returned row of the input range maps
/// to sheet row `FIRST_DATA_ROW + n`. Blank cells are skipped but still
/// consume their row number, so later profiles keep their true position.
/// URLs are canonicalized with [`normalize_profile_url`].
///
/// # Errors
///
/// Returns the underlying [`SheetsError`] if the range cannot be read.
pub async fn load_profiles(
    store: &dyn SheetStore,
    layout: &SheetLayout,
) -> Result<Vec<Profile>, SheetsError> {
    let rows = store.read_range(&layout.input_range()).await?;

    let mut profiles = Vec::with_capacity(rows.len());
    for (offset, cells) in rows.into_iter().enumerate() {
        let Ok(offset) = u32::try_from(offset) else {
            tracing::warn!("profile list exceeds addressable rows; truncating");
            break;
        };
        let row = FIRST_DATA_ROW + offset;
        let raw = cells.into_iter().next().unwrap_or_default();
        if raw.trim().is_empty() {
            tracing::debug!(row, "skipping blank URL cell");
            continue;
        }
        profiles.push(Profile::new(normalize_profile_url(&raw), row));
    }

    tracing::info!(count = profiles.len(), "loaded profiles from sheet");
    Ok(profiles)
}

/// Write the header row if the status or confidence header is missing.
///
/// Returns `true` when the header was written.
///
/// # Errors
///
/// Returns the underlying [`SheetsError`] if the header cannot be read or
/// written.
pub async fn ensure_header(
    store: &dyn SheetStore,
    layout: &SheetLayout,
) -> Result<bool, SheetsError> {
    let range = layout.header_range();
    let existing = store.read_range(&range).await?;
    let first = existing.into_iter().next().unwrap_or_default();

    let complete = first.len() >= HEADER.len() && first.iter().skip(1).all(|c| !c.is_empty());
    if complete {
        return Ok(false);
    }

    let url_header = first
        .first()
        .filter(|c| !c.is_empty())
        .cloned()
        .unwrap_or_else(|| HEADER[0].to_owned());
    let row = vec![url_header, HEADER[1].to_owned(), HEADER[2].to_owned()];
    store.write_range(&range, vec![row]).await?;
    tracing::info!(range, "wrote sheet header");
    Ok(true)
}
