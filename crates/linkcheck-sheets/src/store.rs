use async_trait::async_trait;

use crate::error::SheetsError;

/// Range-oriented access to a spreadsheet.
///
/// Ranges use A1 notation including the sheet name, e.g. `Sheet1!B2:C2`.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Read the populated cells of `range`, one `Vec` per row. Trailing
    /// empty rows and cells are omitted, as the Sheets API does.
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError>;

    /// Overwrite `range` with `values`, row-major.
    async fn write_range(&self, range: &str, values: Vec<Vec<String>>) -> Result<(), SheetsError>;
}
