//! Column layout of the profile sheet.
//!
//! | Column | Contents          |
//! |--------|-------------------|
//! | A      | LinkedIn URL      |
//! | B      | Connection status |
//! | C      | Confidence        |
//!
//! Row 1 is the header; profiles start at row 2.

/// First row holding profile data.
pub const FIRST_DATA_ROW: u32 = 2;

/// Header written into row 1 by [`SheetLayout::header_range`].
pub const HEADER: [&str; 3] = ["LinkedIn URL", "Connection Status", "Confidence"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    sheet_name: String,
}

impl SheetLayout {
    #[must_use]
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }

    /// Sheet name as it must appear in A1 notation. Names with anything other
    /// than ASCII alphanumerics and `_` are single-quoted.
    #[must_use]
    pub fn quoted_sheet_name(&self) -> String {
        let plain = !self.sheet_name.is_empty()
            && self
                .sheet_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if plain {
            self.sheet_name.clone()
        } else {
            format!("'{}'", self.sheet_name.replace('\'', "''"))
        }
    }

    /// The URL column from the first data row to the end of the sheet.
    #[must_use]
    pub fn input_range(&self) -> String {
        format!("{}!A{FIRST_DATA_ROW}:A", self.quoted_sheet_name())
    }

    /// Status and confidence cells of one row.
    #[must_use]
    pub fn status_range(&self, row: u32) -> String {
        format!("{}!B{row}:C{row}", self.quoted_sheet_name())
    }

    #[must_use]
    pub fn header_range(&self) -> String {
        format!("{}!A1:C1", self.quoted_sheet_name())
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::new("Sheet1")
    }
}
