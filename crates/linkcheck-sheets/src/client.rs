//! HTTP client for the Google Sheets v4 `values` API.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::SheetsError;
use crate::store::SheetStore;

/// Characters left unescaped in the range path segment. Everything else,
/// including `!`, `'` and spaces, is percent-encoded.
const RANGE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b':');

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Google Sheets client authenticated with a bearer access token.
///
/// Obtaining the token (OAuth consent, service-account exchange) happens
/// outside this crate.
pub struct SheetsClient {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    access_token: String,
}

impl SheetsClient {
    /// Creates a client for one spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_base: &str,
        spreadsheet_id: &str,
        access_token: &str,
        timeout_secs: u64,
    ) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("linkcheck/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_owned(),
            spreadsheet_id: spreadsheet_id.to_owned(),
            access_token: access_token.to_owned(),
        })
    }

    fn values_url(&self, range: &str) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}",
            self.api_base,
            self.spreadsheet_id,
            utf8_percent_encode(range, RANGE_ENCODE_SET)
        )
    }

    /// Maps a non-2xx response to a typed error, reading Google's error
    /// envelope when one is present.
    async fn error_for_status(response: Response, range: &str) -> SheetsError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<GoogleErrorEnvelope>(&body) {
            Ok(envelope) if envelope.error.status.is_empty() => envelope.error.message,
            Ok(envelope) => format!("{}: {}", envelope.error.status, envelope.error.message),
            Err(_) => body,
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SheetsError::PermissionDenied {
                status: status.as_u16(),
                message,
            },
            StatusCode::NOT_FOUND => SheetsError::NotFound {
                range: range.to_owned(),
            },
            StatusCode::TOO_MANY_REQUESTS => SheetsError::RateLimited { message },
            _ => SheetsError::UnexpectedStatus {
                status: status.as_u16(),
                range: range.to_owned(),
                message,
            },
        }
    }
}

/// Renders a cell value the way the sheet displays it.
fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl SheetStore for SheetsClient {
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(range);
        tracing::debug!(range, "reading sheet range");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response, range).await);
        }

        let body = response.text().await?;
        let parsed: ValueRange =
            serde_json::from_str(&body).map_err(|source| SheetsError::Deserialize {
                context: format!("values of {range}"),
                source,
            })?;

        Ok(parsed
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn write_range(&self, range: &str, values: Vec<Vec<String>>) -> Result<(), SheetsError> {
        let url = self.values_url(range);
        tracing::debug!(range, rows = values.len(), "writing sheet range");

        let body = ValueRangeBody {
            range,
            major_dimension: "ROWS",
            values: &values,
        };

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response, range).await);
        }

        Ok(())
    }
}
