//! CDP wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(crate) struct CdpRequest<'a> {
    pub id: u64,
    pub method: &'a str,
    pub params: Value,
}

/// Either a command response (`id` set) or an event (`method` set).
#[derive(Debug, Deserialize)]
pub(crate) struct CdpResponse {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<CdpErrorResponse>,
    pub method: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CdpErrorResponse {
    pub code: i64,
    pub message: String,
}

/// Entry from the `/json/list` and `/json/new` discovery endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageInfo {
    #[serde(rename = "type")]
    pub page_type: String,
    #[serde(default)]
    pub url: String,
    pub web_socket_debugger_url: Option<String>,
}

/// A browser cookie as returned by `Network.getAllCookies`.
///
/// Only the fields needed to re-install the cookie are kept; the rest of the
/// CDP payload is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Seconds since the epoch; `None` or non-positive for session cookies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

fn default_path() -> String {
    "/".to_owned()
}

impl Cookie {
    /// Copy suitable for `Network.setCookies`: session cookies drop the
    /// sentinel expiry so Chrome does not treat them as already expired.
    #[must_use]
    pub fn to_param(&self) -> Cookie {
        let mut param = self.clone();
        if param.expires.is_some_and(|e| e <= 0.0) {
            param.expires = None;
        }
        param
    }
}
