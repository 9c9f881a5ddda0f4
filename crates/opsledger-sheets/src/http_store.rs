//! Google Sheets backend over the v4 values API.
//!
//! Every sheet is addressed by its tab name as an A1 range. Reads use
//! `values.get`, whole-sheet writes clear the tab and then `values.update`
//! it, and appends use `values.append` with `INSERT_ROWS`. Cells are sent
//! and received as raw strings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ureq::Agent;

use crate::{SheetStore, StoreError, Table};

/// Default API endpoint.
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com/v4";

const TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
struct ValueRangeBody<'a> {
    range: &'a str,
    #[serde(rename = "majorDimension")]
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

/// A spreadsheet reached through the Sheets values API.
#[derive(Debug)]
pub struct SheetsApiStore {
    agent: Agent,
    api_base: String,
    spreadsheet_id: String,
    token: Option<String>,
}

impl SheetsApiStore {
    /// Connect to `spreadsheet_id` under `api_base`.
    ///
    /// `token` is sent as an OAuth bearer token when present.
    pub fn new(
        api_base: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        token: Option<String>,
    ) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            token,
        }
    }

    /// URL of a values endpoint for `sheet`, with an optional `:verb`
    /// suffix and query string.
    fn values_url(&self, sheet: &str, verb: &str, query: &str) -> String {
        let range = urlencoding::encode(sheet);
        let mut url = format!(
            "{}/spreadsheets/{}/values/{range}{verb}",
            self.api_base, self.spreadsheet_id
        );
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    fn authorize<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    fn transport(sheet: &str, err: &ureq::Error) -> StoreError {
        StoreError::Transport {
            sheet: sheet.to_string(),
            message: err.to_string(),
        }
    }

    /// Turn a non-success response into an error.
    fn check(
        sheet: &str,
        mut response: ureq::http::Response<ureq::Body>,
    ) -> Result<ureq::http::Response<ureq::Body>, StoreError> {
        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(response);
        }
        let body = response.body_mut().read_to_string().unwrap_or_default();
        let message = error_message(&body);
        warn!(sheet, status, %message, "spreadsheet API error");
        // The API reports an unknown tab as an unparsable range.
        if status == 400 && message.contains("Unable to parse range") {
            return Err(StoreError::SheetNotFound(sheet.to_string()));
        }
        Err(StoreError::Http {
            sheet: sheet.to_string(),
            status,
            message,
        })
    }

    /// Create a new tab named `sheet`.
    fn add_sheet(&self, sheet: &str) -> Result<(), StoreError> {
        let url = format!(
            "{}/spreadsheets/{}:batchUpdate",
            self.api_base, self.spreadsheet_id
        );
        let body = serde_json::json!({
            "requests": [{ "addSheet": { "properties": { "title": sheet } } }]
        });
        let response = self
            .authorize(self.agent.post(&url))
            .send_json(&body)
            .map_err(|e| Self::transport(sheet, &e))?;
        Self::check(sheet, response)?;
        info!(sheet, "created sheet tab");
        Ok(())
    }

    fn update(&self, sheet: &str, values: &[Vec<String>]) -> Result<(), StoreError> {
        let body = ValueRangeBody {
            range: sheet,
            major_dimension: "ROWS",
            values,
        };
        let url = self.values_url(sheet, "", "valueInputOption=RAW");
        let response = self
            .authorize(self.agent.put(&url))
            .send_json(&body)
            .map_err(|e| Self::transport(sheet, &e))?;
        Self::check(sheet, response)?;
        Ok(())
    }
}

/// Pull `error.message` out of an API error body, or fall back to the body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Render an API cell as text. Numbers and booleans come back unformatted.
fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl SheetStore for SheetsApiStore {
    fn name(&self) -> &str {
        "sheets"
    }

    fn read(&self, sheet: &str) -> Result<Table, StoreError> {
        let url = self.values_url(sheet, "", "");
        let response = self
            .authorize(self.agent.get(&url))
            .call()
            .map_err(|e| Self::transport(sheet, &e))?;
        let mut response = Self::check(sheet, response)?;
        let range: ValueRange = response
            .body_mut()
            .read_json()
            .map_err(|e| Self::transport(sheet, &e))?;

        let values = range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect();
        let table = Table::from_values(values);
        debug!(sheet, rows = table.len(), "read sheet from API");
        Ok(table)
    }

    fn write(&self, sheet: &str, table: &Table) -> Result<(), StoreError> {
        let url = self.values_url(sheet, ":clear", "");
        let response = self
            .authorize(self.agent.post(&url))
            .send_empty()
            .map_err(|e| Self::transport(sheet, &e))?;
        match Self::check(sheet, response) {
            Ok(_) => {}
            Err(StoreError::SheetNotFound(_)) => self.add_sheet(sheet)?,
            Err(e) => return Err(e),
        }

        self.update(sheet, &table.to_values())?;
        debug!(sheet, rows = table.len(), "wrote sheet to API");
        Ok(())
    }

    fn append(
        &self,
        sheet: &str,
        headers: &[&str],
        rows: &[Vec<String>],
    ) -> Result<(), StoreError> {
        let header_row: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
        match self.read(sheet) {
            Ok(table) if table.headers.iter().any(|h| !h.trim().is_empty()) => {}
            Ok(_) => self.update(sheet, &[header_row])?,
            Err(StoreError::SheetNotFound(_)) => {
                self.add_sheet(sheet)?;
                self.update(sheet, &[header_row])?;
            }
            Err(e) => return Err(e),
        }

        let body = ValueRangeBody {
            range: sheet,
            major_dimension: "ROWS",
            values: rows,
        };
        let url = self.values_url(
            sheet,
            ":append",
            "valueInputOption=RAW&insertDataOption=INSERT_ROWS",
        );
        let response = self
            .authorize(self.agent.post(&url))
            .send_json(&body)
            .map_err(|e| Self::transport(sheet, &e))?;
        Self::check(sheet, response)?;
        debug!(sheet, rows = rows.len(), "appended rows via API");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SheetsApiStore {
        SheetsApiStore::new("https://example.test/v4/", "abc123", None)
    }

    #[test]
    fn test_values_url() {
        let store = store();
        assert_eq!(
            store.values_url("Items", "", ""),
            "https://example.test/v4/spreadsheets/abc123/values/Items"
        );
        assert_eq!(
            store.values_url("Petty Cash", ":append", "valueInputOption=RAW"),
            "https://example.test/v4/spreadsheets/abc123/values/Petty%20Cash:append?valueInputOption=RAW"
        );
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error":{"code":400,"message":"Unable to parse range: Nope"}}"#;
        assert_eq!(error_message(body), "Unable to parse range: Nope");
        assert_eq!(error_message(" gateway timeout \n"), "gateway timeout");
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(serde_json::json!("6001")), "6001");
        assert_eq!(cell_text(serde_json::json!(12.5)), "12.5");
        assert_eq!(cell_text(serde_json::json!(true)), "true");
        assert_eq!(cell_text(serde_json::Value::Null), "");
    }

    #[test]
    fn test_value_range_without_values() {
        let range: ValueRange = serde_json::from_str(r#"{"range":"Items!A1:Z1000"}"#).unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn test_unreachable_api_is_transport_error() {
        let store = SheetsApiStore::new("http://127.0.0.1:9", "abc123", None);
        assert!(matches!(
            store.read("Items"),
            Err(StoreError::Transport { .. })
        ));
    }
}
