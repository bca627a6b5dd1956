//! Google Sheets REST client.
//!
//! Talks to the Sheets v4 values API for row data and the Drive v3 files API
//! for spreadsheet-by-name lookup. Name lookups are cached with `moka`
//! (5-minute TTL) because they cost two round trips and spreadsheet ids never
//! change underneath a running process.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::{CellRef, Row, SheetsError, TableHandle, TableStore};

const SHEETS_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Bounded per-request timeout; on expiry the caller degrades to an empty
/// result rather than hanging.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Row>,
}

// =============================================================================
// SheetsClient
// =============================================================================

/// Client for the Google Sheets and Drive REST APIs.
///
/// Cheap to clone; all clones share one HTTP connection pool and one lookup
/// cache.
#[derive(Clone)]
pub struct SheetsClient {
    inner: Arc<SheetsClientInner>,
}

struct SheetsClientInner {
    http: reqwest::Client,
    access_token: SecretString,
    /// spreadsheet name -> first-worksheet handle
    lookup_cache: Cache<String, TableHandle>,
}

impl SheetsClient {
    /// Create a new client from an OAuth bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`SheetsError::Http`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(access_token: SecretString) -> Result<Self, SheetsError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let lookup_cache = Cache::builder()
            .max_capacity(64)
            .time_to_live(Duration::from_secs(300))
            .build();

        Ok(Self {
            inner: Arc::new(SheetsClientInner {
                http,
                access_token,
                lookup_cache,
            }),
        })
    }

    /// Issue a GET and decode the JSON body.
    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, SheetsError> {
        let response = self
            .inner
            .http
            .get(url)
            .bearer_auth(self.inner.access_token.expose_secret())
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Issue a POST with a JSON body and decode the JSON response.
    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<T, SheetsError> {
        let response = self
            .inner
            .http
            .post(url)
            .bearer_auth(self.inner.access_token.expose_secret())
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SheetsError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(SheetsError::RateLimited(retry_after));
        }

        // Fetch the body as text first for better error diagnostics.
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Sheets API returned non-success status"
            );
            return Err(SheetsError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse Sheets API response"
            );
            SheetsError::Parse(e)
        })
    }

    /// URL of the values resource for one worksheet.
    ///
    /// The worksheet title is percent-encoded as one path segment; the API
    /// action suffix (`:append`) must stay a literal colon, so it is spliced
    /// onto the already-encoded path.
    fn values_url(table: &TableHandle, suffix: Option<&str>) -> Result<Url, SheetsError> {
        let mut url = Self::base_url()?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Self::bad_url("spreadsheet url is not a base"))?;
            segments
                .push(&table.spreadsheet_id)
                .push("values")
                .push(&table.title);
        }
        if let Some(suffix) = suffix {
            let path = format!("{}{suffix}", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    fn spreadsheet_url(spreadsheet_id: &str, action: Option<&str>) -> Result<Url, SheetsError> {
        let mut url = Self::base_url()?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Self::bad_url("spreadsheet url is not a base"))?;
            segments.push(spreadsheet_id);
        }
        if let Some(action) = action {
            let path = format!("{}{action}", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    fn base_url() -> Result<Url, SheetsError> {
        Url::parse(SHEETS_BASE).map_err(|e| Self::bad_url(&e.to_string()))
    }

    fn bad_url(message: &str) -> SheetsError {
        SheetsError::Api {
            status: 0,
            message: format!("invalid request url: {message}"),
        }
    }

    /// Resolve a spreadsheet's id by name through the Drive files API.
    ///
    /// Falls back to the first spreadsheet the credential can see when the
    /// named one is absent; a NotFound is only returned when nothing is
    /// shared with the service account at all.
    async fn find_spreadsheet_id(&self, name: &str) -> Result<String, SheetsError> {
        let escaped = name.replace('\'', "\\'");
        let by_name = self
            .list_spreadsheets(Some(&format!("name = '{escaped}'")))
            .await?;
        if let Some(file) = by_name.into_iter().find(|f| f.name == name) {
            return Ok(file.id);
        }

        tracing::warn!(name = %name, "named spreadsheet not found, falling back to first visible");
        self.list_spreadsheets(None)
            .await?
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| SheetsError::NotFound(format!("spreadsheet not found: {name}")))
    }

    async fn list_spreadsheets(&self, extra: Option<&str>) -> Result<Vec<DriveFile>, SheetsError> {
        let mut query = format!("mimeType = '{SPREADSHEET_MIME}' and trashed = false");
        if let Some(extra) = extra {
            query = format!("{extra} and {query}");
        }

        let mut url = Url::parse(DRIVE_FILES_URL).map_err(|e| Self::bad_url(&e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("q", &query)
            .append_pair("fields", "files(id,name)")
            .append_pair("pageSize", "10");

        let list: DriveFileList = self.get_json(url).await?;
        Ok(list.files)
    }

    /// Fetch worksheet metadata for a spreadsheet.
    async fn sheet_properties(&self, spreadsheet_id: &str) -> Result<Vec<SheetProperties>, SheetsError> {
        let mut url = Self::spreadsheet_url(spreadsheet_id, None)?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties");
        let meta: SpreadsheetMeta = self.get_json(url).await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties).collect())
    }
}

impl TableStore for SheetsClient {
    #[instrument(skip(self), fields(name = %name))]
    async fn find_table_by_name(&self, name: &str) -> Result<TableHandle, SheetsError> {
        if let Some(handle) = self.inner.lookup_cache.get(name).await {
            debug!("cache hit for table lookup");
            return Ok(handle);
        }

        let spreadsheet_id = self.find_spreadsheet_id(name).await?;
        let first = self
            .sheet_properties(&spreadsheet_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SheetsError::NotFound(format!("spreadsheet has no worksheets: {name}")))?;

        let handle = TableHandle {
            spreadsheet_id,
            sheet_id: first.sheet_id,
            title: first.title,
        };

        self.inner
            .lookup_cache
            .insert(name.to_owned(), handle.clone())
            .await;

        Ok(handle)
    }

    #[instrument(skip(self), fields(table = %table.title))]
    async fn read_all_rows(&self, table: &TableHandle) -> Result<Vec<Row>, SheetsError> {
        let mut url = Self::values_url(table, None)?;
        url.query_pairs_mut().append_pair("majorDimension", "ROWS");

        let range: ValueRange = self.get_json(url).await?;
        debug!(rows = range.values.len(), "read table rows");
        Ok(range.values)
    }

    #[instrument(skip(self, row), fields(table = %table.title))]
    async fn append_row(&self, table: &TableHandle, row: &[String]) -> Result<(), SheetsError> {
        let mut url = Self::values_url(table, Some(":append"))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let body = serde_json::json!({ "values": [row] });
        let _: serde_json::Value = self.post_json(url, &body).await?;
        Ok(())
    }

    async fn find_cell_in_column(
        &self,
        table: &TableHandle,
        column: usize,
        value: &str,
    ) -> Result<Option<CellRef>, SheetsError> {
        // The values API has no server-side find; scan one read's worth.
        let rows = self.read_all_rows(table).await?;
        Ok(find_in_column(&rows, column, value))
    }

    #[instrument(skip(self), fields(table = %table.title, row_index))]
    async fn delete_row(&self, table: &TableHandle, row_index: usize) -> Result<(), SheetsError> {
        if row_index == 0 {
            return Err(SheetsError::NotFound("row index 0 is out of range".to_owned()));
        }

        let url = Self::spreadsheet_url(&table.spreadsheet_id, Some(":batchUpdate"))?;
        let body = serde_json::json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": table.sheet_id,
                        "dimension": "ROWS",
                        "startIndex": row_index - 1,
                        "endIndex": row_index,
                    }
                }
            }]
        });
        let _: serde_json::Value = self.post_json(url, &body).await?;
        Ok(())
    }

    #[instrument(skip(self, header), fields(spreadsheet = %spreadsheet, title = %title))]
    async fn ensure_table(
        &self,
        spreadsheet: &str,
        title: &str,
        header: &[&str],
    ) -> Result<TableHandle, SheetsError> {
        let spreadsheet_id = self.find_spreadsheet_id(spreadsheet).await?;

        if let Some(props) = self
            .sheet_properties(&spreadsheet_id)
            .await?
            .into_iter()
            .find(|p| p.title == title)
        {
            return Ok(TableHandle {
                spreadsheet_id,
                sheet_id: props.sheet_id,
                title: props.title,
            });
        }

        debug!("worksheet missing, creating it");
        let url = Self::spreadsheet_url(&spreadsheet_id, Some(":batchUpdate"))?;
        let body = serde_json::json!({
            "requests": [{ "addSheet": { "properties": { "title": title } } }]
        });
        let reply: serde_json::Value = self.post_json(url, &body).await?;

        let sheet_id = reply
            .pointer("/replies/0/addSheet/properties/sheetId")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| SheetsError::Api {
                status: 0,
                message: "addSheet reply missing sheetId".to_owned(),
            })?;

        let handle = TableHandle {
            spreadsheet_id,
            sheet_id,
            title: title.to_owned(),
        };

        let header_row: Vec<String> = header.iter().map(|&h| h.to_owned()).collect();
        self.append_row(&handle, &header_row).await?;

        Ok(handle)
    }
}

/// Scan rows for the first cell in a 1-based column equal to `value`.
pub(super) fn find_in_column(rows: &[Row], column: usize, value: &str) -> Option<CellRef> {
    if column == 0 {
        return None;
    }
    rows.iter().enumerate().find_map(|(idx, row)| {
        row.get(column - 1)
            .filter(|cell| cell.as_str() == value)
            .map(|_| CellRef {
                row: idx + 1,
                col: column,
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Row> {
        vec![
            vec!["user_id".into(), "password".into()],
            vec!["alice".into(), "h1".into()],
            vec!["bob".into(), "h2".into()],
        ]
    }

    #[test]
    fn find_in_column_is_one_based_and_includes_header() {
        let rows = rows();
        let hit = find_in_column(&rows, 1, "bob").unwrap();
        assert_eq!(hit, CellRef { row: 3, col: 1 });

        // Header cells are part of the scan, like the backend's own find.
        let hit = find_in_column(&rows, 1, "user_id").unwrap();
        assert_eq!(hit.row, 1);

        assert!(find_in_column(&rows, 1, "carol").is_none());
        assert!(find_in_column(&rows, 0, "alice").is_none());
        assert!(find_in_column(&rows, 9, "alice").is_none());
    }

    #[test]
    fn values_url_escapes_worksheet_title() {
        let table = TableHandle {
            spreadsheet_id: "abc123".to_owned(),
            sheet_id: 0,
            title: "상품목록".to_owned(),
        };
        let url = SheetsClient::values_url(&table, None).unwrap();
        assert!(url.as_str().starts_with(SHEETS_BASE));
        assert!(url.path().contains("abc123/values/"));
        // Non-ASCII title must be percent-encoded into a single path segment.
        assert!(!url.path().contains('상'));

        // The action suffix keeps its literal colon.
        let url = SheetsClient::values_url(&table, Some(":append")).unwrap();
        assert!(url.path().ends_with(":append"));
    }
}
