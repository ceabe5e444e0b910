use std::sync::Arc;
use tracing::info;
use url::Url;

use super::api_types::ApiBatchGetResponse;
use super::auth::Authenticator;
use super::types::SheetGrid;
use crate::error::{DashError, DashResult};

pub const DEFAULT_SHEETS_URL: &str = "https://sheets.googleapis.com/";

/// Google Sheets API client (read-only)
#[derive(Clone)]
pub struct SheetsClient {
  http: reqwest::Client,
  auth: Arc<Authenticator>,
  base_url: Url,
}

impl SheetsClient {
  pub fn new(http: reqwest::Client, auth: Arc<Authenticator>, base_url: Url) -> Self {
    Self {
      http,
      auth,
      base_url,
    }
  }

  /// Read a named range of a spreadsheet.
  ///
  /// The first row of the range is the header; an empty range is an error
  /// because nothing downstream can work without column names.
  pub async fn get_range(&self, spreadsheet_id: &str, range: &str) -> DashResult<SheetGrid> {
    let what = format!("sheet range '{}'", range);

    let mut url = self
      .base_url
      .join(&format!(
        "v4/spreadsheets/{}/values:batchGet",
        spreadsheet_id
      ))
      .map_err(|e| DashError::remote(&what, e))?;
    url.query_pairs_mut().append_pair("ranges", range);

    let response = super::get_authorized(&self.http, &self.auth, url, &what).await?;
    let body: ApiBatchGetResponse = response
      .json()
      .await
      .map_err(|e| DashError::remote(&what, format!("unexpected response: {}", e)))?;

    let values = body
      .value_ranges
      .into_iter()
      .next()
      .map(|r| r.values)
      .unwrap_or_default();

    let grid = SheetGrid::from_values(range, values)
      .ok_or_else(|| DashError::remote(&what, "range is empty"))?;

    info!(range, rows = grid.rows.len(), "fetched sheet range");
    Ok(grid)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::google::base_url;
  use httpmock::prelude::*;
  use serde_json::json;

  fn client(server: &MockServer) -> SheetsClient {
    let http = reqwest::Client::new();
    let auth = Arc::new(Authenticator::with_token(http.clone(), "ya29.test"));
    SheetsClient::new(http, auth, base_url(&server.base_url()).unwrap())
  }

  #[tokio::test]
  async fn test_get_range_splits_header_and_rows() {
    let server = MockServer::start_async().await;
    let mock = server
      .mock_async(|when, then| {
        when
          .method(GET)
          .path("/v4/spreadsheets/sheet-123/values:batchGet")
          .query_param("ranges", "f_tools")
          .header("authorization", "Bearer ya29.test");
        then.status(200).json_body(json!({
          "spreadsheetId": "sheet-123",
          "valueRanges": [{
            "range": "f_tools!A1:E3",
            "majorDimension": "ROWS",
            "values": [
              ["группа1", "инструмент", "Экспертиза", "вес", "комментарий"],
              ["BI", "Power BI", "90", "2,5", "DAX"],
              ["SQL", "PostgreSQL", "70", "1"]
            ]
          }]
        }));
      })
      .await;

    let grid = client(&server)
      .get_range("sheet-123", "f_tools")
      .await
      .unwrap();

    mock.assert_async().await;
    assert_eq!(grid.range, "f_tools");
    assert_eq!(grid.header.len(), 5);
    assert_eq!(grid.rows.len(), 2);
    assert_eq!(grid.cell(1, 4), "");
  }

  #[tokio::test]
  async fn test_missing_spreadsheet_is_remote_fetch_error() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/v4/spreadsheets/nope/values:batchGet");
        then.status(404).json_body(json!({
          "error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}
        }));
      })
      .await;

    let err = client(&server).get_range("nope", "f_cv").await.unwrap_err();
    match err {
      DashError::RemoteFetch { what, message } => {
        assert_eq!(what, "sheet range 'f_cv'");
        assert!(message.contains("NOT_FOUND"));
      }
      other => panic!("expected remote fetch error, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_forbidden_is_auth_error() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/v4/spreadsheets/private/values:batchGet");
        then.status(403).json_body(json!({
          "error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}
        }));
      })
      .await;

    let err = client(&server)
      .get_range("private", "f_cv")
      .await
      .unwrap_err();
    assert!(matches!(err, DashError::Auth(_)));
  }

  #[tokio::test]
  async fn test_empty_range_is_an_error() {
    let server = MockServer::start_async().await;
    server
      .mock_async(|when, then| {
        when.method(GET).path("/v4/spreadsheets/sheet-123/values:batchGet");
        then
          .status(200)
          .json_body(json!({"spreadsheetId": "sheet-123", "valueRanges": [{"range": "f_cv!A1:Z1000"}]}));
      })
      .await;

    let err = client(&server)
      .get_range("sheet-123", "f_cv")
      .await
      .unwrap_err();
    assert!(err.to_string().contains("range is empty"));
  }
}
