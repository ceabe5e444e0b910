//! Google Sheets and Drive access.

pub mod api_types;
pub mod auth;
pub mod cache;
pub mod drive;
pub mod sheets;
pub mod types;

use reqwest::StatusCode;
use tracing::debug;
use url::Url;

use crate::error::{DashError, DashResult};
use auth::Authenticator;

pub use drive::DriveClient;
pub use sheets::SheetsClient;
pub use types::SheetGrid;

/// Authenticated GET that maps failure statuses onto the error taxonomy.
async fn get_authorized(
  http: &reqwest::Client,
  auth: &Authenticator,
  url: Url,
  what: &str,
) -> DashResult<reqwest::Response> {
  let token = auth.bearer().await?;

  debug!(%url, what, "GET");
  let response = http
    .get(url)
    .bearer_auth(token)
    .send()
    .await
    .map_err(|e| DashError::remote(what, e))?;

  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }

  let body = response.text().await.unwrap_or_default();
  let message = api_types::error_message(&body);
  match status {
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DashError::Auth(format!(
      "{} was refused ({}): {}",
      what, status, message
    ))),
    _ => Err(DashError::remote(
      what,
      format!("server returned {}: {}", status, message),
    )),
  }
}

/// Parse a configured base URL, making sure relative joins keep its path.
pub fn base_url(raw: &str) -> color_eyre::Result<Url> {
  let mut url =
    Url::parse(raw).map_err(|e| color_eyre::eyre::eyre!("Invalid API URL '{}': {}", raw, e))?;
  if !url.path().ends_with('/') {
    let path = format!("{}/", url.path());
    url.set_path(&path);
  }
  Ok(url)
}
