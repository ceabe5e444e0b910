use futures::stream::BoxStream;
use futures::StreamExt;
use std::sync::Arc;
use tracing::info;
use url::Url;

use super::auth::Authenticator;
use crate::error::{DashError, DashResult};

pub const DEFAULT_DRIVE_URL: &str = "https://www.googleapis.com/";

/// Stream of body chunks as they arrive from the network.
pub type ChunkStream = BoxStream<'static, DashResult<Vec<u8>>>;

/// Google Drive API client, limited to file downloads
#[derive(Clone)]
pub struct DriveClient {
  http: reqwest::Client,
  auth: Arc<Authenticator>,
  base_url: Url,
}

impl DriveClient {
  pub fn new(http: reqwest::Client, auth: Arc<Authenticator>, base_url: Url) -> Self {
    Self {
      http,
      auth,
      base_url,
    }
  }

  /// Start downloading a file's content.
  ///
  /// Resolves once the response headers are in; the body is delivered
  /// chunk by chunk through the returned stream and has to be drained by
  /// the caller. A transfer that breaks off yields an error item.
  pub async fn download(&self, file_id: &str) -> DashResult<ChunkStream> {
    let what = format!("drive file '{}'", file_id);

    let mut url = self
      .base_url
      .join(&format!("drive/v3/files/{}", file_id))
      .map_err(|e| DashError::remote(&what, e))?;
    url.query_pairs_mut().append_pair("alt", "media");

    let response = super::get_authorized(&self.http, &self.auth, url, &what).await?;
    info!(file_id, size = ?response.content_length(), "downloading drive file");

    let chunks = response.bytes_stream().map(move |chunk| {
      chunk
        .map(|bytes| bytes.to_vec())
        .map_err(|e| DashError::remote(&what, format!("transfer interrupted: {}", e)))
    });

    Ok(chunks.boxed())
  }
}
