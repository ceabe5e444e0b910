//! Error taxonomy for a dashboard render pass.
//!
//! Every variant except [`DashError::ZeroWeight`] aborts the pass that produced
//! it. Zero-weight categories are excluded from the ranking and reported back
//! through [`crate::metrics::Aggregates::warnings`].

use std::path::PathBuf;
use thiserror::Error;

pub type DashResult<T> = std::result::Result<T, DashError>;

#[derive(Debug, Error)]
pub enum DashError {
  /// The remote side rejected our credentials, or we could not build any.
  #[error("authentication failed: {0}")]
  Auth(String),

  /// Network error, timeout, bad status or missing remote identifier.
  #[error("failed to fetch {what}: {message}")]
  RemoteFetch { what: String, message: String },

  #[error("failed to write cache entry {}: {source}", path.display())]
  CacheWrite {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to read cache entry {}: {message}", path.display())]
  CacheRead { path: PathBuf, message: String },

  /// A source row could not be coerced into a typed record.
  #[error("{table}, row {row}, column '{column}': {message}")]
  DataShape {
    table: String,
    row: usize,
    column: String,
    message: String,
  },

  #[error("image {key} could not be decoded: {message}")]
  InvalidImage { key: String, message: String },

  #[error("category '{category}' has zero total weight and was left out of the ranking")]
  ZeroWeight { category: String },
}

impl DashError {
  pub fn remote(what: impl Into<String>, message: impl ToString) -> Self {
    Self::RemoteFetch {
      what: what.into(),
      message: message.to_string(),
    }
  }

  pub fn cache_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::CacheWrite {
      path: path.into(),
      source,
    }
  }

  pub fn data_shape(
    table: &str,
    row: usize,
    column: &str,
    message: impl Into<String>,
  ) -> Self {
    Self::DataShape {
      table: table.to_string(),
      row,
      column: column.to_string(),
      message: message.into(),
    }
  }
}
