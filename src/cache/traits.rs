//! Core traits and types for the caching system.

use chrono::{DateTime, Local};
use std::io::Write;

/// Trait for payloads that can be stored as a cache entry.
///
/// The on-disk format is owned by the payload type: tables serialize to a
/// JSON snapshot, images are written as raw bytes.
pub trait CacheCodec: Sized + Send {
  /// Write the payload to the (temporary) entry file.
  fn write_to(&self, writer: &mut dyn Write) -> std::io::Result<()>;

  /// Rebuild the payload from the bytes of an entry file.
  fn read_from(bytes: Vec<u8>) -> Result<Self, String>;
}

impl CacheCodec for Vec<u8> {
  fn write_to(&self, writer: &mut dyn Write) -> std::io::Result<()> {
    writer.write_all(self)
  }

  fn read_from(bytes: Vec<u8>) -> Result<Self, String> {
    Ok(bytes)
  }
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// Last write time of the entry that was served (None for network data)
  pub modified_at: Option<DateTime<Local>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      modified_at: None,
    }
  }

  /// Create a new cache result from an entry written today.
  pub fn from_cache(data: T, modified_at: DateTime<Local>) -> Self {
    Self {
      data,
      source: CacheSource::CacheFresh,
      modified_at: Some(modified_at),
    }
  }

  /// Create a new cache result for a stale entry served after a failed fetch.
  pub fn offline(data: T, modified_at: DateTime<Local>) -> Self {
    Self {
      data,
      source: CacheSource::Offline,
      modified_at: Some(modified_at),
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fetched from the remote service during this pass
  Network,
  /// Entry already written today
  CacheFresh,
  /// Fetch failed, stale entry served (only with stale fallback enabled)
  Offline,
}

impl CacheSource {
  pub fn label(self) -> &'static str {
    match self {
      CacheSource::Network => "network",
      CacheSource::CacheFresh => "cache",
      CacheSource::Offline => "offline",
    }
  }
}
