//! File-per-entry cache storage with atomic replacement.

use chrono::{DateTime, Local};
use futures::{Stream, StreamExt};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::trace;

use super::traits::CacheCodec;
use crate::error::{DashError, DashResult};

/// A directory of cache entries, one file per key.
///
/// Entries are never written in place. Payloads go to a temp file in the same
/// directory which is renamed over the entry once complete, so a reader
/// either sees the previous entry or the new one, never a partial write.
#[derive(Debug, Clone)]
pub struct FileStorage {
  root: PathBuf,
}

impl FileStorage {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Path of the entry stored under `key`.
  pub fn entry_path(&self, key: &str) -> PathBuf {
    self.root.join(key)
  }

  /// Last write time of the entry, or None if there is no entry.
  pub fn modified_at(&self, key: &str) -> DashResult<Option<DateTime<Local>>> {
    let path = self.entry_path(key);
    let metadata = match fs::metadata(&path) {
      Ok(m) => m,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => {
        return Err(DashError::CacheRead {
          path,
          message: e.to_string(),
        })
      }
    };

    if !metadata.is_file() {
      return Err(DashError::CacheRead {
        path,
        message: "not a regular file".to_string(),
      });
    }

    let modified = metadata.modified().map_err(|e| DashError::CacheRead {
      path: path.clone(),
      message: e.to_string(),
    })?;

    Ok(Some(DateTime::<Local>::from(modified)))
  }

  /// Read and decode the entry stored under `key`.
  pub fn read<T: CacheCodec>(&self, key: &str) -> DashResult<T> {
    let path = self.entry_path(key);
    let bytes = fs::read(&path).map_err(|e| DashError::CacheRead {
      path: path.clone(),
      message: e.to_string(),
    })?;
    T::read_from(bytes).map_err(|message| DashError::CacheRead { path, message })
  }

  /// Replace the entry under `key` with `payload`.
  pub fn write<T: CacheCodec>(&self, key: &str, payload: &T) -> DashResult<()> {
    let path = self.entry_path(key);
    let mut tmp = self.temp_file(&path)?;
    payload
      .write_to(tmp.as_file_mut())
      .map_err(|e| DashError::cache_write(&path, e))?;
    self.commit(tmp, &path)
  }

  /// Drain a chunk stream into the entry under `key`.
  ///
  /// The first failing chunk aborts the transfer: the temp file is discarded
  /// and the previous entry, if any, is left as it was.
  pub async fn write_stream<S>(&self, key: &str, stream: S) -> DashResult<Vec<u8>>
  where
    S: Stream<Item = DashResult<Vec<u8>>>,
  {
    let path = self.entry_path(key);
    let mut tmp = self.temp_file(&path)?;
    let mut payload = Vec::new();
    let mut chunks = 0usize;

    let mut stream = std::pin::pin!(stream);
    while let Some(chunk) = stream.next().await {
      let chunk = chunk?;
      tmp
        .write_all(&chunk)
        .map_err(|e| DashError::cache_write(&path, e))?;
      payload.extend_from_slice(&chunk);
      chunks += 1;
      trace!(key, chunks, bytes = payload.len(), "received chunk");
    }

    self.commit(tmp, &path)?;
    Ok(payload)
  }

  fn temp_file(&self, path: &Path) -> DashResult<NamedTempFile> {
    fs::create_dir_all(&self.root).map_err(|e| DashError::cache_write(path, e))?;
    NamedTempFile::new_in(&self.root).map_err(|e| DashError::cache_write(path, e))
  }

  fn commit(&self, tmp: NamedTempFile, path: &Path) -> DashResult<()> {
    tmp
      .as_file()
      .sync_all()
      .map_err(|e| DashError::cache_write(path, e))?;
    tmp
      .persist(path)
      .map_err(|e| DashError::cache_write(path, e.error))?;
    Ok(())
  }
}
