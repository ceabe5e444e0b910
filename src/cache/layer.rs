//! Cache layer that decides between a cached entry and a remote fetch.

use chrono::{DateTime, Local};
use futures::Stream;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::clock::{Clock, LocalClock};
use super::storage::FileStorage;
use super::traits::{CacheCodec, CacheResult};
use crate::error::{DashError, DashResult};

/// Whether a resolve may be answered from today's cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
  /// Serve today's entry when there is one
  #[default]
  IfStale,
  /// Always go to the network
  Force,
}

/// Freshness-checked fetcher over a [`FileStorage`].
///
/// An entry is fresh when its last write happened on the clock's current
/// calendar date. Fresh entries are served as-is, anything else triggers the
/// fetcher and replaces the entry, so each key is fetched at most once per day.
///
/// Fetch errors propagate unchanged. With `stale_fallback` enabled, a failed
/// fetch falls back to whatever entry exists instead.
pub struct FileCache<C: Clock = LocalClock> {
  storage: FileStorage,
  clock: C,
  stale_fallback: bool,
}

impl FileCache<LocalClock> {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self::with_clock(root, LocalClock)
  }
}

impl<C: Clock> FileCache<C> {
  pub fn with_clock(root: impl Into<PathBuf>, clock: C) -> Self {
    Self {
      storage: FileStorage::new(root),
      clock,
      stale_fallback: false,
    }
  }

  /// Serve stale entries when the remote fetch fails.
  pub fn with_stale_fallback(mut self, enabled: bool) -> Self {
    self.stale_fallback = enabled;
    self
  }

  pub fn root(&self) -> &Path {
    self.storage.root()
  }

  #[cfg(test)]
  pub fn entry_path(&self, key: &str) -> PathBuf {
    self.storage.entry_path(key)
  }

  /// Whether the entry under `key` exists and was written today.
  #[cfg(test)]
  pub fn is_fresh(&self, key: &str) -> DashResult<bool> {
    Ok(
      self
        .storage
        .modified_at(key)?
        .is_some_and(|modified| self.is_today(modified)),
    )
  }

  fn is_today(&self, modified: DateTime<Local>) -> bool {
    modified.date_naive() == self.clock.today()
  }

  /// Look up a fresh entry, returning its write time.
  fn fresh_entry(&self, key: &str, mode: FetchMode) -> DashResult<Option<DateTime<Local>>> {
    if mode == FetchMode::Force {
      return Ok(None);
    }
    Ok(
      self
        .storage
        .modified_at(key)?
        .filter(|modified| self.is_today(*modified)),
    )
  }

  /// Resolve a payload that is fetched in one piece.
  pub async fn resolve<T, F, Fut>(
    &self,
    key: &str,
    mode: FetchMode,
    fetcher: F,
  ) -> DashResult<CacheResult<T>>
  where
    T: CacheCodec,
    F: FnOnce() -> Fut,
    Fut: Future<Output = DashResult<T>>,
  {
    if let Some(modified) = self.fresh_entry(key, mode)? {
      debug!(key, "cache entry is fresh");
      let data = self.storage.read(key)?;
      return Ok(CacheResult::from_cache(data, modified));
    }

    match fetcher().await {
      Ok(data) => {
        self.storage.write(key, &data)?;
        info!(key, "cache entry refreshed");
        Ok(CacheResult::from_network(data))
      }
      Err(err) => self.fall_back(key, err),
    }
  }

  /// Resolve a payload that arrives as a stream of chunks.
  ///
  /// The entry is only replaced after the stream has been fully drained.
  pub async fn resolve_stream<F, Fut, S>(
    &self,
    key: &str,
    mode: FetchMode,
    fetcher: F,
  ) -> DashResult<CacheResult<Vec<u8>>>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DashResult<S>>,
    S: Stream<Item = DashResult<Vec<u8>>>,
  {
    if let Some(modified) = self.fresh_entry(key, mode)? {
      debug!(key, "cache entry is fresh");
      let data = self.storage.read(key)?;
      return Ok(CacheResult::from_cache(data, modified));
    }

    let transfer = async {
      let chunks = fetcher().await?;
      self.storage.write_stream(key, chunks).await
    };

    match transfer.await {
      Ok(data) => {
        info!(key, bytes = data.len(), "cache entry refreshed");
        Ok(CacheResult::from_network(data))
      }
      Err(err) => self.fall_back(key, err),
    }
  }

  fn fall_back<T: CacheCodec>(&self, key: &str, err: DashError) -> DashResult<CacheResult<T>> {
    // Local write failures are never masked by old data.
    if !self.stale_fallback || matches!(err, DashError::CacheWrite { .. }) {
      return Err(err);
    }

    match self.storage.modified_at(key)? {
      Some(modified) => {
        warn!(key, error = %err, "fetch failed, serving stale cache entry");
        let data = self.storage.read(key)?;
        Ok(CacheResult::offline(data, modified))
      }
      None => Err(err),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::clock::FixedClock;
  use crate::cache::CacheSource;
  use chrono::Duration as ChronoDuration;
  use std::fs;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::time::{Duration, SystemTime};
  use tempfile::TempDir;

  fn backdate(path: &Path, days: u64) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file
      .set_modified(SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60))
      .unwrap();
  }

  fn failing_fetch() -> DashError {
    DashError::remote("f_cv", "connection refused")
  }

  /// Payload that decodes fine but cannot be written, like a full disk.
  #[derive(Debug)]
  struct Unwritable;

  impl CacheCodec for Unwritable {
    fn write_to(&self, _writer: &mut dyn std::io::Write) -> std::io::Result<()> {
      Err(std::io::Error::other("no space left on device"))
    }

    fn read_from(_bytes: Vec<u8>) -> Result<Self, String> {
      Ok(Unwritable)
    }
  }

  fn stale_entry(cache: &FileCache, key: &str) {
    fs::create_dir_all(cache.root()).unwrap();
    fs::write(cache.entry_path(key), b"old").unwrap();
    backdate(&cache.entry_path(key), 2);
  }

  #[tokio::test]
  async fn test_second_resolve_same_day_does_not_fetch() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path());
    let fetches = AtomicUsize::new(0);
    let counter = &fetches;

    for _ in 0..2 {
      let result = cache
        .resolve("f_cv.bin", FetchMode::IfStale, move || async move {
          counter.fetch_add(1, Ordering::SeqCst);
          Ok(b"rows".to_vec())
        })
        .await
        .unwrap();
      assert_eq!(result.data, b"rows");
    }

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_fresh_entry_is_reported_as_cache_hit() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path());

    let first = cache
      .resolve("a.bin", FetchMode::IfStale, || async { Ok(vec![1u8]) })
      .await
      .unwrap();
    let second = cache
      .resolve("a.bin", FetchMode::IfStale, || async { Ok(vec![2u8]) })
      .await
      .unwrap();

    assert_eq!(first.source, CacheSource::Network);
    assert!(first.modified_at.is_none());
    assert_eq!(second.source, CacheSource::CacheFresh);
    assert!(second.modified_at.is_some());
    assert_eq!(second.data, vec![1u8]);
  }

  #[tokio::test]
  async fn test_entry_written_yesterday_is_refetched() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path());

    cache
      .resolve("f_tools.bin", FetchMode::IfStale, || async { Ok(b"old".to_vec()) })
      .await
      .unwrap();
    backdate(&cache.entry_path("f_tools.bin"), 1);
    assert!(!cache.is_fresh("f_tools.bin").unwrap());

    let result = cache
      .resolve("f_tools.bin", FetchMode::IfStale, || async { Ok(b"new".to_vec()) })
      .await
      .unwrap();

    assert_eq!(result.source, CacheSource::Network);
    assert_eq!(result.data, b"new");
    assert!(cache.is_fresh("f_tools.bin").unwrap());
  }

  #[tokio::test]
  async fn test_entry_goes_stale_when_the_date_changes() {
    let temp = TempDir::new().unwrap();
    let now = Local::now();
    let today = FileCache::with_clock(temp.path(), FixedClock(now));
    today
      .resolve("photo.jpg", FetchMode::IfStale, || async { Ok(b"v1".to_vec()) })
      .await
      .unwrap();
    assert!(today.is_fresh("photo.jpg").unwrap());

    let tomorrow = FileCache::with_clock(temp.path(), FixedClock(now + ChronoDuration::days(1)));
    let fetches = AtomicUsize::new(0);
    let counter = &fetches;
    let result = tomorrow
      .resolve("photo.jpg", FetchMode::IfStale, move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(b"v2".to_vec())
      })
      .await
      .unwrap();

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(result.data, b"v2");
  }

  #[tokio::test]
  async fn test_force_mode_refetches_fresh_entry() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path());

    cache
      .resolve("a.bin", FetchMode::IfStale, || async { Ok(vec![1u8]) })
      .await
      .unwrap();
    let result = cache
      .resolve("a.bin", FetchMode::Force, || async { Ok(vec![2u8]) })
      .await
      .unwrap();

    assert_eq!(result.source, CacheSource::Network);
    let cached: Vec<u8> = fs::read(cache.entry_path("a.bin")).unwrap();
    assert_eq!(cached, vec![2u8]);
  }

  #[tokio::test]
  async fn test_fetch_failure_propagates_even_with_stale_entry() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path());
    cache
      .resolve("f_cv.bin", FetchMode::IfStale, || async { Ok(b"old".to_vec()) })
      .await
      .unwrap();
    backdate(&cache.entry_path("f_cv.bin"), 2);

    let err = cache
      .resolve::<Vec<u8>, _, _>("f_cv.bin", FetchMode::IfStale, || async { Err(failing_fetch()) })
      .await
      .unwrap_err();

    assert!(matches!(err, DashError::RemoteFetch { .. }));
  }

  #[tokio::test]
  async fn test_stale_fallback_serves_old_entry() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path()).with_stale_fallback(true);
    cache
      .resolve("f_cv.bin", FetchMode::IfStale, || async { Ok(b"old".to_vec()) })
      .await
      .unwrap();
    backdate(&cache.entry_path("f_cv.bin"), 2);

    let result = cache
      .resolve::<Vec<u8>, _, _>("f_cv.bin", FetchMode::IfStale, || async { Err(failing_fetch()) })
      .await
      .unwrap();

    assert_eq!(result.source, CacheSource::Offline);
    assert_eq!(result.data, b"old");
  }

  #[tokio::test]
  async fn test_write_failure_is_not_masked_by_stale_entry() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path()).with_stale_fallback(true);
    stale_entry(&cache, "f_cv.json");

    let err = cache
      .resolve("f_cv.json", FetchMode::IfStale, || async { Ok(Unwritable) })
      .await
      .unwrap_err();

    assert!(matches!(err, DashError::CacheWrite { .. }));
    assert_eq!(fs::read(cache.entry_path("f_cv.json")).unwrap(), b"old");
    assert!(!cache.is_fresh("f_cv.json").unwrap());
  }

  #[test]
  fn test_fallback_rethrows_write_errors() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path()).with_stale_fallback(true);
    stale_entry(&cache, "photo.jpg");
    let path = cache.entry_path("photo.jpg");

    let err = cache
      .fall_back::<Vec<u8>>(
        "photo.jpg",
        DashError::cache_write(path, std::io::Error::other("no space left on device")),
      )
      .unwrap_err();
    assert!(matches!(err, DashError::CacheWrite { .. }));

    let served = cache
      .fall_back::<Vec<u8>>("photo.jpg", DashError::remote("photo", "timed out"))
      .unwrap();
    assert_eq!(served.source, CacheSource::Offline);
  }

  #[tokio::test]
  async fn test_stale_fallback_without_entry_still_fails() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path()).with_stale_fallback(true);

    let result = cache
      .resolve::<Vec<u8>, _, _>("f_cv.bin", FetchMode::IfStale, || async { Err(failing_fetch()) })
      .await;

    assert!(result.is_err());
  }

  #[tokio::test]
  async fn test_interrupted_stream_leaves_no_entry() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path());

    let result = cache
      .resolve_stream("demo1.jpg", FetchMode::IfStale, || async {
        Ok(futures::stream::iter(vec![
          Ok(b"first chunk".to_vec()),
          Err(DashError::remote("demo1", "connection reset")),
        ]))
      })
      .await;

    assert!(result.is_err());
    assert!(!cache.entry_path("demo1.jpg").exists());
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
  }

  #[tokio::test]
  async fn test_interrupted_stream_keeps_previous_entry() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path());
    cache
      .resolve_stream("demo2.jpg", FetchMode::IfStale, || async {
        Ok(futures::stream::iter(vec![Ok(b"complete".to_vec())]))
      })
      .await
      .unwrap();
    backdate(&cache.entry_path("demo2.jpg"), 1);

    let result = cache
      .resolve_stream("demo2.jpg", FetchMode::IfStale, || async {
        Ok(futures::stream::iter(vec![
          Ok(b"trunc".to_vec()),
          Err(DashError::remote("demo2", "timed out")),
        ]))
      })
      .await;

    assert!(result.is_err());
    assert_eq!(fs::read(cache.entry_path("demo2.jpg")).unwrap(), b"complete");
    // The surviving entry is still yesterday's, so it is not mistaken for fresh.
    assert!(!cache.is_fresh("demo2.jpg").unwrap());
  }

  #[tokio::test]
  async fn test_stream_resolve_is_cached_for_the_day() {
    let temp = TempDir::new().unwrap();
    let cache = FileCache::new(temp.path());
    let fetches = AtomicUsize::new(0);
    let counter = &fetches;

    for _ in 0..3 {
      let result = cache
        .resolve_stream("photo.jpg", FetchMode::IfStale, move || async move {
          counter.fetch_add(1, Ordering::SeqCst);
          Ok(futures::stream::iter(vec![Ok(b"ph".to_vec()), Ok(b"oto".to_vec())]))
        })
        .await
        .unwrap();
      assert_eq!(result.data, b"photo");
    }

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
  }
}
