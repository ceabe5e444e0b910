//! Day-granular file cache for remote artifacts.
//!
//! Each artifact (a sheet snapshot or an image) lives in its own file under
//! the cache directory. Freshness is decided by the file's last write date:
//! anything not written today is refetched on the next resolve.

mod clock;
mod layer;
mod storage;
mod traits;

#[cfg(test)]
pub use clock::FixedClock;
pub use layer::{FetchMode, FileCache};
pub use traits::{CacheCodec, CacheSource};

/// Default cache directory ($XDG_CACHE_HOME/cvdash).
pub fn default_cache_dir() -> std::path::PathBuf {
  dirs::cache_dir()
    .unwrap_or_else(|| std::path::PathBuf::from("."))
    .join("cvdash")
}
