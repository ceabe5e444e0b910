//! Background loading with pollable state.
//!
//! A `Query<T>` runs one future at a time on the tokio runtime and hands the
//! result back through a channel, so the draw loop never blocks on network I/O.
//!
//! ```ignore
//! let mut query = Query::new(move || {
//!     let loader = loader.clone();
//!     async move { loader.load(FetchMode::IfStale).await.map_err(|e| e.to_string()) }
//! });
//!
//! query.fetch();
//!
//! // In the tick handler
//! if query.poll() {
//!     // State changed, rebuild views
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Instant;
use tokio::sync::mpsc;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Nothing requested yet
  Idle,
  Loading,
  Success(T),
  Error(String),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
  started_at: Option<Instant>,
  /// Result of the last successful load, kept while a reload is running
  last_data: Option<T>,
}

impl<T: Clone + Send + 'static> Query<T> {
  /// The fetcher is called once per `fetch()`.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      receiver: None,
      started_at: None,
      last_data: None,
    }
  }

  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  /// Data of the current state, or of the last success while reloading.
  pub fn data(&self) -> Option<&T> {
    self.state.data().or(self.last_data.as_ref())
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  /// Start loading. Returns `false` (and does nothing) while a load is in flight.
  pub fn fetch(&mut self) -> bool {
    if self.state.is_loading() {
      return false;
    }

    if let QueryState::Success(data) = &self.state {
      self.last_data = Some(data.clone());
    }

    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;
    self.started_at = Some(Instant::now());

    let future = (self.fetcher)();
    tokio::spawn(async move {
      // Receiver may be gone if the app quit mid-load
      let _ = tx.send(future.await);
    });
    true
  }

  /// Poll for the result of a pending load.
  ///
  /// Returns `true` if the state changed. Call this from the tick handler.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    let outcome = match receiver.try_recv() {
      Ok(result) => result,
      Err(mpsc::error::TryRecvError::Empty) => return false,
      Err(mpsc::error::TryRecvError::Disconnected) => Err("load was cancelled".to_string()),
    };

    if let Some(started) = self.started_at.take() {
      tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, ok = outcome.is_ok(), "query finished");
    }

    self.receiver = None;
    self.state = match outcome {
      Ok(data) => {
        self.last_data = None;
        QueryState::Success(data)
      }
      Err(error) => QueryState::Error(error),
    };
    true
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .field("started_at", &self.started_at)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicU32, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  async fn settle<T: Clone + Send + 'static>(query: &mut Query<T>) -> bool {
    for _ in 0..50 {
      if query.poll() {
        return true;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
  }

  #[tokio::test]
  async fn test_query_success() {
    let mut query = Query::new(|| async { Ok::<_, String>(vec![1, 2, 3]) });
    assert!(matches!(query.state(), QueryState::Idle));

    assert!(query.fetch());
    assert!(query.is_loading());

    assert!(settle(&mut query).await);
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn test_query_error() {
    let mut query: Query<i32> =
      Query::new(|| async { Err("authentication failed: token expired".to_string()) });

    query.fetch();
    assert!(settle(&mut query).await);

    assert_eq!(query.error(), Some("authentication failed: token expired"));
    assert_eq!(query.data(), None);
  }

  #[tokio::test]
  async fn test_fetch_while_loading_is_noop() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let mut query = Query::new(move || {
      counter.fetch_add(1, Ordering::SeqCst);
      async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, String>(42)
      }
    });

    assert!(query.fetch());
    assert!(!query.fetch());
    assert!(settle(&mut query).await);

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(query.data(), Some(&42));
  }

  #[tokio::test]
  async fn test_previous_data_visible_while_reloading() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let mut query = Query::new(move || {
      let n = counter.fetch_add(1, Ordering::SeqCst);
      async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok::<_, String>(n)
      }
    });

    query.fetch();
    assert!(settle(&mut query).await);
    assert_eq!(query.data(), Some(&0));

    query.fetch();
    assert!(query.is_loading());
    assert_eq!(query.data(), Some(&0));

    assert!(settle(&mut query).await);
    assert_eq!(query.data(), Some(&1));
  }
}
