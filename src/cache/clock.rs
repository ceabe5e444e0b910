use chrono::{DateTime, Local, NaiveDate};

/// Source of "today" for freshness checks.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Local>;

  fn today(&self) -> NaiveDate {
    self.now().date_naive()
  }
}

/// Wall clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
  fn now(&self) -> DateTime<Local> {
    Local::now()
  }
}

/// Clock pinned to a single instant.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

#[cfg(test)]
impl Clock for FixedClock {
  fn now(&self) -> DateTime<Local> {
    self.0
  }
}
