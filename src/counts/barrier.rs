//! The rendezvous between counting and MI estimation.
//!
//! The global triple total is published once, after every triple count is
//! final. MI workers wait on the barrier and fail rather than compute with a
//! missing or zero total.
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use super::CountTable;
use crate::error::{DirtError, Result};

/// A positive grand total of the reduced triple family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalTotal(u64);

impl GlobalTotal {
  /// Validates a total, refusing zero
  pub fn new(total: u64) -> Result<Self> {
    if total == 0 {
      Err(DirtError::MissingTotal(Some(total)))
    } else {
      Ok(GlobalTotal(total))
    }
  }

  /// The total of a finished count table
  pub fn from_counts(counts: &CountTable) -> Result<Self> { GlobalTotal::new(counts.triple_total()) }

  /// the total as a number
  pub fn get(self) -> u64 { self.0 }
}

/// A write-once promise for the global total, shared by all MI workers
#[derive(Debug, Default)]
pub struct TotalBarrier {
  published: Mutex<Option<u64>>,
  ready: Condvar,
}

impl TotalBarrier {
  /// Creates an unresolved barrier
  pub fn new() -> Self { TotalBarrier::default() }

  /// Resolves the barrier and wakes all waiting workers. Publishing the same
  /// total twice is harmless, a different total is refused.
  pub fn publish(&self, total: u64) -> Result<GlobalTotal> {
    let mut published = self.published.lock().map_err(|_| DirtError::BarrierPoisoned)?;
    match *published {
      Some(previous) if previous != total => {
        return Err(DirtError::TotalConflict {
          published: previous,
          attempted: total,
        })
      },
      Some(_) => {},
      None => {
        *published = Some(total);
        info!("published global triple total {}", total);
        self.ready.notify_all();
      },
    }
    GlobalTotal::new(total)
  }

  /// The total if already published, without blocking
  pub fn try_get(&self) -> Result<GlobalTotal> {
    let published = self.published.lock().map_err(|_| DirtError::BarrierPoisoned)?;
    resolve(*published)
  }

  /// Blocks until the total is published
  pub fn wait(&self) -> Result<GlobalTotal> {
    let mut published = self.published.lock().map_err(|_| DirtError::BarrierPoisoned)?;
    while published.is_none() {
      published = self.ready.wait(published).map_err(|_| DirtError::BarrierPoisoned)?;
    }
    resolve(*published)
  }

  /// Blocks until the total is published or `timeout` elapses
  pub fn wait_timeout(&self, timeout: Duration) -> Result<GlobalTotal> {
    let published = self.published.lock().map_err(|_| DirtError::BarrierPoisoned)?;
    let (published, _) = self
      .ready
      .wait_timeout_while(published, timeout, |total| total.is_none())
      .map_err(|_| DirtError::BarrierPoisoned)?;
    resolve(*published)
  }
}

fn resolve(published: Option<u64>) -> Result<GlobalTotal> {
  match published {
    Some(total) => GlobalTotal::new(total),
    None => Err(DirtError::MissingTotal(None)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;
  use std::thread;

  #[test]
  fn zero_total_is_refused() {
    assert!(matches!(GlobalTotal::new(0), Err(DirtError::MissingTotal(Some(0)))));
    assert_eq!(GlobalTotal::new(5).unwrap().get(), 5);
  }

  #[test]
  fn unpublished_barrier_fails_fast() {
    let barrier = TotalBarrier::new();
    assert!(matches!(barrier.try_get(), Err(DirtError::MissingTotal(None))));
    assert!(matches!(
      barrier.wait_timeout(Duration::from_millis(10)),
      Err(DirtError::MissingTotal(None))
    ));
  }

  #[test]
  fn waiters_see_the_published_total() {
    let barrier = Arc::new(TotalBarrier::new());
    let workers: Vec<_> = (0..4)
      .map(|_| {
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || barrier.wait().map(GlobalTotal::get))
      })
      .collect();
    barrier.publish(1000).unwrap();
    for worker in workers {
      assert_eq!(worker.join().unwrap().unwrap(), 1000);
    }
  }

  #[test]
  fn conflicting_totals_are_refused() {
    let barrier = TotalBarrier::new();
    barrier.publish(10).unwrap();
    assert!(barrier.publish(10).is_ok());
    assert!(matches!(barrier.publish(11), Err(DirtError::TotalConflict { .. })));
    assert_eq!(barrier.try_get().unwrap().get(), 10);
  }

  #[test]
  fn published_zero_fails_waiters() {
    let barrier = TotalBarrier::new();
    assert!(barrier.publish(0).is_err());
    assert!(matches!(barrier.wait(), Err(DirtError::MissingTotal(Some(0)))));
  }
}
