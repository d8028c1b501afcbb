//! Error values shared by all pipeline stages
use std::io;
use thiserror::Error;

/// Everything that can fail a DIRT run. Malformed input lines and missing
/// statistical evidence are not errors: they are logged and skipped.
#[derive(Debug, Error)]
pub enum DirtError {
  /// The global triple total was never published, or is not positive.
  /// All MI values would be meaningless, so the MI stage refuses to run.
  #[error("global triple total is missing or not positive (got {0:?})")]
  MissingTotal(Option<u64>),
  /// A second, different total was published
  #[error("global triple total already published as {published}, refusing {attempted}")]
  TotalConflict {
    /// the total in effect
    published: u64,
    /// the refused total
    attempted: u64,
  },
  /// A thread panicked while holding the total barrier
  #[error("total barrier lock was poisoned")]
  BarrierPoisoned,
  /// A strict parser met a line it could not decode
  #[error("malformed record {line:?}: {reason}")]
  MalformedRecord {
    /// the offending line
    line: String,
    /// what was wrong with it
    reason: &'static str,
  },
  /// I/O failure while reading or spilling records
  #[error(transparent)]
  Io(#[from] io::Error),
  /// Failure in the tab-separated evaluator files
  #[error(transparent)]
  Csv(#[from] csv::Error),
  /// Unreadable parameter file
  #[error(transparent)]
  Config(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, DirtError>;
