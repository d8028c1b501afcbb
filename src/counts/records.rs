//! Line codec for persisted counts, one record per line:
//!
//! ```text
//! T   <path> <slot> <word> <count>
//! PS  <path> <slot> <count>
//! SW  <slot> <word> <count>
//! S   <slot> *      <count>
//! ```
//!
//! with all fields separated by a single tab.
use std::fmt;

use super::CountKey;
use crate::error::{DirtError, Result};
use crate::paths::Slot;

/// Placeholder of the aggregated-away dimensions in `S` records
const WILDCARD: &str = "*";

/// A summed count of one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountRecord {
  /// the family and key
  pub key: CountKey,
  /// the summed count
  pub count: u64,
}

impl fmt::Display for CountRecord {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match &self.key {
      CountKey::Triple { path, slot, word } => write!(f, "T\t{}\t{}\t{}\t{}", path, slot, word, self.count),
      CountKey::PathSlot { path, slot } => write!(f, "PS\t{}\t{}\t{}", path, slot, self.count),
      CountKey::SlotWord { slot, word } => write!(f, "SW\t{}\t{}\t{}", slot, word, self.count),
      CountKey::Slot(slot) => write!(f, "S\t{}\t{}\t{}", slot, WILDCARD, self.count),
    }
  }
}

impl CountRecord {
  /// Decodes a line, `None` if it is malformed
  pub fn parse(line: &str) -> Option<CountRecord> { CountRecord::parse_strict(line).ok() }

  /// Decodes a line, reporting what is wrong with malformed ones
  pub fn parse_strict(line: &str) -> Result<CountRecord> {
    let malformed = |reason| DirtError::MalformedRecord {
      line: line.to_string(),
      reason,
    };
    let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
    let fields: Vec<&str> = line.split('\t').collect();
    let (count_field, key_fields) = match fields.split_last() {
      Some((last, rest)) if !rest.is_empty() => (last, rest),
      _ => return Err(malformed("missing count")),
    };
    let count = count_field
      .trim()
      .parse::<u64>()
      .map_err(|_| malformed("count is not a non-negative integer"))?;
    let slot_at = |i: usize| -> Result<Slot> {
      key_fields
        .get(i)
        .and_then(|s| s.parse::<Slot>().ok())
        .ok_or_else(|| malformed("unknown slot"))
    };
    let nonempty = |i: usize| -> Result<String> {
      match key_fields.get(i) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(malformed("empty key part")),
      }
    };

    let key = match (key_fields[0], key_fields.len()) {
      ("T", 4) => CountKey::Triple {
        path: nonempty(1)?,
        slot: slot_at(2)?,
        word: nonempty(3)?,
      },
      ("PS", 3) => CountKey::PathSlot {
        path: nonempty(1)?,
        slot: slot_at(2)?,
      },
      ("SW", 3) => CountKey::SlotWord {
        slot: slot_at(1)?,
        word: nonempty(2)?,
      },
      ("S", 2) => CountKey::Slot(slot_at(1)?),
      ("S", 3) if key_fields[2] == WILDCARD => CountKey::Slot(slot_at(1)?),
      _ => return Err(malformed("unknown record type or arity")),
    };
    Ok(CountRecord { key, count })
  }
}
