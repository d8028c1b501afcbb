//! Aggregation of path instances into the four marginal count families:
//! `T(p,slot,w)`, `PS(p,slot)`, `SW(slot,w)` and `S(slot)`.
//!
//! Every instance maps to one key of each family. Sums are associative and
//! commutative, so partial tables may be combined in any order.
pub mod barrier;
pub mod records;

pub use self::barrier::{GlobalTotal, TotalBarrier};
pub use self::records::CountRecord;

use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::collections::HashMap;

use crate::paths::{PathInstance, Slot};

/// A composite key of one of the four count families
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CountKey {
  /// `(p, slot, w)`
  Triple {
    /// path key
    path: String,
    /// slot
    slot: Slot,
    /// filler word
    word: String,
  },
  /// `(p, slot, *)`
  PathSlot {
    /// path key
    path: String,
    /// slot
    slot: Slot,
  },
  /// `(*, slot, w)`
  SlotWord {
    /// slot
    slot: Slot,
    /// filler word
    word: String,
  },
  /// `(*, slot, *)`
  Slot(Slot),
}

impl CountKey {
  /// The four partial keys an instance contributes to
  pub fn for_instance(instance: &PathInstance) -> [CountKey; 4] {
    [
      CountKey::Triple {
        path: instance.path.clone(),
        slot: instance.slot,
        word: instance.filler.clone(),
      },
      CountKey::PathSlot {
        path: instance.path.clone(),
        slot: instance.slot,
      },
      CountKey::SlotWord {
        slot: instance.slot,
        word: instance.filler.clone(),
      },
      CountKey::Slot(instance.slot),
    ]
  }

  /// The slot every key is partitioned by
  pub fn slot(&self) -> Slot {
    match self {
      CountKey::Triple { slot, .. }
      | CountKey::PathSlot { slot, .. }
      | CountKey::SlotWord { slot, .. }
      | CountKey::Slot(slot) => *slot,
    }
  }

  /// The record type tag: `T`, `PS`, `SW` or `S`
  pub fn family(&self) -> &'static str {
    match self {
      CountKey::Triple { .. } => "T",
      CountKey::PathSlot { .. } => "PS",
      CountKey::SlotWord { .. } => "SW",
      CountKey::Slot(_) => "S",
    }
  }
}

/// Summed counts of all four families
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountTable {
  /// hashmap for the summed counts
  pub map: HashMap<CountKey, u64>,
}

impl CountTable {
  /// Creates a new, empty table
  pub fn new() -> Self { CountTable::default() }

  /// Sums all instances of a stream
  pub fn from_instances<I: IntoIterator<Item = PathInstance>>(instances: I) -> Self {
    let mut table = CountTable::new();
    for instance in instances {
      table.add_instance(&instance);
    }
    table
  }

  /// Sums partitions of the instance stream in parallel, combining the
  /// partial tables into one
  pub fn from_partitions<P>(partitions: P) -> Self
  where
    P: IntoParallelIterator<Item = Vec<PathInstance>>,
  {
    partitions
      .into_par_iter()
      .map(CountTable::from_instances)
      .reduce(CountTable::new, CountTable::merge)
  }

  /// Rebuilds a table from persisted records, summing duplicate keys
  pub fn from_records<I: IntoIterator<Item = CountRecord>>(records: I) -> Self {
    let mut table = CountTable::new();
    for record in records {
      table.add(record.key, record.count);
    }
    table
  }

  /// Adds `count` to `key`
  pub fn add(&mut self, key: CountKey, count: u64) {
    let counter = self.map.entry(key).or_insert(0);
    *counter += count;
  }

  /// Adds one instance to each of its four families
  pub fn add_instance(&mut self, instance: &PathInstance) {
    for key in CountKey::for_instance(instance).iter() {
      self.add(key.clone(), instance.count);
    }
  }

  /// Combines two partial tables
  pub fn merge(mut self, other: CountTable) -> CountTable {
    let (mut larger, smaller) = if self.map.len() >= other.map.len() {
      (std::mem::take(&mut self.map), other.map)
    } else {
      (other.map, std::mem::take(&mut self.map))
    };
    for (key, count) in smaller {
      let counter = larger.entry(key).or_insert(0);
      *counter += count;
    }
    CountTable { map: larger }
  }

  /// The summed count of `key`, 0 if never seen
  pub fn get(&self, key: &CountKey) -> u64 { self.map.get(key).copied().unwrap_or(0) }

  /// `T(p, slot, w)`
  pub fn triple(&self, path: &str, slot: Slot, word: &str) -> u64 {
    self.get(&CountKey::Triple {
      path: path.to_string(),
      slot,
      word: word.to_string(),
    })
  }

  /// `PS(p, slot)`
  pub fn path_slot(&self, path: &str, slot: Slot) -> u64 {
    self.get(&CountKey::PathSlot {
      path: path.to_string(),
      slot,
    })
  }

  /// `SW(slot, w)`
  pub fn slot_word(&self, slot: Slot, word: &str) -> u64 {
    self.get(&CountKey::SlotWord {
      slot,
      word: word.to_string(),
    })
  }

  /// `S(slot)`
  pub fn slot_total(&self, slot: Slot) -> u64 { self.get(&CountKey::Slot(slot)) }

  /// The grand total: the sum over the reduced triple family
  pub fn triple_total(&self) -> u64 {
    self
      .map
      .iter()
      .filter(|(key, _)| matches!(key, CountKey::Triple { .. }))
      .map(|(_, count)| *count)
      .sum()
  }

  /// number of distinct keys over all families
  pub fn len(&self) -> usize { self.map.len() }

  /// true if nothing was counted
  pub fn is_empty(&self) -> bool { self.map.is_empty() }

  /// All entries as records, sorted by key for reproducible output
  pub fn records(&self) -> Vec<CountRecord> {
    let mut records: Vec<CountRecord> = self
      .map
      .iter()
      .map(|(key, count)| CountRecord {
        key: key.clone(),
        count: *count,
      })
      .collect();
    records.sort_by(|a, b| a.key.cmp(&b.key));
    records
  }
}
