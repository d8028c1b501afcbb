//! Pointwise mutual information of `(path, slot, word)` triples.
//!
//! `MI(p,s,w) = ln( c(p,s,w) * Total / ( c(p,s,*) * c(*,s,w) ) )`
//!
//! Work is partitioned by slot: each partition holds the slot total and the
//! two marginal maps in memory, and joins them against a single forward scan
//! of its triples.
pub mod triples;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use self::triples::{AdaptiveTriples, TripleStore};
use crate::counts::{CountKey, CountRecord, CountTable, GlobalTotal};
use crate::error::Result;
use crate::paths::Slot;

/// Parameters of the MI stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiParameters {
  /// Number of triples per slot kept in memory before the partition spills
  /// them to a temporary file. `None` never spills.
  pub spill_threshold: Option<usize>,
  /// Only entries with MI strictly above this cutoff are kept
  pub min_mi: f64,
}

impl Default for MiParameters {
  fn default() -> MiParameters {
    MiParameters {
      spill_threshold: None,
      min_mi: 0.0,
    }
  }
}

/// The MI weight of one slot filler of one path
#[derive(Debug, Clone, PartialEq)]
pub struct MiEntry {
  /// path key
  pub path: String,
  /// slot
  pub slot: Slot,
  /// filler word
  pub word: String,
  /// pointwise mutual information, natural log
  pub mi: f64,
}

impl fmt::Display for MiEntry {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}\t{}\t{}\t{}", self.path, self.slot, self.word, self.mi)
  }
}

impl MiEntry {
  /// Decodes a `path\tslot\tword\tmi` line, `None` if it is malformed
  pub fn parse(line: &str) -> Option<MiEntry> {
    let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 4 || fields[0].is_empty() || fields[2].is_empty() {
      return None;
    }
    let slot = fields[1].parse::<Slot>().ok()?;
    let mi = fields[3].trim().parse::<f64>().ok()?;
    if !mi.is_finite() {
      return None;
    }
    Some(MiEntry {
      path: fields[0].to_string(),
      slot,
      word: fields[2].to_string(),
      mi,
    })
  }
}

/// The MI of a triple, `None` when any count is zero
pub fn mutual_information(triple: u64, path_slot: u64, slot_word: u64, total: u64) -> Option<f64> {
  if triple == 0 || path_slot == 0 || slot_word == 0 || total == 0 {
    return None;
  }
  let numerator = triple as f64 * total as f64;
  let denominator = path_slot as f64 * slot_word as f64;
  Some((numerator / denominator).ln())
}

/// All counts of one slot, gathered for the MI join
pub struct SlotPartition {
  /// the slot of this partition
  pub slot: Slot,
  /// `S(slot)`, if a record for it was seen
  pub slot_total: Option<u64>,
  /// `SW(slot, w)` by word
  pub slot_words: HashMap<String, u64>,
  /// `PS(p, slot)` by path
  pub path_slots: HashMap<String, u64>,
  triples: Box<dyn TripleStore>,
}

impl SlotPartition {
  /// An empty partition using the storage strategy of `parameters`
  pub fn new(slot: Slot, parameters: &MiParameters) -> Self {
    SlotPartition::with_store(slot, Box::new(AdaptiveTriples::new(parameters.spill_threshold)))
  }

  /// An empty partition with an explicit triple store
  pub fn with_store(slot: Slot, triples: Box<dyn TripleStore>) -> Self {
    SlotPartition {
      slot,
      slot_total: None,
      slot_words: HashMap::new(),
      path_slots: HashMap::new(),
      triples,
    }
  }

  /// Routes a record into the partition. Records of another slot are ignored.
  /// Repeated marginal keys, as met when several part files carry the same
  /// key, are summed. Triples are appended as they come.
  pub fn push(&mut self, record: CountRecord) -> Result<()> {
    if record.key.slot() != self.slot {
      return Ok(());
    }
    match record.key {
      CountKey::Triple { path, word, .. } => self.triples.push(&path, &word, record.count)?,
      CountKey::PathSlot { path, .. } => *self.path_slots.entry(path).or_insert(0) += record.count,
      CountKey::SlotWord { word, .. } => *self.slot_words.entry(word).or_insert(0) += record.count,
      CountKey::Slot(_) => *self.slot_total.get_or_insert(0) += record.count,
    }
    Ok(())
  }

  /// number of triples awaiting the join
  pub fn triple_count(&self) -> usize { self.triples.len() }

  /// Joins the triples against the marginals. A slot without a positive
  /// total yields nothing, as does any triple missing a marginal.
  pub fn compute(mut self, total: GlobalTotal, parameters: &MiParameters) -> Result<Vec<MiEntry>> {
    let slot = self.slot;
    match self.slot_total {
      Some(count) if count > 0 => {},
      _ => {
        debug!("slot {} has no marginal data, skipping", slot);
        return Ok(Vec::new());
      },
    }
    let (path_slots, slot_words) = (&self.path_slots, &self.slot_words);
    let mut entries = Vec::new();
    let mut skipped = 0usize;
    self.triples.scan(&mut |path: &str, word: &str, count: u64| {
      let marginals = (path_slots.get(path), slot_words.get(word));
      let mi = match marginals {
        (Some(&path_slot), Some(&slot_word)) => mutual_information(count, path_slot, slot_word, total.get()),
        _ => None,
      };
      match mi {
        Some(mi) if mi > parameters.min_mi => entries.push(MiEntry {
          path: path.to_string(),
          slot,
          word: word.to_string(),
          mi,
        }),
        Some(_) => {},
        None => skipped += 1,
      }
    })?;
    debug!(
      "slot {}: {} MI entries kept, {} triples lacking evidence",
      slot,
      entries.len(),
      skipped
    );
    Ok(entries)
  }
}

/// The shuffle of the MI stage: routes every record to its slot's partition
pub fn partition_by_slot<I>(records: I, parameters: &MiParameters) -> Result<Vec<SlotPartition>>
where
  I: IntoIterator<Item = CountRecord>,
{
  let mut partitions: BTreeMap<Slot, SlotPartition> = BTreeMap::new();
  for record in records {
    let slot = record.key.slot();
    partitions
      .entry(slot)
      .or_insert_with(|| SlotPartition::new(slot, parameters))
      .push(record)?;
  }
  Ok(partitions.into_iter().map(|(_, partition)| partition).collect())
}

/// Computes MI over all slot partitions in parallel. The output is sorted by
/// path, slot and word, independent of scheduling.
pub fn compute_partitions(
  partitions: Vec<SlotPartition>,
  total: GlobalTotal,
  parameters: &MiParameters,
) -> Result<Vec<MiEntry>> {
  let per_slot: Vec<Vec<MiEntry>> = partitions
    .into_par_iter()
    .map(|partition| partition.compute(total, parameters))
    .collect::<Result<Vec<_>>>()?;
  let mut entries: Vec<MiEntry> = per_slot.into_iter().flatten().collect();
  sort_entries(&mut entries);
  info!("computed {} positive MI entries", entries.len());
  Ok(entries)
}

/// MI of persisted count records
pub fn compute_mi<I>(records: I, total: GlobalTotal, parameters: &MiParameters) -> Result<Vec<MiEntry>>
where
  I: IntoIterator<Item = CountRecord>,
{
  let partitions = partition_by_slot(records, parameters)?;
  compute_partitions(partitions, total, parameters)
}

/// MI of an in-memory count table
pub fn compute_table_mi(counts: &CountTable, total: GlobalTotal, parameters: &MiParameters) -> Result<Vec<MiEntry>> {
  let records = counts.map.iter().map(|(key, count)| CountRecord {
    key: key.clone(),
    count: *count,
  });
  compute_mi(records, total, parameters)
}

/// Orders entries by path, slot, then word
pub fn sort_entries(entries: &mut Vec<MiEntry>) {
  entries.sort_by(|a, b| {
    a.path
      .cmp(&b.path)
      .then(a.slot.cmp(&b.slot))
      .then_with(|| a.word.cmp(&b.word))
  });
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn worked_example() {
    let mi = mutual_information(2, 10, 4, 1000).unwrap();
    assert!((mi - 50f64.ln()).abs() < 1e-12);
    assert!((mi - 3.912).abs() < 1e-3);
  }

  #[test]
  fn zero_counts_have_no_mi() {
    assert_eq!(mutual_information(0, 10, 4, 1000), None);
    assert_eq!(mutual_information(2, 0, 4, 1000), None);
    assert_eq!(mutual_information(2, 10, 0, 1000), None);
  }

  #[test]
  fn entry_lines_round_trip() {
    let entry = MiEntry::parse("X chase Y\tX\tdog\t1.5").unwrap();
    assert_eq!(entry.slot, Slot::X);
    assert_eq!(entry.to_string(), "X chase Y\tX\tdog\t1.5");
    assert_eq!(MiEntry::parse("X chase Y\tX\tdog"), None);
    assert_eq!(MiEntry::parse("X chase Y\tX\tdog\tabc"), None);
    assert_eq!(MiEntry::parse("X chase Y\tZ\tdog\t1.0"), None);
  }

  #[test]
  fn slot_without_total_is_skipped() {
    let parameters = MiParameters::default();
    let mut partition = SlotPartition::new(Slot::X, &parameters);
    let triple = CountRecord::parse("T\tX chase Y\tX\tdog\t2").unwrap();
    partition.push(triple).unwrap();
    partition.push(CountRecord::parse("PS\tX chase Y\tX\t2").unwrap()).unwrap();
    partition.push(CountRecord::parse("SW\tX\tdog\t2").unwrap()).unwrap();
    let total = GlobalTotal::new(100).unwrap();
    assert!(partition.compute(total, &parameters).unwrap().is_empty());
  }

  #[test]
  fn repeated_marginals_are_summed() {
    let parameters = MiParameters::default();
    let mut partition = SlotPartition::new(Slot::X, &parameters);
    for line in &[
      "S\tX\t*\t300",
      "S\tX\t200",
      "PS\tX chase Y\tX\t6",
      "PS\tX chase Y\tX\t4",
      "SW\tX\tdog\t1",
      "SW\tX\tdog\t3",
      "T\tX chase Y\tX\tdog\t2",
    ] {
      partition.push(CountRecord::parse(line).unwrap()).unwrap();
    }
    assert_eq!(partition.slot_total, Some(500));
    assert_eq!(partition.path_slots["X chase Y"], 10);
    assert_eq!(partition.slot_words["dog"], 4);
    let total = GlobalTotal::new(1000).unwrap();
    let entries = partition.compute(total, &parameters).unwrap();
    assert_eq!(entries.len(), 1);
    assert!((entries[0].mi - 50f64.ln()).abs() < 1e-12);
  }

  #[test]
  fn foreign_slot_records_are_ignored() {
    let parameters = MiParameters::default();
    let mut partition = SlotPartition::new(Slot::Y, &parameters);
    partition.push(CountRecord::parse("T\tX chase Y\tX\tdog\t2").unwrap()).unwrap();
    partition.push(CountRecord::parse("S\tX\t*\t2").unwrap()).unwrap();
    assert_eq!(partition.triple_count(), 0);
    assert_eq!(partition.slot_total, None);
  }
}
