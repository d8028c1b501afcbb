//! Similarity of paths by the overlap of their MI-weighted slot fillers.
//!
//! For one slot with filler weights `A` and `B`:
//!
//! `simSlot(A,B) = Σ_{w∈A∩B} (A[w] + B[w]) / (Σ_A + Σ_B)`
//!
//! and two paths are as similar as the geometric mean of their X and Y slot
//! similarities.
pub mod eval;

use rayon::prelude::*;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::mi::MiEntry;
use crate::paths::{Slot, X_MARKER, Y_MARKER};
use crate::stemmer::Stem;

lazy_static! {
  static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Default number of neighbours returned by `FeatureIndex::most_similar`
pub const TOP_K_SIMILAR: usize = 40;
/// Default similarity a neighbour has to exceed
pub const SIMILARITY_THRESHOLD: f64 = 0.1;

/// Filler word to MI weight, ordered so sums are reproducible
pub type SlotFeatures = BTreeMap<String, f64>;

/// The slot filler features of one path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feats {
  /// fillers of slot X
  pub x: SlotFeatures,
  /// fillers of slot Y
  pub y: SlotFeatures,
}

impl Feats {
  /// The features of `slot`
  pub fn slot(&self, slot: Slot) -> &SlotFeatures {
    match slot {
      Slot::X => &self.x,
      Slot::Y => &self.y,
    }
  }

  /// Records the weight of a filler
  pub fn insert(&mut self, slot: Slot, word: String, mi: f64) {
    let features = match slot {
      Slot::X => &mut self.x,
      Slot::Y => &mut self.y,
    };
    features.insert(word, mi);
  }
}

/// Slot similarity of two filler vectors, 0 when either is empty
pub fn slot_similarity(a: &SlotFeatures, b: &SlotFeatures) -> f64 {
  if a.is_empty() || b.is_empty() {
    return 0.0;
  }
  let (smaller, larger) = if a.len() <= b.len() { (a, b) } else { (b, a) };
  let shared: f64 = smaller
    .iter()
    .filter_map(|(word, weight)| larger.get(word).map(|other| weight + other))
    .sum();
  let denominator = a.values().sum::<f64>() + b.values().sum::<f64>();
  if denominator == 0.0 {
    0.0
  } else {
    shared / denominator
  }
}

/// Path similarity: `sqrt(simSlot_X * simSlot_Y)`, 0 if either slot shares nothing
pub fn path_similarity(p: &Feats, q: &Feats) -> f64 {
  let x = slot_similarity(&p.x, &q.x);
  let y = slot_similarity(&p.y, &q.y);
  if x == 0.0 || y == 0.0 {
    0.0
  } else {
    (x * y).sqrt()
  }
}

/// Normalizes a free-text predicate such as `"X Chases   Y"` into the path
/// key form `"X chase Y"`: every token but the slot markers is stemmed, and
/// tokens are joined by single spaces
pub fn normalize_predicate<S: Stem + ?Sized>(predicate: &str, stemmer: &S) -> String {
  WHITESPACE
    .split(predicate.trim())
    .filter(|token| !token.is_empty())
    .map(|token| {
      if token == X_MARKER || token == Y_MARKER {
        token.to_string()
      } else {
        stemmer.stem(token)
      }
    })
    .collect::<Vec<String>>()
    .join(" ")
}

/// Features of a set of paths, looked up by path key
#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
  /// hashmap from path key to its features
  pub map: HashMap<String, Feats>,
}

impl FeatureIndex {
  /// Creates an empty index
  pub fn new() -> Self { FeatureIndex::default() }

  /// Indexes MI entries. With `needed`, only those paths are kept.
  pub fn from_entries<I>(entries: I, needed: Option<&HashSet<String>>) -> Self
  where
    I: IntoIterator<Item = MiEntry>,
  {
    let mut index = FeatureIndex::new();
    for entry in entries {
      if let Some(needed) = needed {
        if !needed.contains(&entry.path) {
          continue;
        }
      }
      index.insert(entry);
    }
    index
  }

  /// Adds one MI entry
  pub fn insert(&mut self, entry: MiEntry) {
    self
      .map
      .entry(entry.path)
      .or_insert_with(Feats::default)
      .insert(entry.slot, entry.word, entry.mi);
  }

  /// The features of `path`
  pub fn get(&self, path: &str) -> Option<&Feats> { self.map.get(path) }

  /// number of indexed paths
  pub fn len(&self) -> usize { self.map.len() }

  /// true if no path is indexed
  pub fn is_empty(&self) -> bool { self.map.is_empty() }

  /// Similarity of two paths, 0 if either is unknown
  pub fn similarity(&self, p: &str, q: &str) -> f64 {
    match (self.get(p), self.get(q)) {
      (Some(p), Some(q)) => path_similarity(p, q),
      _ => 0.0,
    }
  }

  /// Similarities of many pairs, scored in parallel, in input order
  pub fn similarities(&self, pairs: &[(String, String)]) -> Vec<f64> {
    pairs.par_iter().map(|(p, q)| self.similarity(p, q)).collect()
  }

  /// The `k` paths most similar to `path` with a similarity above
  /// `threshold`, best first, ties broken by path key
  pub fn most_similar(&self, path: &str, k: usize, threshold: f64) -> Vec<(String, f64)> {
    let feats = match self.get(path) {
      Some(feats) => feats,
      None => return Vec::new(),
    };
    let mut neighbours: Vec<(String, f64)> = self
      .map
      .par_iter()
      .filter(|(other, _)| other.as_str() != path)
      .map(|(other, other_feats)| (other.clone(), path_similarity(feats, other_feats)))
      .filter(|(_, score)| *score > threshold)
      .collect();
    neighbours.sort_by(|a, b| {
      b.1
        .partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.cmp(&b.0))
    });
    neighbours.truncate(k);
    neighbours
  }

  /// `most_similar` with the default cutoffs
  pub fn neighbours(&self, path: &str) -> Vec<(String, f64)> {
    self.most_similar(path, TOP_K_SIMILAR, SIMILARITY_THRESHOLD)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::stemmer::LowercaseStemmer;

  fn features(pairs: &[(&str, f64)]) -> SlotFeatures {
    pairs.iter().map(|(w, mi)| (w.to_string(), *mi)).collect()
  }

  #[test]
  fn slot_similarity_by_hand() {
    let a = features(&[("dog", 1.0), ("cat", 2.0)]);
    let b = features(&[("dog", 3.0), ("owl", 4.0)]);
    // (1 + 3) / (3 + 7)
    assert!((slot_similarity(&a, &b) - 0.4).abs() < 1e-12);
    assert_eq!(slot_similarity(&a, &b), slot_similarity(&b, &a));
    assert_eq!(slot_similarity(&a, &SlotFeatures::new()), 0.0);
  }

  #[test]
  fn identical_paths_are_fully_similar() {
    let mut feats = Feats::default();
    feats.insert(Slot::X, "dog".to_string(), 1.5);
    feats.insert(Slot::Y, "cat".to_string(), 0.5);
    assert!((path_similarity(&feats, &feats) - 1.0).abs() < 1e-12);
  }

  #[test]
  fn missing_slot_means_no_similarity() {
    let mut p = Feats::default();
    p.insert(Slot::X, "dog".to_string(), 1.0);
    let mut q = p.clone();
    q.insert(Slot::Y, "cat".to_string(), 1.0);
    assert_eq!(path_similarity(&p, &q), 0.0);
    assert_eq!(path_similarity(&q, &p), 0.0);
  }

  #[test]
  fn predicates_normalize_like_keys() {
    assert_eq!(normalize_predicate("  X  Chases\tY ", &LowercaseStemmer), "X chases Y");
    assert_eq!(normalize_predicate("x Y", &LowercaseStemmer), "x Y");
    assert_eq!(normalize_predicate("   ", &LowercaseStemmer), "");
  }
}
