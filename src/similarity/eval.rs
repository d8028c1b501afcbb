//! Scoring labeled predicate pairs, as handed over by an evaluator.
//!
//! Input pairs are tab separated free-text predicates, one pair per line,
//! either `p1\tp2` for a file of one label or `label\tp1\tp2`. Scores are
//! written as `label\tp1\tp2\tscore` below a header line.
use csv::{ByteRecord, QuoteStyle, ReaderBuilder, Trim, WriterBuilder};
use rayon::prelude::*;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::str;

use super::{normalize_predicate, FeatureIndex};
use crate::error::Result;
use crate::stemmer::Stem;

/// A pair of normalized predicates with its gold label, e.g. `pos` or `neg`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledPair {
  /// gold label
  pub label: String,
  /// first normalized predicate
  pub p1: String,
  /// second normalized predicate
  pub p2: String,
}

/// A labeled pair with its similarity score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPair {
  /// the pair
  pub pair: LabeledPair,
  /// path similarity of the pair
  pub score: f64,
}

fn tab_reader<R: Read>(reader: R) -> csv::Reader<R> {
  ReaderBuilder::new()
    .delimiter(b'\t')
    .has_headers(false)
    .flexible(true)
    .quoting(false)
    .trim(Trim::All)
    .from_reader(reader)
}

fn normalized_pair<S: Stem + ?Sized>(label: &str, p1: &str, p2: &str, stemmer: &S) -> Option<LabeledPair> {
  let p1 = normalize_predicate(p1, stemmer);
  let p2 = normalize_predicate(p2, stemmer);
  if label.is_empty() || p1.is_empty() || p2.is_empty() {
    None
  } else {
    Some(LabeledPair {
      label: label.to_string(),
      p1,
      p2,
    })
  }
}

/// The fields of a line, `None` if any of them is not UTF-8
fn decoded_fields(record: &ByteRecord) -> Option<Vec<&str>> {
  record.iter().map(|field| str::from_utf8(field).ok()).collect()
}

/// Reads `p1\tp2` lines, all carrying `label`. Lines that are not UTF-8, have
/// fewer than two fields or an empty predicate are skipped.
pub fn read_pairs<R: Read, S: Stem + ?Sized>(reader: R, label: &str, stemmer: &S) -> Result<Vec<LabeledPair>> {
  let mut pairs = Vec::new();
  for record in tab_reader(reader).byte_records() {
    let record = record?;
    let fields = match decoded_fields(&record) {
      Some(fields) => fields,
      None => {
        warn!("skipping non UTF-8 pair line: {:?}", record);
        continue;
      },
    };
    match fields.as_slice() {
      [p1, p2, ..] => match normalized_pair(label, p1, p2, stemmer) {
        Some(pair) => pairs.push(pair),
        None => debug!("skipping pair with an empty predicate: {:?}", fields),
      },
      _ => debug!("skipping short pair line: {:?}", fields),
    }
  }
  Ok(pairs)
}

/// Reads `label\tp1\tp2` lines, skipping lines that are not UTF-8 or incomplete
pub fn read_labeled_pairs<R: Read, S: Stem + ?Sized>(reader: R, stemmer: &S) -> Result<Vec<LabeledPair>> {
  let mut pairs = Vec::new();
  for record in tab_reader(reader).byte_records() {
    let record = record?;
    let fields = match decoded_fields(&record) {
      Some(fields) => fields,
      None => {
        warn!("skipping non UTF-8 labeled pair line: {:?}", record);
        continue;
      },
    };
    match fields.as_slice() {
      [label, p1, p2, ..] => match normalized_pair(label, p1, p2, stemmer) {
        Some(pair) => pairs.push(pair),
        None => debug!("skipping incomplete labeled pair: {:?}", fields),
      },
      _ => debug!("skipping short labeled pair line: {:?}", fields),
    }
  }
  Ok(pairs)
}

/// Every predicate mentioned by `pairs`, for restricting feature loading
pub fn needed_paths(pairs: &[LabeledPair]) -> HashSet<String> {
  pairs
    .iter()
    .flat_map(|pair| vec![pair.p1.clone(), pair.p2.clone()])
    .collect()
}

/// Scores all pairs in parallel, keeping their order. Unknown predicates score 0.
pub fn score_pairs(index: &FeatureIndex, pairs: Vec<LabeledPair>) -> Vec<ScoredPair> {
  pairs
    .into_par_iter()
    .map(|pair| {
      let score = index.similarity(&pair.p1, &pair.p2);
      ScoredPair { pair, score }
    })
    .collect()
}

/// Writes the header and one `label\tp1\tp2\tscore` line per pair
pub fn write_scores<W: Write>(writer: W, scored: &[ScoredPair]) -> Result<()> {
  let mut writer = WriterBuilder::new()
    .delimiter(b'\t')
    .quote_style(QuoteStyle::Never)
    .from_writer(writer);
  writer.write_record(&["label", "p1", "p2", "score"])?;
  for entry in scored {
    let score = entry.score.to_string();
    writer.write_record(&[
      entry.pair.label.as_str(),
      entry.pair.p1.as_str(),
      entry.pair.p2.as_str(),
      score.as_str(),
    ])?;
  }
  writer.flush()?;
  Ok(())
}
