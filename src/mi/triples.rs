//! Storage strategies for the triple side of the per-slot MI join.
//!
//! The marginals of a slot are small and stay in memory, while its triples are
//! only ever scanned once. Small runs keep triples in memory, large runs spill
//! them to an anonymous temporary file.
use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter, SeekFrom};

use crate::error::Result;

static BUFFER_CAPACITY: usize = 1_048_576;

/// A `(path, word, count)` triple of one slot
pub type SlotTriple = (String, String, u64);

/// Append-then-scan-once storage of a slot's triples
pub trait TripleStore: Send {
  /// appends a triple
  fn push(&mut self, path: &str, word: &str, count: u64) -> Result<()>;
  /// number of triples stored
  fn len(&self) -> usize;
  /// true if nothing was stored
  fn is_empty(&self) -> bool { self.len() == 0 }
  /// Visits every stored triple in insertion order
  fn scan(&mut self, visit: &mut dyn FnMut(&str, &str, u64)) -> Result<()>;
}

/// Triples held in a vector
#[derive(Debug, Default)]
pub struct InMemoryTriples {
  triples: Vec<SlotTriple>,
}

impl InMemoryTriples {
  /// Creates an empty store
  pub fn new() -> Self { InMemoryTriples::default() }
}

impl TripleStore for InMemoryTriples {
  fn push(&mut self, path: &str, word: &str, count: u64) -> Result<()> {
    self.triples.push((path.to_string(), word.to_string(), count));
    Ok(())
  }

  fn len(&self) -> usize { self.triples.len() }

  fn scan(&mut self, visit: &mut dyn FnMut(&str, &str, u64)) -> Result<()> {
    for (path, word, count) in &self.triples {
      visit(path.as_str(), word.as_str(), *count);
    }
    Ok(())
  }
}

/// Triples written as `path\tword\tcount` lines to a temporary file, which is
/// removed when the store is dropped
pub struct SpilledTriples {
  writer: Option<BufWriter<File>>,
  file: Option<File>,
  len: usize,
}

impl SpilledTriples {
  /// Creates an empty store backed by a fresh temporary file
  pub fn new() -> Result<Self> {
    let file = tempfile::tempfile()?;
    Ok(SpilledTriples {
      writer: Some(BufWriter::with_capacity(BUFFER_CAPACITY, file)),
      file: None,
      len: 0,
    })
  }

  fn finish_writing(&mut self) -> Result<&mut File> {
    if let Some(writer) = self.writer.take() {
      let mut file = writer.into_inner().map_err(io::Error::from)?;
      file.flush()?;
      self.file = Some(file);
    }
    match self.file.as_mut() {
      Some(file) => Ok(file),
      None => Err(io::Error::new(io::ErrorKind::Other, "spill file is gone").into()),
    }
  }
}

impl TripleStore for SpilledTriples {
  fn push(&mut self, path: &str, word: &str, count: u64) -> Result<()> {
    match self.writer.as_mut() {
      Some(writer) => {
        writeln!(writer, "{}\t{}\t{}", path, word, count)?;
        self.len += 1;
        Ok(())
      },
      None => Err(io::Error::new(io::ErrorKind::Other, "spill file was already scanned").into()),
    }
  }

  fn len(&self) -> usize { self.len }

  fn scan(&mut self, visit: &mut dyn FnMut(&str, &str, u64)) -> Result<()> {
    let file = self.finish_writing()?;
    file.seek(SeekFrom::Start(0))?;
    let reader = BufReader::with_capacity(BUFFER_CAPACITY, &*file);
    for line in reader.lines() {
      let line = line?;
      let mut fields = line.splitn(3, '\t');
      if let (Some(path), Some(word), Some(count)) = (fields.next(), fields.next(), fields.next()) {
        match count.parse::<u64>() {
          Ok(count) => visit(path, word, count),
          Err(_) => warn!("skipping unreadable spilled triple {:?}", line),
        }
      }
    }
    Ok(())
  }
}

/// Keeps triples in memory until `threshold` is exceeded, then moves them all
/// to a spill file
pub struct AdaptiveTriples {
  threshold: Option<usize>,
  memory: InMemoryTriples,
  spilled: Option<SpilledTriples>,
}

impl AdaptiveTriples {
  /// A store that spills after `threshold` triples, never if `None`
  pub fn new(threshold: Option<usize>) -> Self {
    AdaptiveTriples {
      threshold,
      memory: InMemoryTriples::new(),
      spilled: None,
    }
  }

  /// whether the store moved to disk
  pub fn is_spilled(&self) -> bool { self.spilled.is_some() }

  fn spill(&mut self) -> Result<()> {
    let mut spilled = SpilledTriples::new()?;
    for (path, word, count) in self.memory.triples.drain(..) {
      spilled.push(&path, &word, count)?;
    }
    debug!("spilled {} triples to a temporary file", spilled.len());
    self.spilled = Some(spilled);
    Ok(())
  }
}

impl TripleStore for AdaptiveTriples {
  fn push(&mut self, path: &str, word: &str, count: u64) -> Result<()> {
    if let Some(spilled) = self.spilled.as_mut() {
      return spilled.push(path, word, count);
    }
    self.memory.push(path, word, count)?;
    match self.threshold {
      Some(threshold) if self.memory.len() > threshold => self.spill(),
      _ => Ok(()),
    }
  }

  fn len(&self) -> usize {
    match &self.spilled {
      Some(spilled) => spilled.len(),
      None => self.memory.len(),
    }
  }

  fn scan(&mut self, visit: &mut dyn FnMut(&str, &str, u64)) -> Result<()> {
    match self.spilled.as_mut() {
      Some(spilled) => spilled.scan(visit),
      None => self.memory.scan(visit),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn collect(store: &mut dyn TripleStore) -> Vec<SlotTriple> {
    let mut seen = Vec::new();
    store
      .scan(&mut |path: &str, word: &str, count: u64| seen.push((path.to_string(), word.to_string(), count)))
      .unwrap();
    seen
  }

  #[test]
  fn spilled_store_replays_in_order() {
    let mut store = SpilledTriples::new().unwrap();
    store.push("X chase Y", "dog", 3).unwrap();
    store.push("X eat Y", "cat", 1).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(
      collect(&mut store),
      vec![
        ("X chase Y".to_string(), "dog".to_string(), 3),
        ("X eat Y".to_string(), "cat".to_string(), 1)
      ]
    );
    assert!(store.push("X see Y", "owl", 1).is_err());
  }

  #[test]
  fn adaptive_store_spills_past_threshold() {
    let mut store = AdaptiveTriples::new(Some(2));
    store.push("a", "w1", 1).unwrap();
    store.push("b", "w2", 2).unwrap();
    assert!(!store.is_spilled());
    store.push("c", "w3", 3).unwrap();
    assert!(store.is_spilled());
    assert_eq!(store.len(), 3);
    let counts: Vec<u64> = collect(&mut store).into_iter().map(|t| t.2).collect();
    assert_eq!(counts, vec![1, 2, 3]);
  }
}
