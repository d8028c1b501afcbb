//! Pluggable stemming.
//!
//! The same stemmer must be used when path keys are extracted and when
//! free-text predicates are normalized for lookup, or lookups silently miss.
use rust_stemmers::{Algorithm, Stemmer};

/// Reduces a word to its stem. Implementations always lowercase.
pub trait Stem: Send + Sync {
  /// stem a single word
  fn stem(&self, word: &str) -> String;
}

/// Lowercasing only, for tests and for corpora that are pre-lemmatized
#[derive(Debug, Clone, Copy, Default)]
pub struct LowercaseStemmer;

impl Stem for LowercaseStemmer {
  fn stem(&self, word: &str) -> String { word.to_lowercase() }
}

/// English Porter stemmer
pub struct PorterStemmer {
  inner: Stemmer,
}

impl Default for PorterStemmer {
  fn default() -> PorterStemmer {
    PorterStemmer {
      inner: Stemmer::create(Algorithm::English),
    }
  }
}

impl PorterStemmer {
  /// Creates a new English stemmer
  pub fn new() -> Self { PorterStemmer::default() }
}

impl Stem for PorterStemmer {
  fn stem(&self, word: &str) -> String {
    let lower = word.to_lowercase();
    self.inner.stem(&lower).into_owned()
  }
}

impl<S: Stem + ?Sized> Stem for &S {
  fn stem(&self, word: &str) -> String { (**self).stem(word) }
}

impl<S: Stem + ?Sized> Stem for Box<S> {
  fn stem(&self, word: &str) -> String { (**self).stem(word) }
}
