//! The `paths::parameters` submodule configures which tokens may fill slots,
//! root a path, or appear inside it

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::tags;

/// Parameters for path extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionParameters {
  /// POS tags of admissible slot fillers
  pub noun_tags: HashSet<String>,
  /// POS tags of admissible path roots. Verb intermediates are kept as well.
  pub verb_tags: HashSet<String>,
  /// POS tags, besides verbs, of intermediate words kept in the path key
  pub intermediate_tags: HashSet<String>,
  /// Lowercased surface forms that never root a path and are dropped
  /// as intermediates
  pub auxiliaries: HashSet<String>,
  /// Maximum number of tree nodes on a path, endpoints included.
  /// `None` places no limit.
  pub max_path_length: Option<usize>,
}

fn owned_set(words: &[&str]) -> HashSet<String> { words.iter().map(|w| w.to_string()).collect() }

impl Default for ExtractionParameters {
  /// The classic DIRT setup over Penn Treebank tags, without a length limit
  fn default() -> ExtractionParameters {
    ExtractionParameters {
      noun_tags: owned_set(&tags::NOUN_TAGS),
      verb_tags: owned_set(&tags::VERB_TAGS),
      intermediate_tags: owned_set(&tags::INTERMEDIATE_TAGS),
      auxiliaries: owned_set(&tags::AUXILIARIES),
      max_path_length: None,
    }
  }
}

impl ExtractionParameters {
  /// The classic setup with paths capped at six nodes, sparser paths are
  /// rarely informative
  pub fn bounded() -> ExtractionParameters {
    ExtractionParameters {
      max_path_length: Some(6),
      ..ExtractionParameters::default()
    }
  }

  /// tag of a slot filler?
  pub fn is_noun(&self, pos: &str) -> bool { self.noun_tags.contains(pos) }

  /// tag of a path root?
  pub fn is_verb(&self, pos: &str) -> bool { self.verb_tags.contains(pos) }

  /// auxiliary, modal or contraction, compared case-insensitively
  pub fn is_auxiliary(&self, word: &str) -> bool {
    self.auxiliaries.contains(&word.to_lowercase())
  }

  /// Whether an intermediate token with this tag and surface form stays in the path
  pub fn keeps_intermediate(&self, word: &str, pos: &str) -> bool {
    let by_tag = if self.is_verb(pos) {
      !self.is_auxiliary(word)
    } else {
      self.intermediate_tags.contains(pos)
    };
    by_tag && tags::has_letter(word)
  }
}
