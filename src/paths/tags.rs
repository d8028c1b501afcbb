//! Default tag categories and word lists for path extraction
use regex::Regex;

lazy_static! {
  static ref HAS_LETTER: Regex = Regex::new(r"\p{Alphabetic}").unwrap();
}

/// Penn Treebank noun tags, the admissible slot fillers
pub const NOUN_TAGS: [&str; 4] = ["NN", "NNS", "NNP", "NNPS"];

/// Penn Treebank verb tags, the admissible path roots
pub const VERB_TAGS: [&str; 6] = ["VB", "VBD", "VBG", "VBN", "VBP", "VBZ"];

/// Tags besides verbs whose words are kept inside a path:
/// adjectives, adverbs, prepositions and particles
pub const INTERMEDIATE_TAGS: [&str; 9] = ["JJ", "JJR", "JJS", "RB", "RBR", "RBS", "IN", "TO", "RP"];

/// Auxiliaries, modals and contracted forms that never head a predicate
pub const AUXILIARIES: [&str; 34] = [
  "be", "am", "is", "are", "was", "were", "been", "being", "do", "does", "did",
  "have", "has", "had", "having", "can", "could", "will", "would", "shall", "should", "may",
  "might", "must", "'s", "'re", "'m", "'ve", "'d", "'ll", "ca", "wo", "sha", "ai",
];

/// Whether the surface form carries at least one letter, rejecting pure
/// punctuation and number tokens
pub fn has_letter(word: &str) -> bool { HAS_LETTER.is_match(word) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn letter_content() {
    assert!(has_letter("dog"));
    assert!(has_letter("3d"));
    assert!(has_letter("café"));
    assert!(!has_letter("1999"));
    assert!(!has_letter("--"));
    assert!(!has_letter(""));
  }
}
