//! Dependency path extraction.
//!
//! A path connects two noun slot fillers through their least common ancestor,
//! which must be a non-auxiliary verb. Paths are rendered into canonical keys
//! such as `X chase Y` or `X give to Y`, with the endpoints replaced by slot
//! markers and every kept intermediate word stemmed.
mod parameters;
pub mod tags;

pub use self::parameters::ExtractionParameters;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::fragment::DependencyFragment;
use crate::stemmer::Stem;

/// The slot marker of the first endpoint
pub const X_MARKER: &str = "X";
/// The slot marker of the second endpoint
pub const Y_MARKER: &str = "Y";

/// One of the two noun endpoints of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
  /// the first-chosen endpoint
  X,
  /// the second endpoint
  Y,
}

impl Slot {
  /// Both slots, in canonical order
  pub const ALL: [Slot; 2] = [Slot::X, Slot::Y];

  /// The marker string of this slot
  pub fn as_str(self) -> &'static str {
    match self {
      Slot::X => X_MARKER,
      Slot::Y => Y_MARKER,
    }
  }
}

impl fmt::Display for Slot {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Slot {
  type Err = ();
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      X_MARKER => Ok(Slot::X),
      Y_MARKER => Ok(Slot::Y),
      _ => Err(()),
    }
  }
}

/// A slot filler observed with a path, `count` times
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathInstance {
  /// canonical path key
  pub path: String,
  /// the slot this instance fills
  pub slot: Slot,
  /// stemmed filler word
  pub filler: String,
  /// occurrence count of the source fragment
  pub count: u64,
}

/// Extracts path instances from dependency fragments
pub struct PathExtractor<S: Stem> {
  /// filtering configuration
  pub parameters: ExtractionParameters,
  /// stemmer applied to fillers and intermediate words
  pub stemmer: S,
}

impl<S: Stem> PathExtractor<S> {
  /// Creates an extractor with the given configuration and stemmer
  pub fn new(parameters: ExtractionParameters, stemmer: S) -> Self {
    PathExtractor { parameters, stemmer }
  }

  /// Indices of tokens that may fill a slot: nouns with some letter content
  pub fn candidates(&self, fragment: &DependencyFragment) -> Vec<usize> {
    fragment
      .tokens
      .iter()
      .enumerate()
      .filter(|(_, token)| self.parameters.is_noun(&token.pos) && tags::has_letter(&token.word))
      .map(|(position, _)| position + 1)
      .collect()
  }

  /// The admissible root joining `a` and `b`: their least common ancestor,
  /// if it is a verb and not an auxiliary
  pub fn predicate_root(&self, fragment: &DependencyFragment, a: usize, b: usize) -> Option<usize> {
    let root = fragment.lca(a, b)?;
    let token = fragment.token(root)?;
    if self.parameters.is_verb(&token.pos) && !self.parameters.is_auxiliary(&token.word) {
      Some(root)
    } else {
      None
    }
  }

  /// Node sequence from `from` to `to` through `root`:
  /// `from`'s ancestors up to and including `root`, then `to`'s ancestors
  /// below `root` in reverse order
  pub fn path_nodes(&self, fragment: &DependencyFragment, from: usize, to: usize, root: usize) -> Vec<usize> {
    let mut nodes = Vec::new();
    for index in fragment.ancestors(from) {
      nodes.push(index);
      if index == root {
        break;
      }
    }
    let descent: Vec<usize> = fragment
      .ancestors(to)
      .into_iter()
      .take_while(|&index| index != root)
      .collect();
    nodes.extend(descent.into_iter().rev());
    nodes
  }

  /// Renders a node sequence into a path key. `None` if the path carries
  /// no predicate or exceeds the length limit.
  pub fn render(&self, fragment: &DependencyFragment, nodes: &[usize]) -> Option<String> {
    if nodes.len() < 2 {
      return None;
    }
    if let Some(limit) = self.parameters.max_path_length {
      if nodes.len() > limit {
        return None;
      }
    }
    let last = nodes.len() - 1;
    let mut rendered: Vec<String> = Vec::with_capacity(nodes.len());
    for (position, &index) in nodes.iter().enumerate() {
      let word = if position == 0 {
        X_MARKER.to_string()
      } else if position == last {
        Y_MARKER.to_string()
      } else {
        let token = fragment.token(index)?;
        if !self.parameters.keeps_intermediate(&token.word, &token.pos) {
          continue;
        }
        self.stemmer.stem(&token.word)
      };
      if word.is_empty() || rendered.last() == Some(&word) {
        continue;
      }
      rendered.push(word);
    }

    let has_x = rendered.iter().any(|w| w == X_MARKER);
    let has_y = rendered.iter().any(|w| w == Y_MARKER);
    if !has_x || !has_y || rendered.len() == 2 {
      return None;
    }
    Some(rendered.join(" "))
  }

  /// All path instances of one fragment, each surviving direction of each
  /// candidate pair contributing an X and a Y instance
  pub fn extract(&self, fragment: &DependencyFragment) -> Vec<PathInstance> {
    let mut instances = Vec::new();
    if fragment.count == 0 || fragment.is_empty() {
      return instances;
    }
    let candidates = self.candidates(fragment);
    for (i, &a) in candidates.iter().enumerate() {
      for &b in &candidates[i + 1..] {
        let root = match self.predicate_root(fragment, a, b) {
          Some(root) => root,
          None => continue,
        };
        for &(from, to) in &[(a, b), (b, a)] {
          self.emit(fragment, from, to, root, &mut instances);
        }
      }
    }
    instances
  }

  fn emit(
    &self,
    fragment: &DependencyFragment,
    from: usize,
    to: usize,
    root: usize,
    instances: &mut Vec<PathInstance>,
  ) {
    let nodes = self.path_nodes(fragment, from, to, root);
    let key = match self.render(fragment, &nodes) {
      Some(key) => key,
      None => return,
    };
    let (x_token, y_token) = match (fragment.token(from), fragment.token(to)) {
      (Some(x), Some(y)) => (x, y),
      _ => return,
    };
    instances.push(PathInstance {
      path: key.clone(),
      slot: Slot::X,
      filler: self.stemmer.stem(&x_token.word),
      count: fragment.count,
    });
    instances.push(PathInstance {
      path: key,
      slot: Slot::Y,
      filler: self.stemmer.stem(&y_token.word),
      count: fragment.count,
    });
  }
}
