//! Dependency fragments: short parsed sentence excerpts with head pointers,
//! navigable as a forest through parent and ancestor lookups.

/// A single parsed token of a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  /// 1-based position in the fragment
  pub index: usize,
  /// surface form
  pub word: String,
  /// Penn Treebank tag
  pub pos: String,
  /// 1-based index of the head token, 0 for the root
  pub head: usize,
}

impl Token {
  /// Creates a new token
  pub fn new(index: usize, word: &str, pos: &str, head: usize) -> Self {
    Token {
      index,
      word: word.to_string(),
      pos: pos.to_string(),
      head,
    }
  }
}

/// A parsed fragment together with its corpus occurrence count
#[derive(Debug, Clone)]
pub struct DependencyFragment {
  /// the tokens, in sentence order
  pub tokens: Vec<Token>,
  /// `parent[i]` is the head of token `i` (1-based), 0 for roots;
  /// slot 0 is unused
  parent: Vec<usize>,
  /// how often this fragment occurs in the corpus
  pub count: u64,
}

impl DependencyFragment {
  /// Builds the fragment from its tokens. Tokens are put in sentence order
  /// by their `index`, then renumbered `1..=N` by position. Head indices
  /// outside `[0, N]` are coerced to 0, so that the fragment is always a
  /// valid forest of parent pointers.
  pub fn new(mut tokens: Vec<Token>, count: u64) -> Self {
    tokens.sort_by_key(|token| token.index);
    let n = tokens.len();
    let mut parent = vec![0; n + 1];
    for (position, token) in tokens.iter_mut().enumerate() {
      token.index = position + 1;
      parent[position + 1] = if token.head <= n { token.head } else { 0 };
    }
    DependencyFragment {
      tokens,
      parent,
      count,
    }
  }

  /// Convenience constructor from `(word, pos, head)` triples
  pub fn from_triples(triples: &[(&str, &str, usize)], count: u64) -> Self {
    let tokens = triples
      .iter()
      .enumerate()
      .map(|(position, (word, pos, head))| Token::new(position + 1, word, pos, *head))
      .collect();
    DependencyFragment::new(tokens, count)
  }

  /// number of tokens
  pub fn len(&self) -> usize { self.tokens.len() }

  /// true if there are no tokens
  pub fn is_empty(&self) -> bool { self.tokens.is_empty() }

  /// The token at 1-based `index`
  pub fn token(&self, index: usize) -> Option<&Token> {
    if index == 0 {
      None
    } else {
      self.tokens.get(index - 1)
    }
  }

  /// The head of token `index`, `None` for roots and out of range indices
  pub fn parent(&self, index: usize) -> Option<usize> {
    match self.parent.get(index) {
      Some(&0) | None => None,
      Some(&head) => Some(head),
    }
  }

  /// The chain `index, parent(index), ...` up to its root.
  /// Stops early on a cycle, so inconsistent heads never loop forever.
  pub fn ancestors(&self, index: usize) -> Vec<usize> {
    let mut chain = Vec::new();
    if index == 0 || index > self.len() {
      return chain;
    }
    let mut seen = vec![false; self.len() + 1];
    let mut current = index;
    while current != 0 && !seen[current] {
      seen[current] = true;
      chain.push(current);
      current = self.parent[current];
    }
    chain
  }

  /// Least common ancestor of `a` and `b`: the first index on `a`'s ancestor
  /// chain that also lies on `b`'s chain. `None` if they sit in different trees.
  pub fn lca(&self, a: usize, b: usize) -> Option<usize> {
    let b_chain = self.ancestors(b);
    self
      .ancestors(a)
      .into_iter()
      .find(|index| b_chain.contains(index))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn out_of_range_heads_become_roots() {
    let fragment = DependencyFragment::from_triples(&[("a", "DT", 7), ("b", "NN", 1)], 1);
    assert_eq!(fragment.parent(1), None);
    assert_eq!(fragment.parent(2), Some(1));
    assert_eq!(fragment.ancestors(2), vec![2, 1]);
  }

  #[test]
  fn tokens_are_ordered_by_index() {
    let fragment = DependencyFragment::new(
      vec![
        Token::new(3, "cat", "NN", 2),
        Token::new(1, "dog", "NN", 2),
        Token::new(2, "chases", "VBZ", 0),
      ],
      1,
    );
    let words: Vec<&str> = fragment.tokens.iter().map(|t| t.word.as_str()).collect();
    assert_eq!(words, vec!["dog", "chases", "cat"]);
    assert_eq!(fragment.token(3).map(|t| t.index), Some(3));
    assert_eq!(fragment.parent(1), Some(2));
    assert_eq!(fragment.lca(1, 3), Some(2));
  }

  #[test]
  fn cycles_terminate() {
    let fragment = DependencyFragment::from_triples(&[("a", "NN", 2), ("b", "NN", 1)], 1);
    assert_eq!(fragment.ancestors(1), vec![1, 2]);
    assert_eq!(fragment.lca(1, 2), Some(1));
  }

  #[test]
  fn disjoint_trees_have_no_lca() {
    let fragment = DependencyFragment::from_triples(&[("a", "NN", 0), ("b", "NN", 0)], 1);
    assert_eq!(fragment.lca(1, 2), None);
    assert_eq!(fragment.token(0), None);
    assert_eq!(fragment.token(2).map(|t| t.word.as_str()), Some("b"));
  }
}
