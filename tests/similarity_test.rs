use dirt::pipeline::{Pipeline, PipelineOutput, PipelineParameters};
use dirt::similarity::eval::{self, LabeledPair};
use dirt::similarity::{normalize_predicate, path_similarity, FeatureIndex};
use dirt::stemmer::{LowercaseStemmer, PorterStemmer};
use dirt::util::test::mini_corpus;

fn lowercase_run() -> PipelineOutput {
  Pipeline::new(PipelineParameters::default(), LowercaseStemmer)
    .run(&mini_corpus())
    .unwrap()
}

#[test]
fn paths_sharing_fillers_are_similar() {
  let index = lowercase_run().feature_index(None);
  let chases_hunts = index.similarity("X chases Y", "X hunts Y");
  assert!((chases_hunts - 1.0).abs() < 1e-9, "got {}", chases_hunts);
  assert_eq!(chases_hunts, index.similarity("X hunts Y", "X chases Y"));
  assert_eq!(index.similarity("X chases Y", "X eats Y"), 0.0);
  assert_eq!(index.similarity("X chases Y", "X flies Y"), 0.0);
}

#[test]
fn similarity_is_symmetric_over_all_paths() {
  let index = lowercase_run().feature_index(None);
  let paths: Vec<&String> = index.map.keys().collect();
  for p in &paths {
    for q in &paths {
      let forward = path_similarity(&index.map[*p], &index.map[*q]);
      let backward = path_similarity(&index.map[*q], &index.map[*p]);
      assert_eq!(forward, backward, "{} / {}", p, q);
      assert!(forward >= 0.0 && forward <= 1.0 + 1e-12);
    }
  }
}

#[test]
fn restricted_index_keeps_only_needed_paths() {
  let output = lowercase_run();
  let needed = vec!["X chases Y".to_string(), "X unknown Y".to_string()]
    .into_iter()
    .collect();
  let index = output.feature_index(Some(&needed));
  assert_eq!(index.len(), 1);
  assert!(index.get("X chases Y").is_some());
}

#[test]
fn nearest_neighbours_rank_by_similarity() {
  let index = lowercase_run().feature_index(None);
  let neighbours = index.neighbours("X chases Y");
  assert_eq!(neighbours.len(), 1);
  assert_eq!(neighbours[0].0, "X hunts Y");
  assert!(index.most_similar("X chases Y", 0, 0.0).is_empty());
  assert!(index.neighbours("X unknown Y").is_empty());
}

#[test]
fn evaluation_pairs_match_extracted_keys() {
  let stemmer = PorterStemmer::new();
  let output = Pipeline::new(PipelineParameters::default(), PorterStemmer::new())
    .run(&mini_corpus())
    .unwrap();
  assert_eq!(normalize_predicate("X chased   Y", &stemmer), "X chase Y");

  let positives = eval::read_pairs("X chased Y\tX hunted Y\n".as_bytes(), "pos", &stemmer).unwrap();
  let negatives = eval::read_pairs("X chases Y\tX eats Y\n".as_bytes(), "neg", &stemmer).unwrap();
  let mut pairs = positives;
  pairs.extend(negatives);
  let needed = eval::needed_paths(&pairs);
  let index = FeatureIndex::from_entries(output.mi.clone(), Some(&needed));
  assert_eq!(index.len(), 3);

  let scored = eval::score_pairs(&index, pairs);
  assert_eq!(
    scored[0].pair,
    LabeledPair {
      label: "pos".to_string(),
      p1: "X chase Y".to_string(),
      p2: "X hunt Y".to_string(),
    }
  );
  assert!((scored[0].score - 1.0).abs() < 1e-9);
  assert_eq!(scored[1].score, 0.0);

  let mut out = Vec::new();
  eval::write_scores(&mut out, &scored).unwrap();
  let text = String::from_utf8(out).unwrap();
  let lines: Vec<&str> = text.lines().collect();
  assert_eq!(lines.len(), 3);
  assert_eq!(lines[0], "label\tp1\tp2\tscore");
  assert!(lines[1].starts_with("pos\tX chase Y\tX hunt Y\t"));
  assert_eq!(lines[2], "neg\tX chase Y\tX eat Y\t0");
}

#[test]
fn labeled_pairs_carry_their_label() {
  let input = "pos\tX Chases Y\tX hunts Y\nneg\tX chases Y\n";
  let pairs = eval::read_labeled_pairs(input.as_bytes(), &LowercaseStemmer).unwrap();
  assert_eq!(pairs.len(), 1);
  assert_eq!(pairs[0].label, "pos");
  assert_eq!(pairs[0].p1, "X chases Y");
}
