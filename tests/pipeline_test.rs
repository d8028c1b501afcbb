use dirt::counts::CountTable;
use dirt::pipeline::{Pipeline, PipelineParameters};
use dirt::stemmer::LowercaseStemmer;
use dirt::util::test::mini_corpus;
use dirt::DirtError;

#[test]
fn parameters_load_from_json() {
  let json = r#"{"extraction": {"max_path_length": 3}, "mi": {"spill_threshold": 2}}"#;
  let parameters = PipelineParameters::from_json_reader(json.as_bytes()).unwrap();
  assert_eq!(parameters.extraction.max_path_length, Some(3));
  assert_eq!(parameters.mi.spill_threshold, Some(2));
  assert_eq!(parameters.mi.min_mi, 0.0);
  assert!(parameters.extraction.is_verb("VBZ"));

  assert!(matches!(
    PipelineParameters::from_json_reader("{not json".as_bytes()),
    Err(DirtError::Config(_))
  ));
}

#[test]
fn length_limit_drops_long_paths() {
  let json = r#"{"extraction": {"max_path_length": 3}}"#;
  let parameters = PipelineParameters::from_json_reader(json.as_bytes()).unwrap();
  let output = Pipeline::new(parameters, LowercaseStemmer).run(&mini_corpus()).unwrap();
  assert!(output.mi.iter().all(|e| e.path != "X gave to Y" && e.path != "X to gave Y"));
  assert!(output.counts.path_slot("X gave Y", dirt::paths::Slot::X) > 0);
  assert_eq!(output.total.get(), 60);
}

#[test]
fn streamed_and_sliced_runs_agree() {
  let _ = env_logger::builder().is_test(true).try_init();
  let pipeline = Pipeline::new(PipelineParameters::default(), LowercaseStemmer);
  let sliced = pipeline.run(&mini_corpus()).unwrap();
  let streamed = pipeline.run_stream(mini_corpus().into_iter()).unwrap();
  assert_eq!(sliced.counts, streamed.counts);
  assert_eq!(sliced.total, streamed.total);
  assert_eq!(sliced.mi, streamed.mi);
}

#[test]
fn reruns_are_deterministic() {
  let pipeline = Pipeline::new(PipelineParameters::default(), LowercaseStemmer);
  let first = pipeline.run(&mini_corpus()).unwrap();
  for _ in 0..3 {
    let again = pipeline.run(&mini_corpus()).unwrap();
    assert_eq!(again.mi, first.mi);
  }
  let recount = CountTable::from_records(first.counts.records());
  assert_eq!(recount, first.counts);
}
