//! The end-to-end DIRT run over a corpus of fragments:
//! extraction and counting in parallel over fragments, the total barrier,
//! then MI in parallel over slots.
use rayon::iter::{IntoParallelRefIterator, ParallelBridge, ParallelIterator};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;

use crate::counts::{CountTable, GlobalTotal, TotalBarrier};
use crate::error::Result;
use crate::fragment::DependencyFragment;
use crate::mi::{self, MiEntry, MiParameters};
use crate::paths::{ExtractionParameters, PathExtractor};
use crate::similarity::FeatureIndex;
use crate::stemmer::Stem;

/// Parameters of a whole run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParameters {
  /// path extraction setup
  pub extraction: ExtractionParameters,
  /// MI stage setup
  pub mi: MiParameters,
}

impl PipelineParameters {
  /// Loads parameters from JSON, absent fields keep their defaults
  pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> { Ok(serde_json::from_reader(reader)?) }
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
  /// the four count families
  pub counts: CountTable,
  /// the global triple total
  pub total: GlobalTotal,
  /// positive MI entries, sorted by path, slot and word
  pub mi: Vec<MiEntry>,
}

impl PipelineOutput {
  /// The similarity index over the computed MI table, optionally restricted
  /// to the `needed` paths
  pub fn feature_index(&self, needed: Option<&HashSet<String>>) -> FeatureIndex {
    FeatureIndex::from_entries(self.mi.iter().cloned(), needed)
  }
}

/// A configured DIRT run
pub struct Pipeline<S: Stem> {
  /// the path extractor, with its stemmer
  pub extractor: PathExtractor<S>,
  /// MI stage setup
  pub mi_parameters: MiParameters,
}

impl<S: Stem> Pipeline<S> {
  /// Creates a run from parameters and a stemmer
  pub fn new(parameters: PipelineParameters, stemmer: S) -> Self {
    Pipeline {
      extractor: PathExtractor::new(parameters.extraction, stemmer),
      mi_parameters: parameters.mi,
    }
  }

  fn count_fragment(&self, fragment: &DependencyFragment) -> CountTable {
    CountTable::from_instances(self.extractor.extract(fragment))
  }

  /// Extracts and counts all fragments in parallel
  pub fn count(&self, fragments: &[DependencyFragment]) -> CountTable {
    let counts = fragments
      .par_iter()
      .map(|fragment| self.count_fragment(fragment))
      .reduce(CountTable::new, CountTable::merge);
    info!("counted {} fragments into {} keys", fragments.len(), counts.len());
    counts
  }

  /// Extracts and counts a fragment stream, bridged onto the rayon pool
  pub fn count_stream<I>(&self, fragments: I) -> CountTable
  where
    I: Iterator<Item = DependencyFragment> + Send,
  {
    let counts = fragments
      .par_bridge()
      .map(|fragment| self.count_fragment(&fragment))
      .reduce(CountTable::new, CountTable::merge);
    info!("counted a fragment stream into {} keys", counts.len());
    counts
  }

  /// The MI stage over finished counts. The total is taken from the barrier,
  /// which fails when it was never published.
  pub fn estimate(&self, counts: &CountTable, barrier: &TotalBarrier) -> Result<Vec<MiEntry>> {
    let total = barrier.try_get()?;
    mi::compute_table_mi(counts, total, &self.mi_parameters)
  }

  /// Runs all stages over `fragments`
  pub fn run(&self, fragments: &[DependencyFragment]) -> Result<PipelineOutput> {
    let counts = self.count(fragments);
    self.finish(counts)
  }

  /// Runs all stages over a fragment stream
  pub fn run_stream<I>(&self, fragments: I) -> Result<PipelineOutput>
  where
    I: Iterator<Item = DependencyFragment> + Send,
  {
    let counts = self.count_stream(fragments);
    self.finish(counts)
  }

  fn finish(&self, counts: CountTable) -> Result<PipelineOutput> {
    let barrier = TotalBarrier::new();
    let total = barrier.publish(counts.triple_total())?;
    let mi = self.estimate(&counts, &barrier)?;
    Ok(PipelineOutput { counts, total, mi })
  }
}
