//! # DIRT in Rust
//! Discovery of Inference Rules from Text.
//! Extracts dependency paths connecting two noun slots through a verb,
//! aggregates corpus-wide slot filler statistics, weighs them by pointwise
//! mutual information and scores the similarity of path pairs.

#![deny(
  missing_docs,
  trivial_casts,
  trivial_numeric_casts,
  unused_import_braces,
  unused_qualifications
)]

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

pub mod counts;
pub mod error;
pub mod fragment;
pub mod mi;
pub mod paths;
pub mod pipeline;
pub mod similarity;
pub mod stemmer;
pub mod store;
pub mod util;

pub use crate::error::{DirtError, Result};
