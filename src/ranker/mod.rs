// file: src/ranker/mod.rs
// description: vulnerability ranking module exports
// reference: internal module structure

pub mod cve;

pub use cve::{CveRanker, CveRanking, RankedCve, TimeWindow};
