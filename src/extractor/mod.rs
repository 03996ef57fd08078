// file: src/extractor/mod.rs
// description: indicator extraction module exports
// reference: internal module structure

pub mod indicator;
pub mod patterns;

pub use indicator::{ExtractedIndicators, IndicatorExtractor};
