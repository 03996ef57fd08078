// file: src/classifier/mod.rs
// description: severity and category classification exports
// reference: internal module structure

pub mod category;
pub mod severity;

pub use category::{CategoryClassifier, ThreatCategory};
pub use severity::SeverityTier;
