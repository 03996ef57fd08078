// file: src/exporter/mod.rs
// description: export module exports
// reference: internal module structure

pub mod csv;

pub use self::csv::{CsvExporter, EXPORT_HEADER, ExportManifest, ExportRow};
