// file: src/exporter/csv.rs
// description: rfc 4180 csv export of the current pulse set
// reference: https://docs.rs/csv

use crate::classifier::{CategoryClassifier, SeverityTier};
use crate::error::{AggregatorError, Result};
use crate::models::Pulse;
use crate::utils::text::strip_glyphs;
use chrono::{NaiveDate, Utc};
use csv::{QuoteStyle, WriterBuilder};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

pub const EXPORT_HEADER: [&str; 7] = [
    "Title",
    "Date",
    "Severity",
    "Category",
    "Indicators",
    "Tags",
    "URL",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub title: String,
    pub date: String,
    pub severity: String,
    pub category: String,
    pub indicators: String,
    pub tags: String,
    pub url: String,
}

impl ExportRow {
    fn as_record(&self) -> [&str; 7] {
        [
            self.title.as_str(),
            self.date.as_str(),
            self.severity.as_str(),
            self.category.as_str(),
            self.indicators.as_str(),
            self.tags.as_str(),
            self.url.as_str(),
        ]
    }
}

#[derive(Debug, Serialize)]
pub struct ExportManifest {
    pub exported_at: String,
    pub path: PathBuf,
    pub total_rows: usize,
}

pub struct CsvExporter {
    output_dir: PathBuf,
    file_prefix: String,
    max_pulses: usize,
    max_indicators: usize,
    classifier: CategoryClassifier,
}

impl CsvExporter {
    pub fn new(output_dir: impl Into<PathBuf>, file_prefix: &str) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: file_prefix.to_string(),
            max_pulses: 20,
            max_indicators: 5,
            classifier: CategoryClassifier::default(),
        }
    }

    pub fn with_limits(mut self, max_pulses: usize, max_indicators: usize) -> Self {
        self.max_pulses = max_pulses;
        self.max_indicators = max_indicators;
        self
    }

    pub fn file_name(&self, date: NaiveDate) -> String {
        format!("{}_{}.csv", self.file_prefix, date.format("%Y-%m-%d"))
    }

    pub fn row(&self, pulse: &Pulse) -> ExportRow {
        let indicators = pulse
            .indicators
            .iter()
            .take(self.max_indicators)
            .map(|i| i.value.as_str())
            .collect::<Vec<_>>()
            .join(" | ");
        let date = pulse
            .created_at()
            .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| pulse.created.clone());
        let severity = SeverityTier::from_optional_pulse_severity(pulse.severity);
        let category = self.classifier.classify(&pulse.tags);

        ExportRow {
            title: pulse.name.clone(),
            date,
            severity: severity.label().to_string(),
            category: strip_glyphs(&category.display_label()),
            indicators,
            tags: pulse.tags.join(", "),
            url: pulse.otx_url(),
        }
    }

    pub fn rows(&self, pulses: &[Pulse]) -> Vec<ExportRow> {
        pulses
            .iter()
            .take(self.max_pulses)
            .map(|pulse| self.row(pulse))
            .collect()
    }

    pub fn write_rows<W: Write>(&self, writer: W, rows: &[ExportRow]) -> Result<()> {
        let mut csv_writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_writer(writer);

        csv_writer.write_record(EXPORT_HEADER)?;
        for row in rows {
            csv_writer.write_record(row.as_record())?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self, pulses: &[Pulse]) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_rows(&mut buffer, &self.rows(pulses))?;
        String::from_utf8(buffer).map_err(|e| AggregatorError::Export(e.to_string()))
    }

    pub fn export(&self, pulses: &[Pulse], date: NaiveDate) -> Result<ExportManifest> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(self.file_name(date));
        info!("Starting CSV export to {:?}", path);

        let rows = self.rows(pulses);
        let file = fs::File::create(&path)?;
        self.write_rows(file, &rows)?;

        let manifest = ExportManifest {
            exported_at: Utc::now().to_rfc3339(),
            path,
            total_rows: rows.len(),
        };

        info!("Export complete: {} pulses exported", manifest.total_rows);
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Indicator;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn pulse(name: &str, tags: &[&str]) -> Pulse {
        Pulse {
            id: "abc123".to_string(),
            name: name.to_string(),
            created: "2024-03-01T12:30:00.000000".to_string(),
            severity: Some(2),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            indicators: (0..8)
                .map(|i| Indicator::new("IPv4", &format!("1.1.1.{}", i)))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_row_fields() {
        let exporter = CsvExporter::new("./unused", "threat_intel_feed");
        let row = exporter.row(&pulse("LockBit", &["ransomware-group", "lockbit"]));

        assert_eq!(
            row,
            ExportRow {
                title: "LockBit".to_string(),
                date: "2024-03-01 12:30:00".to_string(),
                severity: "High".to_string(),
                category: "Ransomware".to_string(),
                indicators: "1.1.1.0 | 1.1.1.1 | 1.1.1.2 | 1.1.1.3 | 1.1.1.4".to_string(),
                tags: "ransomware-group, lockbit".to_string(),
                url: "https://otx.alienvault.com/pulse/abc123".to_string(),
            }
        );
    }

    #[test]
    fn test_every_field_quoted() {
        let exporter = CsvExporter::new("./unused", "threat_intel_feed");
        let csv = exporter.to_csv_string(&[pulse("plain", &[])]).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            r#""Title","Date","Severity","Category","Indicators","Tags","URL""#
        );
        assert!(lines.next().unwrap().starts_with(r#""plain","2024-03-01 12:30:00","High","Uncategorized""#));
    }

    #[test]
    fn test_round_trip_with_hostile_text() {
        let exporter = CsvExporter::new("./unused", "threat_intel_feed");
        let title = "Campaign \"Ghost\", stage 2\nsecond line";
        let pulses = vec![pulse(title, &["phishing"]), pulse("other", &["worm"])];
        let csv = exporter.to_csv_string(&pulses).unwrap();

        let mut reader = ::csv::Reader::from_reader(csv.as_bytes());
        let records: Vec<::csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][0], title);
        assert_eq!(&records[0][1], "2024-03-01 12:30:00");
        assert_eq!(&records[0][2], "High");
        assert_eq!(&records[0][3], "Phishing");
        assert_eq!(&records[1][3], "Malware");
    }

    #[test]
    fn test_export_cap_and_file_name() {
        let dir = tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path(), "threat_intel_feed");
        let pulses: Vec<Pulse> = (0..25).map(|i| pulse(&format!("p{}", i), &[])).collect();
        let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();

        let manifest = exporter.export(&pulses, date).unwrap();
        assert_eq!(manifest.total_rows, 20);
        assert_eq!(
            manifest.path.file_name().unwrap().to_str().unwrap(),
            "threat_intel_feed_2024-03-02.csv"
        );

        let written = std::fs::read_to_string(&manifest.path).unwrap();
        assert_eq!(::csv::Reader::from_reader(written.as_bytes()).records().count(), 20);
    }
}
