// file: src/pipeline/processor.rs
// description: converts a raw pulse batch into render-ready cards and geolocation work
// reference: classifies, extracts and formats pulses for display

use crate::classifier::{CategoryClassifier, SeverityTier};
use crate::extractor::IndicatorExtractor;
use crate::models::{Pulse, PulseCard};
use crate::utils::time::format_display_or_raw;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PulseView {
    pub cards: Vec<PulseCard>,
    /// IPs found in the displayed pulses' indicator prefixes, in card order.
    pub ips: Vec<String>,
    /// The full batch as received, kept for export.
    pub pulses: Vec<Pulse>,
}

pub struct PulseProcessor {
    display_limit: usize,
    classifier: CategoryClassifier,
    extractor: IndicatorExtractor,
}

impl PulseProcessor {
    pub fn new(display_limit: usize, indicator_prefix: usize) -> Self {
        Self {
            display_limit,
            classifier: CategoryClassifier::default(),
            extractor: IndicatorExtractor::new(indicator_prefix),
        }
    }

    pub fn process(&self, pulses: Vec<Pulse>) -> PulseView {
        let mut cards = Vec::new();
        let mut ips = Vec::new();

        for pulse in pulses.iter().take(self.display_limit) {
            let extracted = self.extractor.extract(pulse);
            ips.extend(extracted.ips);

            let severity = SeverityTier::from_optional_pulse_severity(pulse.severity);
            let category = self.classifier.classify(&pulse.tags);

            cards.push(PulseCard {
                id: pulse.id.clone(),
                title: pulse.name.clone(),
                updated: format_display_or_raw(&pulse.modified),
                severity_label: severity.label().to_string(),
                severity_class: severity.tier_class().to_string(),
                category_label: category.display_label(),
                iocs: extracted.iocs.iter().map(|ioc| ioc.display_line()).collect(),
                tags: pulse.tags.clone(),
                url: pulse.otx_url(),
            });
        }

        debug!(
            "Built {} pulse cards from {} pulses, {} IPs queued for geolocation",
            cards.len(),
            pulses.len(),
            ips.len()
        );

        PulseView { cards, ips, pulses }
    }
}

impl Default for PulseProcessor {
    fn default() -> Self {
        Self::new(15, 5)
    }
}
