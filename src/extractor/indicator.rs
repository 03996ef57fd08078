// file: src/extractor/indicator.rs
// description: bounded typed-ioc extraction from pulse indicators with embedded ipv4 discovery
// reference: threat intelligence ioc standards

use crate::extractor::patterns::find_ipv4;
use crate::models::{Indicator, Ioc, Pulse};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedIndicators {
    pub iocs: Vec<Ioc>,
    /// One entry per indicator that carries an IPv4-shaped substring, in order.
    pub ips: Vec<String>,
}

pub struct IndicatorExtractor {
    prefix: usize,
}

impl IndicatorExtractor {
    pub fn new(prefix: usize) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> usize {
        self.prefix
    }

    pub fn extract(&self, pulse: &Pulse) -> ExtractedIndicators {
        self.extract_from(&pulse.indicators)
    }

    pub fn extract_from(&self, indicators: &[Indicator]) -> ExtractedIndicators {
        let mut extracted = ExtractedIndicators::default();

        for indicator in indicators.iter().take(self.prefix) {
            let embedded_ip = find_ipv4(&indicator.value).map(str::to_string);
            if let Some(ip) = &embedded_ip {
                extracted.ips.push(ip.clone());
            }
            extracted
                .iocs
                .push(Ioc::new(&indicator.indicator_type, &indicator.value, embedded_ip));
        }

        extracted
    }
}

impl Default for IndicatorExtractor {
    fn default() -> Self {
        Self::new(5)
    }
}
