// file: src/models/cards.rs
// description: flat, pre-formatted display records handed to the rendering layer
// reference: render-ready view models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseCard {
    pub id: String,
    pub title: String,
    pub updated: String,
    pub severity_label: String,
    pub severity_class: String,
    pub category_label: String,
    pub iocs: Vec<String>,
    pub tags: Vec<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CveCard {
    pub id: String,
    pub score: f64,
    pub severity_label: String,
    pub severity_class: String,
    pub description: String,
    pub short_description: String,
    pub expanded: bool,
    pub published: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsCard {
    pub title: String,
    pub published: String,
    pub description: String,
    pub link: String,
}

impl CveCard {
    pub fn is_truncated(&self) -> bool {
        self.short_description != self.description
    }

    pub fn displayed_description(&self) -> &str {
        if self.expanded {
            &self.description
        } else {
            &self.short_description
        }
    }

    /// Flips between the short and full description. No-op when nothing was cut.
    pub fn toggle(&mut self) {
        if self.is_truncated() {
            self.expanded = !self.expanded;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(description: &str, short: &str) -> CveCard {
        CveCard {
            id: "CVE-2024-0001".to_string(),
            score: 9.8,
            severity_label: "Critical".to_string(),
            severity_class: "critical".to_string(),
            description: description.to_string(),
            short_description: short.to_string(),
            expanded: false,
            published: "2024-03-01".to_string(),
            url: "https://nvd.nist.gov/vuln/detail/CVE-2024-0001".to_string(),
        }
    }

    #[test]
    fn test_toggle_recovers_full_text() {
        let mut card = card("a long description", "a long...");
        assert_eq!(card.displayed_description(), "a long...");

        card.toggle();
        assert_eq!(card.displayed_description(), "a long description");

        card.toggle();
        assert_eq!(card.displayed_description(), "a long...");
    }

    #[test]
    fn test_toggle_noop_when_not_truncated() {
        let mut card = card("short", "short");
        card.toggle();
        assert!(!card.expanded);
        assert_eq!(card.displayed_description(), "short");
    }
}
