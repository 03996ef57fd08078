// file: src/classifier/category.rs
// description: ordered first-match-wins tag classification into threat categories
// reference: configurable keyword-based classification

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThreatCategory {
    Phishing,
    Ransomware,
    Malware,
    Apt,
    Uncategorized,
}

impl ThreatCategory {
    pub fn name(&self) -> &'static str {
        match self {
            ThreatCategory::Phishing => "Phishing",
            ThreatCategory::Ransomware => "Ransomware",
            ThreatCategory::Malware => "Malware",
            ThreatCategory::Apt => "APT",
            ThreatCategory::Uncategorized => "Uncategorized",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            ThreatCategory::Phishing => "🎣",
            ThreatCategory::Ransomware => "💰",
            ThreatCategory::Malware => "🦠",
            ThreatCategory::Apt => "🎭",
            ThreatCategory::Uncategorized => "❓",
        }
    }

    /// Label for on-screen cards, glyph first.
    pub fn display_label(&self) -> String {
        format!("{} {}", self.glyph(), self.name())
    }
}

impl fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct CategoryRule {
    pub pattern: Regex,
    pub category: ThreatCategory,
}

impl CategoryRule {
    pub fn new(pattern: &str, category: ThreatCategory) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            category,
        })
    }
}

lazy_static! {
    static ref DEFAULT_RULES: Vec<(Regex, ThreatCategory)> = vec![
        (
            Regex::new(r"(?i)phish|spoof").expect("phishing rule is valid"),
            ThreatCategory::Phishing,
        ),
        (
            Regex::new(r"(?i)ransom").expect("ransomware rule is valid"),
            ThreatCategory::Ransomware,
        ),
        (
            Regex::new(r"(?i)malware|trojan|worm").expect("malware rule is valid"),
            ThreatCategory::Malware,
        ),
        (
            Regex::new(r"(?i)apt|group").expect("apt rule is valid"),
            ThreatCategory::Apt,
        ),
    ];
}

/// Rules are tried in order against every tag; the first rule that matches
/// any tag decides the category.
pub struct CategoryClassifier {
    rules: Vec<CategoryRule>,
}

impl CategoryClassifier {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    pub fn classify<S: AsRef<str>>(&self, tags: &[S]) -> ThreatCategory {
        for rule in &self.rules {
            if tags.iter().any(|tag| rule.pattern.is_match(tag.as_ref())) {
                return rule.category;
            }
        }

        ThreatCategory::Uncategorized
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(pattern, category)| CategoryRule {
                pattern: pattern.clone(),
                category: *category,
            })
            .collect();
        Self::new(rules)
    }
}
