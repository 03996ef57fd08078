// file: src/models/ioc.rs
// description: typed indicator of compromise derived from a pulse indicator
// reference: otx indicator type vocabulary

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IocType {
    Ipv4,
    Ipv6,
    Domain,
    Hostname,
    Url,
    Hash,
    Email,
    Cve,
    Other,
}

impl IocType {
    /// Maps an OTX indicator type string (`IPv4`, `FileHash-SHA256`, ...) to a type.
    pub fn from_indicator_type(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        match lower.as_str() {
            "ipv4" => IocType::Ipv4,
            "ipv6" => IocType::Ipv6,
            "domain" => IocType::Domain,
            "hostname" => IocType::Hostname,
            "url" | "uri" => IocType::Url,
            "email" => IocType::Email,
            "cve" => IocType::Cve,
            _ if lower.starts_with("filehash") => IocType::Hash,
            _ => IocType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IocType::Ipv4 => "ipv4",
            IocType::Ipv6 => "ipv6",
            IocType::Domain => "domain",
            IocType::Hostname => "hostname",
            IocType::Url => "url",
            IocType::Hash => "hash",
            IocType::Email => "email",
            IocType::Cve => "cve",
            IocType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ioc {
    pub ioc_type: IocType,
    /// Upstream type string, kept verbatim for display.
    pub type_label: String,
    pub value: String,
    /// First IPv4-shaped substring of `value`, if any.
    pub embedded_ip: Option<String>,
}

impl Ioc {
    pub fn new(type_label: &str, value: &str, embedded_ip: Option<String>) -> Self {
        Self {
            ioc_type: IocType::from_indicator_type(type_label),
            type_label: type_label.to_string(),
            value: value.to_string(),
            embedded_ip,
        }
    }

    pub fn display_line(&self) -> String {
        format!("{}: {}", self.type_label, self.value)
    }
}
