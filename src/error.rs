// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AggregatorError>;

#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error from {source_name}: {message}")]
    Transport {
        source_name: String,
        message: String,
    },

    #[error("Malformed payload from {source_name}: {message}")]
    Payload {
        source_name: String,
        message: String,
    },

    #[error("Geolocation failed for {ip}: {message}")]
    Geolocation { ip: String, message: String },

    #[error("Export error: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AggregatorError {
    pub fn transport(source_name: &str, message: impl ToString) -> Self {
        Self::Transport {
            source_name: source_name.to_string(),
            message: message.to_string(),
        }
    }

    pub fn payload(source_name: &str, message: impl ToString) -> Self {
        Self::Payload {
            source_name: source_name.to_string(),
            message: message.to_string(),
        }
    }

    pub fn geolocation(ip: &str, message: impl ToString) -> Self {
        Self::Geolocation {
            ip: ip.to_string(),
            message: message.to_string(),
        }
    }
}

impl From<csv::Error> for AggregatorError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<serde_json::Error> for AggregatorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
