// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod cards;
pub mod geo;
pub mod ioc;
pub mod news;
pub mod pulse;
pub mod vulnerability;

pub use cards::{CveCard, NewsCard, PulseCard};
pub use geo::{GeoPoint, Marker};
pub use ioc::{Ioc, IocType};
pub use news::{FeedBatch, NewsItem, Rss2JsonResponse};
pub use pulse::{Indicator, Pulse, PulseResponse};
pub use vulnerability::{CvssData, CvssMetric, CveDescription, CveMetrics, NvdResponse, Vulnerability};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

/// Treats an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes a JSON array element by element, dropping entries that do not fit
/// `T`. A missing, `null` or non-array value reads as empty.
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(lenient_items(Option::<Value>::deserialize(deserializer)?).unwrap_or_default())
}

/// Like [`lenient_vec`], but keeps the difference between an absent key and
/// an empty array.
pub(crate) fn lenient_opt_vec<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(lenient_items(Option::<Value>::deserialize(deserializer)?))
}

fn lenient_items<T: DeserializeOwned>(value: Option<Value>) -> Option<Vec<T>> {
    match value? {
        Value::Array(entries) => Some(
            entries
                .into_iter()
                .filter_map(|entry| match serde_json::from_value(entry) {
                    Ok(item) => Some(item),
                    Err(e) => {
                        debug!("Skipping malformed entry: {}", e);
                        None
                    }
                })
                .collect(),
        ),
        Value::Null => None,
        other => {
            debug!("Expected an array, found {}", other);
            None
        }
    }
}
