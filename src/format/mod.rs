//! Publishing formats: the metadata conventions a dataset can use.
//!
//! Each format knows where its descriptor lives for a given origin and
//! host, how to fetch it and how to map it onto the facade through
//! [`MetadataAdapter`]. Formats are tried in [`PublishingFormat::ALL`]
//! order and the first one that parses wins.

pub mod ckan;
pub mod datapackage;

use std::fmt;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

pub use ckan::CkanPackage;
pub use datapackage::Datapackage;

use crate::fetcher::Resource;
use crate::host::{Host, RepoRef};
use crate::model::{
    Agent, ChangeEntry, Distribution, License, ReleaseType, Rights, Source, Temporal,
};
use crate::origin::Origin;

/// A metadata convention used to describe a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PublishingFormat {
    /// Frictionless Data package descriptor (`datapackage.json`).
    Datapackage,
    /// CKAN catalogue entry, read through the action API.
    Ckan,
}

impl PublishingFormat {
    /// All formats in detection priority order.
    pub const ALL: [PublishingFormat; 2] = [PublishingFormat::Datapackage, PublishingFormat::Ckan];

    /// Stable lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            PublishingFormat::Datapackage => "datapackage",
            PublishingFormat::Ckan => "ckan",
        }
    }

    /// Attempts to locate and parse this format's descriptor.
    pub fn detect(&self, context: &DetectionContext<'_>) -> Option<DetectedFormat> {
        match self {
            PublishingFormat::Datapackage => datapackage::detect(context),
            PublishingFormat::Ckan => ckan::detect(context),
        }
    }
}

impl fmt::Display for PublishingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything format detection may look at.
pub struct DetectionContext<'a> {
    pub origin: Option<Origin>,
    pub host: Option<(Host, &'a RepoRef)>,
    pub resource: &'a Resource,
}

/// The outcome of a successful format detection.
pub struct DetectedFormat {
    pub format: PublishingFormat,
    /// The raw descriptor as parsed.
    pub metadata: Value,
    pub adapter: Box<dyn MetadataAdapter>,
}

impl fmt::Debug for DetectedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectedFormat")
            .field("format", &self.format)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Runs format detection in priority order. Requires a known origin.
pub fn detect_publishing_format(context: &DetectionContext<'_>) -> Option<DetectedFormat> {
    context.origin?;
    let detected = PublishingFormat::ALL
        .into_iter()
        .find_map(|format| format.detect(context));
    debug!(
        url = context.resource.url(),
        format = ?detected.as_ref().map(|detected| detected.format),
        "publishing format detection"
    );
    detected
}

/// Field values a publishing format can supply.
///
/// Every method defaults to the empty value for its type, so an adapter
/// only overrides what its descriptor actually carries.
pub trait MetadataAdapter {
    fn identifier(&self) -> Option<String> {
        None
    }

    fn data_title(&self) -> Option<String> {
        None
    }

    fn description(&self) -> Option<String> {
        None
    }

    fn keywords(&self) -> Vec<String> {
        Vec::new()
    }

    fn documentation_url(&self) -> Option<String> {
        None
    }

    fn release_type(&self) -> Option<ReleaseType> {
        None
    }

    fn issued(&self) -> Option<NaiveDate> {
        None
    }

    fn modified(&self) -> Option<NaiveDate> {
        None
    }

    fn landing_page(&self) -> Option<String> {
        None
    }

    fn temporal(&self) -> Option<Temporal> {
        None
    }

    fn sources(&self) -> Vec<Source> {
        Vec::new()
    }

    fn time_sensitive(&self) -> bool {
        false
    }

    fn maintainers(&self) -> Vec<Agent> {
        Vec::new()
    }

    fn publishers(&self) -> Vec<Agent> {
        Vec::new()
    }

    fn licenses(&self) -> Vec<License> {
        Vec::new()
    }

    fn rights(&self) -> Option<Rights> {
        None
    }

    fn contributors(&self) -> Vec<Agent> {
        Vec::new()
    }

    fn language(&self) -> Option<String> {
        None
    }

    fn theme(&self) -> Option<String> {
        None
    }

    fn crowdsourced(&self) -> bool {
        false
    }

    fn contributor_agreement_url(&self) -> Option<String> {
        None
    }

    fn distributions(&self) -> Vec<Distribution> {
        Vec::new()
    }

    fn update_frequency(&self) -> Option<String> {
        None
    }

    fn change_history(&self) -> Vec<ChangeEntry> {
        Vec::new()
    }

    fn spatial(&self) -> Option<Value> {
        None
    }
}

/// Adapter used when no format was detected. Supplies only defaults.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unsupported;

impl MetadataAdapter for Unsupported {}

/// Trimmed, non-empty string value of `key`.
pub(crate) fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Byte sizes show up as numbers or numeric strings.
pub(crate) fn size_field(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_adapter_returns_defaults() {
        let adapter = Unsupported;
        assert_eq!(adapter.data_title(), None);
        assert_eq!(adapter.release_type(), None);
        assert!(adapter.keywords().is_empty());
        assert!(adapter.distributions().is_empty());
        assert!(!adapter.time_sensitive());
        assert!(!adapter.crowdsourced());
        assert_eq!(adapter.spatial(), None);
    }

    #[test]
    fn size_field_accepts_numbers_and_strings() {
        let json = serde_json::json!({"a": 12, "b": " 34 ", "c": "big", "d": -1});
        assert_eq!(size_field(json.get("a")), Some(12));
        assert_eq!(size_field(json.get("b")), Some(34));
        assert_eq!(size_field(json.get("c")), None);
        assert_eq!(size_field(json.get("d")), None);
        assert_eq!(size_field(json.get("missing")), None);
    }

    #[test]
    fn format_names_are_stable() {
        assert_eq!(PublishingFormat::Datapackage.to_string(), "datapackage");
        assert_eq!(PublishingFormat::Ckan.name(), "ckan");
    }
}
