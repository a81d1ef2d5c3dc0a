//! Value objects returned by the dataset facade.
//!
//! Every field is optional. The publishing formats behind them populate
//! different subsets.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How the data is made available.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseType {
    /// Accessible through an API.
    WebService,
    /// Downloadable data dumps.
    OneOff,
}

/// A person or organisation attached to the dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,

    /// Role as declared by the descriptor (e.g. "author", "publisher").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Agent {
    /// Creates an agent with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Sets the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// True when the agent carries no information at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.homepage.is_none()
    }
}

/// A license the dataset is released under.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    /// Short identifier, e.g. "CC0" or "odc-by".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// URL of the license text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbr: Option<String>,
}

impl License {
    /// Creates a license from an identifier.
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            abbr: Some(id.clone()),
            id: Some(id),
            ..Default::default()
        }
    }

    /// True if the identifier, name or abbreviation equals `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        [&self.id, &self.name, &self.abbr]
            .into_iter()
            .flatten()
            .any(|value| value == needle)
    }
}

/// Rights statement for the dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rights {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright_notice: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution_text: Option<String>,
}

/// Where (part of) the data comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Temporal coverage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Temporal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl Temporal {
    /// Returns `None` when neither bound is known.
    pub fn non_empty(self) -> Option<Self> {
        if self.start.is_none() && self.end.is_none() {
            None
        } else {
            Some(self)
        }
    }
}

/// One accessible file or endpoint of the dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Page or endpoint giving access to the data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,

    /// Direct download location, resolved to an absolute URL when possible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,

    /// Path as written in the descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<NaiveDate>,

    /// Table schema or similar, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

/// One entry of the dataset's change history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Timestamp as reported by the source (usually RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Parses the date part of an ISO 8601 date or date-time.
///
/// Accepts `2014-03-01`, RFC 3339 date-times and the naive
/// `2014-03-01T10:00:00.123` form CKAN emits.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(datetime.date_naive());
    }
    trimmed
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}
