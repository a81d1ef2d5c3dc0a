//! The dataset facade.
//!
//! A [`Dataset`] is created from a URL. Construction runs origin, host and
//! publishing-format detection exactly once, in that order, and the result
//! is a ready value whose accessors never fail: whatever cannot be
//! determined comes back as `None`, `false` or an empty `Vec`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use datakitten::fetcher::StaticFetcher;
//! use datakitten::{Dataset, DatasetOptions, Origin};
//!
//! let fetcher = Arc::new(StaticFetcher::new().with_body(
//!     "https://example.org/data/datapackage.json",
//!     r#"{"name": "example", "licenses": [{"name": "CC0"}]}"#,
//! ));
//! let dataset = Dataset::with_fetcher(
//!     DatasetOptions::new("https://example.org/data/datapackage.json"),
//!     fetcher,
//! );
//!
//! assert!(dataset.supported());
//! assert_eq!(dataset.origin(), Some(Origin::Web));
//! assert_eq!(dataset.identifier(), Some("example"));
//! ```

use std::cell::OnceCell;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::fetcher::{Fetcher, HttpFetcher, Resource};
use crate::format::{
    detect_publishing_format, DetectionContext, MetadataAdapter, PublishingFormat, Unsupported,
};
use crate::host::{detect_host, Host, HostEnrichment};
use crate::model::{
    Agent, ChangeEntry, Distribution, License, ReleaseType, Rights, Source, Temporal,
};
use crate::origin::{detect_origin, Origin};

/// How to locate a dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DatasetOptions {
    /// URL giving access to the dataset.
    pub access_url: String,
    /// Base for resolving relative references. Defaults to the root of the
    /// access URL.
    pub base_url: Option<String>,
}

impl DatasetOptions {
    pub fn new(access_url: impl Into<String>) -> Self {
        Self {
            access_url: access_url.into(),
            base_url: None,
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl From<&str> for DatasetOptions {
    fn from(access_url: &str) -> Self {
        Self::new(access_url)
    }
}

impl From<String> for DatasetOptions {
    fn from(access_url: String) -> Self {
        Self::new(access_url)
    }
}

/// A dataset identified by URL, with its detected origin, host and
/// publishing format.
pub struct Dataset {
    access_url: Resource,
    base_url: Option<url::Url>,
    origin: Option<Origin>,
    host: Option<Host>,
    publishing_format: Option<PublishingFormat>,
    adapter: Box<dyn MetadataAdapter>,
    enrichment: Option<Box<dyn HostEnrichment>>,
    identifier: Option<String>,
    metadata: Option<Value>,
    source: OnceCell<Option<Value>>,
}

impl Dataset {
    /// Loads a dataset over HTTP with default fetch options.
    pub fn new(options: impl Into<DatasetOptions>) -> Self {
        Self::with_fetcher(options, Arc::new(HttpFetcher::default()))
    }

    /// Loads a dataset using `fetcher` for all retrieval.
    pub fn with_fetcher(options: impl Into<DatasetOptions>, fetcher: Arc<dyn Fetcher>) -> Self {
        let options = options.into();
        let access_url = Resource::new(options.access_url, fetcher.clone());
        let base_url = options
            .base_url
            .as_deref()
            .and_then(|base| url::Url::parse(base).ok());

        let origin = detect_origin(&access_url);
        let detected_host = detect_host(origin, access_url.url());
        let enrichment = detected_host
            .as_ref()
            .and_then(|(host, repo)| host.enrichment(repo, fetcher.clone()));

        let detected = detect_publishing_format(&DetectionContext {
            origin,
            host: detected_host.as_ref().map(|(host, repo)| (*host, repo)),
            resource: &access_url,
        });

        let (publishing_format, metadata, adapter): (_, _, Box<dyn MetadataAdapter>) =
            match detected {
                Some(detected) => (
                    Some(detected.format),
                    Some(detected.metadata),
                    detected.adapter,
                ),
                None => (None, None, Box::new(Unsupported)),
            };
        let identifier = adapter.identifier();

        debug!(
            url = access_url.url(),
            origin = ?origin,
            host = ?detected_host.as_ref().map(|(host, _)| *host),
            format = ?publishing_format,
            "dataset ready"
        );

        Self {
            access_url,
            base_url,
            origin,
            host: detected_host.map(|(host, _)| host),
            publishing_format,
            adapter,
            enrichment,
            identifier,
            metadata,
            source: OnceCell::new(),
        }
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    /// The access URL, parsed. `None` if it is not a valid absolute URL.
    pub fn uri(&self) -> Option<url::Url> {
        self.access_url.parsed_url()
    }

    /// The explicit base URL, or the root of the access URL.
    pub fn base_uri(&self) -> Option<url::Url> {
        if let Some(base) = &self.base_url {
            return Some(base.clone());
        }
        self.uri().and_then(|uri| uri.join("/").ok())
    }

    /// The access URL exactly as given.
    pub fn url(&self) -> &str {
        self.access_url.url()
    }

    /// The JSON document served at the access URL.
    ///
    /// Fetched at most once; `None` if the fetch failed or the body is not
    /// JSON.
    pub fn source(&self) -> Option<&Value> {
        self.source
            .get_or_init(|| self.access_url.as_json())
            .as_ref()
    }

    /// Replaces the cached source document.
    pub fn set_source(&mut self, source: Option<Value>) {
        self.source = OnceCell::from(source);
    }

    // ------------------------------------------------------------------
    // Detection results
    // ------------------------------------------------------------------

    /// True when both an origin and a publishing format were detected.
    pub fn supported(&self) -> bool {
        self.origin.is_some() && self.publishing_format.is_some()
    }

    pub fn origin(&self) -> Option<Origin> {
        self.origin
    }

    pub fn host(&self) -> Option<Host> {
        self.host
    }

    pub fn publishing_format(&self) -> Option<PublishingFormat> {
        self.publishing_format
    }

    /// The raw descriptor of the detected publishing format.
    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    pub fn set_metadata(&mut self, metadata: Option<Value>) {
        self.metadata = metadata;
    }

    /// A unique identifier, initially taken from the descriptor.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn set_identifier(&mut self, identifier: Option<String>) {
        self.identifier = identifier;
    }

    // ------------------------------------------------------------------
    // Descriptive metadata
    // ------------------------------------------------------------------

    /// Human-readable title.
    pub fn data_title(&self) -> Option<String> {
        self.adapter
            .data_title()
            .or_else(|| self.enrichment.as_ref().and_then(|host| host.title()))
    }

    pub fn description(&self) -> Option<String> {
        self.adapter
            .description()
            .or_else(|| self.enrichment.as_ref().and_then(|host| host.description()))
    }

    pub fn keywords(&self) -> Vec<String> {
        let keywords = self.adapter.keywords();
        if !keywords.is_empty() {
            return keywords;
        }
        self.enrichment
            .as_ref()
            .map(|host| host.keywords())
            .unwrap_or_default()
    }

    /// URL of human-readable documentation.
    pub fn documentation_url(&self) -> Option<String> {
        self.adapter.documentation_url()
    }

    /// Whether the data is an API or a set of downloads.
    pub fn release_type(&self) -> Option<ReleaseType> {
        self.adapter.release_type()
    }

    /// Release date.
    pub fn issued(&self) -> Option<NaiveDate> {
        self.adapter.issued()
    }

    /// Alias of [`Dataset::issued`].
    pub fn release_date(&self) -> Option<NaiveDate> {
        self.issued()
    }

    /// Date of the last modification.
    pub fn modified(&self) -> Option<NaiveDate> {
        self.adapter.modified()
    }

    /// A web page giving access to the dataset and further information.
    pub fn landing_page(&self) -> Option<String> {
        self.adapter
            .landing_page()
            .or_else(|| self.enrichment.as_ref().and_then(|host| host.landing_page()))
    }

    pub fn temporal(&self) -> Option<Temporal> {
        self.adapter.temporal()
    }

    pub fn sources(&self) -> Vec<Source> {
        self.adapter.sources()
    }

    /// Whether the information goes out of date.
    pub fn time_sensitive(&self) -> bool {
        self.adapter.time_sensitive()
    }

    pub fn maintainers(&self) -> Vec<Agent> {
        self.adapter.maintainers()
    }

    pub fn publishers(&self) -> Vec<Agent> {
        self.adapter.publishers()
    }

    pub fn licenses(&self) -> Vec<License> {
        self.adapter.licenses()
    }

    pub fn rights(&self) -> Option<Rights> {
        self.adapter.rights()
    }

    pub fn contributors(&self) -> Vec<Agent> {
        self.adapter.contributors()
    }

    pub fn language(&self) -> Option<String> {
        self.adapter.language()
    }

    /// The main category of the dataset.
    pub fn theme(&self) -> Option<String> {
        self.adapter.theme()
    }

    pub fn crowdsourced(&self) -> bool {
        self.adapter.crowdsourced()
    }

    pub fn contributor_agreement_url(&self) -> Option<String> {
        self.adapter.contributor_agreement_url()
    }

    /// Files and endpoints making up the dataset.
    pub fn distributions(&self) -> Vec<Distribution> {
        self.adapter.distributions()
    }

    /// Alias of [`Dataset::distributions`].
    pub fn files(&self) -> Vec<Distribution> {
        self.distributions()
    }

    /// Alias of [`Dataset::distributions`].
    pub fn resources(&self) -> Vec<Distribution> {
        self.distributions()
    }

    /// Update frequency, expressed as a `dct:Frequency` label.
    pub fn update_frequency(&self) -> Option<String> {
        self.adapter.update_frequency()
    }

    /// Changes to the dataset. The format's history wins; otherwise the
    /// host's (e.g. the commit log).
    pub fn change_history(&self) -> Vec<ChangeEntry> {
        let history = self.adapter.change_history();
        if !history.is_empty() {
            return history;
        }
        self.enrichment
            .as_ref()
            .map(|host| host.change_history())
            .unwrap_or_default()
    }

    /// Spatial coverage as a GeoJSON geometry.
    pub fn spatial(&self) -> Option<Value> {
        self.adapter.spatial()
    }
}

impl From<&str> for Dataset {
    fn from(access_url: &str) -> Self {
        Self::new(access_url)
    }
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("url", &self.url())
            .field("origin", &self.origin)
            .field("host", &self.host)
            .field("publishing_format", &self.publishing_format)
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}
