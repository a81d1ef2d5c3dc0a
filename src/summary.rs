//! Snapshot of a dataset's facade for display.
//!
//! [`DatasetSummary`] captures every accessor once, so it can be rendered
//! as text in the terminal or serialized as JSON for programmatic use.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::dataset::Dataset;
use crate::model::{
    Agent, ChangeEntry, Distribution, License, ReleaseType, Rights, Source, Temporal,
};

/// Every facade value of a dataset.
#[derive(Clone, Debug, Serialize)]
pub struct DatasetSummary {
    pub url: String,
    pub supported: bool,
    pub origin: Option<&'static str>,
    pub host: Option<&'static str>,
    pub publishing_format: Option<&'static str>,
    pub identifier: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub documentation_url: Option<String>,
    pub release_type: Option<ReleaseType>,
    pub issued: Option<NaiveDate>,
    pub modified: Option<NaiveDate>,
    pub landing_page: Option<String>,
    pub temporal: Option<Temporal>,
    pub sources: Vec<Source>,
    pub time_sensitive: bool,
    pub maintainers: Vec<Agent>,
    pub publishers: Vec<Agent>,
    pub licenses: Vec<License>,
    pub rights: Option<Rights>,
    pub contributors: Vec<Agent>,
    pub language: Option<String>,
    pub theme: Option<String>,
    pub crowdsourced: bool,
    pub contributor_agreement_url: Option<String>,
    pub distributions: Vec<Distribution>,
    pub update_frequency: Option<String>,
    pub change_history: Vec<ChangeEntry>,
    pub spatial: Option<Value>,
}

impl DatasetSummary {
    /// Queries every accessor of `dataset`.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        Self {
            url: dataset.url().to_string(),
            supported: dataset.supported(),
            origin: dataset.origin().map(|origin| origin.name()),
            host: dataset.host().map(|host| host.name()),
            publishing_format: dataset.publishing_format().map(|format| format.name()),
            identifier: dataset.identifier().map(str::to_string),
            title: dataset.data_title(),
            description: dataset.description(),
            keywords: dataset.keywords(),
            documentation_url: dataset.documentation_url(),
            release_type: dataset.release_type(),
            issued: dataset.issued(),
            modified: dataset.modified(),
            landing_page: dataset.landing_page(),
            temporal: dataset.temporal(),
            sources: dataset.sources(),
            time_sensitive: dataset.time_sensitive(),
            maintainers: dataset.maintainers(),
            publishers: dataset.publishers(),
            licenses: dataset.licenses(),
            rights: dataset.rights(),
            contributors: dataset.contributors(),
            language: dataset.language(),
            theme: dataset.theme(),
            crowdsourced: dataset.crowdsourced(),
            contributor_agreement_url: dataset.contributor_agreement_url(),
            distributions: dataset.distributions(),
            update_frequency: dataset.update_frequency(),
            change_history: dataset.change_history(),
            spatial: dataset.spatial(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset: {}", self.url)?;
        writeln!(f)?;
        self.fmt_detection(f)?;

        if !self.supported {
            writeln!(f)?;
            writeln!(f, "No supported publishing format found.")?;
            return Ok(());
        }

        writeln!(f)?;
        self.fmt_description(f)?;
        if !self.licenses.is_empty() {
            writeln!(f)?;
            self.fmt_licenses(f)?;
        }
        if !self.distributions.is_empty() {
            writeln!(f)?;
            self.fmt_distributions(f)?;
        }
        Ok(())
    }
}

impl DatasetSummary {
    fn fmt_detection(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Supported:  {}", if self.supported { "yes" } else { "no" })?;
        writeln!(f, "  Origin:     {}", self.origin.unwrap_or("-"))?;
        writeln!(f, "  Host:       {}", self.host.unwrap_or("-"))?;
        writeln!(f, "  Format:     {}", self.publishing_format.unwrap_or("-"))
    }

    fn fmt_description(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_field(f, "Identifier", self.identifier.as_deref())?;
        write_field(f, "Title", self.title.as_deref())?;
        write_field(f, "Description", self.description.as_deref())?;
        if !self.keywords.is_empty() {
            writeln!(f, "  Keywords:     {}", self.keywords.join(", "))?;
        }
        write_field(f, "Landing page", self.landing_page.as_deref())?;
        write_field(
            f,
            "Issued",
            self.issued.map(|date| date.to_string()).as_deref(),
        )?;
        write_field(
            f,
            "Modified",
            self.modified.map(|date| date.to_string()).as_deref(),
        )?;
        let publishers: Vec<&str> = self
            .publishers
            .iter()
            .filter_map(|agent| agent.name.as_deref())
            .collect();
        if !publishers.is_empty() {
            writeln!(f, "  Publishers:   {}", publishers.join(", "))?;
        }
        Ok(())
    }

    fn fmt_licenses(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Licenses ({}):", self.licenses.len())?;
        for license in &self.licenses {
            let label = license
                .name
                .as_deref()
                .or(license.id.as_deref())
                .unwrap_or("<unnamed>");
            match license.uri.as_deref() {
                Some(uri) => writeln!(f, "  - {label} <{uri}>")?,
                None => writeln!(f, "  - {label}")?,
            }
        }
        Ok(())
    }

    fn fmt_distributions(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Distributions ({}):", self.distributions.len())?;
        for distribution in &self.distributions {
            let title = distribution.title.as_deref().unwrap_or("<untitled>");
            let location = distribution
                .download_url
                .as_deref()
                .or(distribution.path.as_deref())
                .unwrap_or("-");
            match distribution.format.as_deref() {
                Some(format) => writeln!(f, "  - {title} [{format}] {location}")?,
                None => writeln!(f, "  - {title} {location}")?,
            }
        }
        Ok(())
    }
}

fn write_field(f: &mut fmt::Formatter<'_>, label: &str, value: Option<&str>) -> fmt::Result {
    match value {
        Some(value) => writeln!(f, "  {:<13} {}", format!("{label}:"), value),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fetcher::StaticFetcher;

    #[test]
    fn unsupported_summary_says_so() {
        let dataset = Dataset::with_fetcher("https://example.org/", Arc::new(StaticFetcher::new()));
        let summary = DatasetSummary::from_dataset(&dataset);
        let text = summary.to_string();

        assert!(!summary.supported);
        assert!(text.contains("Supported:  no"));
        assert!(text.contains("No supported publishing format found."));
    }

    #[test]
    fn supported_summary_lists_licenses_and_files() {
        let url = "https://example.org/pkg/datapackage.json";
        let fetcher = StaticFetcher::new().with_body(
            url,
            r#"{"name": "example", "title": "Example",
                "licenses": [{"name": "CC0"}],
                "resources": [{"name": "rows", "path": "rows.csv", "format": "csv"}]}"#,
        );
        let dataset = Dataset::with_fetcher(url, Arc::new(fetcher));
        let summary = DatasetSummary::from_dataset(&dataset);
        let text = summary.to_string();

        assert!(text.contains("Format:     datapackage"));
        assert!(text.contains("Title:        Example"));
        assert!(text.contains("  - CC0"));
        assert!(text.contains("rows [csv] https://example.org/pkg/rows.csv"));

        let json: Value =
            serde_json::from_str(&summary.to_json_string().expect("json")).expect("parse");
        assert_eq!(json["publishing_format"], "datapackage");
        assert_eq!(json["release_type"], "one_off");
        assert_eq!(json["keywords"], serde_json::json!([]));
    }
}
