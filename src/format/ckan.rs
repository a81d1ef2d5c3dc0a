//! CKAN catalogue entries.
//!
//! A CKAN dataset page looks like `{site}/dataset/{id}`. Its metadata is
//! read from `{site}/api/3/action/package_show?id={id}`, which wraps the
//! package in `{"success": true, "result": {...}}`. Access URLs that
//! already point at `package_show` are read directly.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, trace};

use super::{
    size_field, str_field, DetectedFormat, DetectionContext, MetadataAdapter, PublishingFormat,
};
use crate::fetcher::fetch_json;
use crate::model::{parse_date, Agent, Distribution, License, ReleaseType, Temporal};
use crate::origin::Origin;

const PACKAGE_SHOW: &str = "api/3/action/package_show";

/// A CKAN package (the `result` member of a `package_show` response).
#[derive(Clone, Debug)]
pub struct CkanPackage {
    package: Value,
    page_url: Option<String>,
}

impl CkanPackage {
    /// Unwraps a `package_show` response. Returns `None` unless the API
    /// reported success and carried an object.
    pub fn from_response(response: &Value, page_url: Option<&str>) -> Option<Self> {
        if response.get("success").and_then(Value::as_bool) != Some(true) {
            return None;
        }
        let package = response.get("result").filter(|result| result.is_object())?;
        Some(Self {
            package: package.clone(),
            page_url: page_url.map(str::to_string),
        })
    }

    /// The raw package object.
    pub fn package(&self) -> &Value {
        &self.package
    }

    fn field(&self, key: &str) -> Option<String> {
        str_field(&self.package, key)
    }

    /// Looks up a key in the package's `extras` list, falling back to a
    /// top-level member of the same name.
    fn extra(&self, keys: &[&str]) -> Option<String> {
        let extras = self.package.get("extras").and_then(Value::as_array);
        keys.iter().find_map(|key| {
            extras
                .and_then(|extras| {
                    extras.iter().find_map(|extra| {
                        (extra.get("key").and_then(Value::as_str) == Some(*key))
                            .then(|| str_field(extra, "value"))
                            .flatten()
                    })
                })
                .or_else(|| self.field(key))
        })
    }

    fn resources(&self) -> &[Value] {
        self.package
            .get("resources")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn agent(&self, name_key: &str, email_key: &str) -> Option<Agent> {
        let agent = Agent {
            name: self.field(name_key),
            email: self.field(email_key),
            ..Default::default()
        };
        (!agent.is_empty()).then_some(agent)
    }
}

impl MetadataAdapter for CkanPackage {
    fn identifier(&self) -> Option<String> {
        self.field("name").or_else(|| self.field("id"))
    }

    fn data_title(&self) -> Option<String> {
        self.field("title")
    }

    fn description(&self) -> Option<String> {
        self.field("notes")
    }

    fn keywords(&self) -> Vec<String> {
        self.package
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(|tag| match tag {
                        Value::String(name) => Some(name.clone()),
                        other => str_field(other, "display_name")
                            .or_else(|| str_field(other, "name")),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn release_type(&self) -> Option<ReleaseType> {
        let resources = self.resources();
        if resources.is_empty() {
            return None;
        }
        let is_api = |resource: &Value| {
            ["format", "resource_type"].iter().any(|key| {
                str_field(resource, key)
                    .map(|value| value.eq_ignore_ascii_case("api"))
                    .unwrap_or(false)
            })
        };
        if resources.iter().any(is_api) {
            Some(ReleaseType::WebService)
        } else {
            Some(ReleaseType::OneOff)
        }
    }

    fn issued(&self) -> Option<NaiveDate> {
        self.field("metadata_created").as_deref().and_then(parse_date)
    }

    fn modified(&self) -> Option<NaiveDate> {
        self.field("metadata_modified")
            .as_deref()
            .and_then(parse_date)
    }

    fn landing_page(&self) -> Option<String> {
        self.field("url").or_else(|| self.page_url.clone())
    }

    fn temporal(&self) -> Option<Temporal> {
        Temporal {
            start: self
                .extra(&["temporal_coverage_from", "temporal_coverage-from", "temporal_start"])
                .as_deref()
                .and_then(parse_date),
            end: self
                .extra(&["temporal_coverage_to", "temporal_coverage-to", "temporal_end"])
                .as_deref()
                .and_then(parse_date),
        }
        .non_empty()
    }

    fn maintainers(&self) -> Vec<Agent> {
        self.agent("maintainer", "maintainer_email")
            .into_iter()
            .collect()
    }

    fn publishers(&self) -> Vec<Agent> {
        if let Some(author) = self.agent("author", "author_email") {
            return vec![author];
        }
        self.package
            .get("organization")
            .and_then(|organization| {
                str_field(organization, "title").or_else(|| str_field(organization, "name"))
            })
            .map(|name| vec![Agent::named(name)])
            .unwrap_or_default()
    }

    fn licenses(&self) -> Vec<License> {
        let license = License {
            id: self.field("license_id"),
            name: self.field("license_title"),
            uri: self.field("license_url"),
            abbr: self.field("license_id"),
        };
        if license.id.is_none() && license.name.is_none() && license.uri.is_none() {
            Vec::new()
        } else {
            vec![license]
        }
    }

    fn language(&self) -> Option<String> {
        self.extra(&["language"])
    }

    fn theme(&self) -> Option<String> {
        self.extra(&["theme", "theme-primary"])
    }

    fn distributions(&self) -> Vec<Distribution> {
        self.resources()
            .iter()
            .map(|resource| Distribution {
                title: str_field(resource, "name"),
                description: str_field(resource, "description"),
                access_url: str_field(resource, "url"),
                download_url: str_field(resource, "url"),
                path: None,
                format: str_field(resource, "format"),
                media_type: str_field(resource, "mimetype"),
                byte_size: size_field(resource.get("size")),
                encoding: None,
                issued: str_field(resource, "created")
                    .as_deref()
                    .and_then(parse_date),
                modified: str_field(resource, "last_modified")
                    .as_deref()
                    .and_then(parse_date),
                schema: None,
            })
            .collect()
    }

    fn update_frequency(&self) -> Option<String> {
        self.extra(&["frequency", "update_frequency"])
    }

    fn spatial(&self) -> Option<Value> {
        match self.package.get("spatial") {
            Some(value) if value.is_object() => return Some(value.clone()),
            _ => {}
        }
        self.extra(&["spatial"])
            .and_then(|text| serde_json::from_str::<Value>(&text).ok())
            .filter(Value::is_object)
    }
}

/// Where a CKAN dataset's `package_show` document lives.
pub fn package_show_url(access_url: &url::Url) -> Option<String> {
    if access_url.path().ends_with(PACKAGE_SHOW) {
        return access_url
            .query_pairs()
            .any(|(key, _)| key == "id")
            .then(|| access_url.to_string());
    }

    let segments: Vec<&str> = access_url
        .path_segments()
        .map(|iter| iter.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();
    let position = segments.iter().rposition(|seg| *seg == "dataset")?;
    // Path segments stay percent-encoded; the query encoder escapes again.
    let id = urlencoding::decode(segments.get(position + 1)?).ok()?;

    let mut api = access_url.clone();
    let prefix: String = segments[..position]
        .iter()
        .map(|seg| format!("/{seg}"))
        .collect();
    api.set_path(&format!("{prefix}/{PACKAGE_SHOW}"));
    api.set_fragment(None);
    api.query_pairs_mut().clear().append_pair("id", &id);
    Some(api.to_string())
}

/// Fetches and unwraps the CKAN package for a web origin.
pub fn detect(context: &DetectionContext<'_>) -> Option<DetectedFormat> {
    if context.origin != Some(Origin::Web) {
        return None;
    }
    let access_url = context.resource.parsed_url()?;
    let api_url = package_show_url(&access_url)?;
    trace!(url = %api_url, "ckan candidate");

    let response = if api_url == context.resource.url() {
        context.resource.as_json()
    } else {
        fetch_json(context.resource.fetcher().as_ref(), &api_url)
    }?;

    let page_url = (api_url != context.resource.url()).then(|| context.resource.url());
    let Some(package) = CkanPackage::from_response(&response, page_url) else {
        debug!(url = %api_url, "not a successful package_show response");
        return None;
    };

    Some(DetectedFormat {
        format: PublishingFormat::Ckan,
        metadata: package.package().clone(),
        adapter: Box::new(package),
    })
}
