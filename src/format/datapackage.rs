//! Frictionless Data package descriptors.
//!
//! A data package is described by a `datapackage.json` (or `.yaml`) file
//! at the root of the package. For git repositories on a known forge the
//! descriptor is read through the forge's raw-content URL; for web origins
//! it is either the access URL itself or `datapackage.json` next to it.
//!
//! Both the current Frictionless vocabulary (`licenses`, `contributors`)
//! and the older one (`license`, `author`, `maintainers`) are understood.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, trace};

use super::{size_field, DetectedFormat, DetectionContext, MetadataAdapter, PublishingFormat};
use crate::error::DataKittenError;
use crate::model::{
    parse_date, Agent, Distribution, License, ReleaseType, Rights, Source, Temporal,
};
use crate::origin::Origin;

/// Descriptor file names, in lookup order.
pub const DESCRIPTOR_FILES: [&str; 2] = ["datapackage.json", "datapackage.yaml"];

// ============================================================================
// Descriptor schema (internal to this module)
// ============================================================================

// Fields outside `name` are read leniently: a value of the wrong type is
// dropped on its own and the rest of the descriptor still counts.
#[derive(Debug, Default, Deserialize)]
struct Descriptor {
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    homepage: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    version: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    created: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    last_modified: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    modified: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    keywords: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_list")]
    licenses: Option<Vec<LicenseEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    license: Option<LicenseEntry>,
    #[serde(default, deserialize_with = "lenient_list")]
    maintainers: Option<Vec<AgentEntry>>,
    #[serde(default, deserialize_with = "lenient_list")]
    publishers: Option<Vec<AgentEntry>>,
    #[serde(default, deserialize_with = "lenient_list")]
    contributors: Option<Vec<AgentEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    author: Option<AgentEntry>,
    #[serde(default, deserialize_with = "lenient_list")]
    sources: Option<Vec<SourceEntry>>,
    #[serde(default, deserialize_with = "lenient_list")]
    resources: Option<Vec<ResourceEntry>>,
    #[serde(default, deserialize_with = "lenient")]
    temporal: Option<TemporalEntry>,
    spatial: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    language: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    theme: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    update_frequency: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    rights: Option<Rights>,
}

/// Reads a field, mapping a value of the wrong shape to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Reads a list, keeping the entries that have the expected shape.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| T::deserialize(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

/// Licenses appear as a bare identifier or as an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LicenseEntry {
    Text(String),
    Object {
        name: Option<String>,
        id: Option<String>,
        #[serde(rename = "type")]
        kind: Option<String>,
        title: Option<String>,
        path: Option<String>,
        url: Option<String>,
    },
}

/// Agents appear as `"Name <email> (url)"` strings or as objects.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AgentEntry {
    Text(String),
    Object {
        name: Option<String>,
        title: Option<String>,
        email: Option<String>,
        path: Option<String>,
        web: Option<String>,
        url: Option<String>,
        role: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
struct SourceEntry {
    title: Option<String>,
    name: Option<String>,
    path: Option<String>,
    web: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TemporalEntry {
    start: Option<String>,
    end: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceEntry {
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    path: Option<PathEntry>,
    #[serde(default, deserialize_with = "lenient")]
    url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    format: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    mediatype: Option<String>,
    bytes: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    encoding: Option<String>,
    schema: Option<Value>,
    data: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    created: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    last_modified: Option<String>,
}

/// A resource path is a single string or a list of chunk paths.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PathEntry {
    One(String),
    Many(Vec<String>),
}

impl PathEntry {
    fn first(&self) -> Option<&str> {
        match self {
            PathEntry::One(path) => Some(path),
            PathEntry::Many(paths) => paths.first().map(String::as_str),
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Syntax of a descriptor document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptorSyntax {
    Json,
    Yaml,
}

impl DescriptorSyntax {
    /// Guesses the syntax from a file name or URL path.
    pub fn from_path(path: &str) -> Self {
        let lower = path.to_ascii_lowercase();
        if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            DescriptorSyntax::Yaml
        } else {
            DescriptorSyntax::Json
        }
    }
}

/// A parsed data package descriptor.
#[derive(Debug)]
pub struct Datapackage {
    descriptor: Descriptor,
    base_url: Option<url::Url>,
}

/// Parses a descriptor document into its raw JSON form.
///
/// The document must be an object.
pub fn parse_descriptor(
    body: &str,
    syntax: DescriptorSyntax,
    origin_url: &str,
) -> Result<Value, DataKittenError> {
    let value = match syntax {
        DescriptorSyntax::Json => serde_json::from_str::<Value>(body).map_err(|e| e.to_string()),
        DescriptorSyntax::Yaml => serde_yaml::from_str::<Value>(body).map_err(|e| e.to_string()),
    }
    .map_err(|message| DataKittenError::DescriptorParse {
        url: origin_url.to_string(),
        message,
    })?;

    if !value.is_object() {
        return Err(DataKittenError::DescriptorParse {
            url: origin_url.to_string(),
            message: "descriptor is not an object".to_string(),
        });
    }
    Ok(value)
}

/// Fuzz-only entrypoint for YAML descriptor parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_yaml_descriptor(input: &str) -> Result<(), DataKittenError> {
    let value = parse_descriptor(input, DescriptorSyntax::Yaml, "<fuzz>")?;
    let package = Datapackage::from_value(&value, Some("https://example.org/datapackage.yaml"))?;
    let _ = package.distributions();
    Ok(())
}

impl Datapackage {
    /// Builds a data package from a parsed descriptor.
    ///
    /// `descriptor_url` is used to resolve relative resource paths.
    pub fn from_value(value: &Value, descriptor_url: Option<&str>) -> Result<Self, DataKittenError> {
        let url_label = descriptor_url.unwrap_or("<inline>").to_string();
        let descriptor = Descriptor::deserialize(value).map_err(|source| {
            DataKittenError::DescriptorParse {
                url: url_label,
                message: source.to_string(),
            }
        })?;
        Ok(Self {
            descriptor,
            base_url: descriptor_url.and_then(|url| url::Url::parse(url).ok()),
        })
    }

    /// Parses a JSON descriptor held in memory.
    pub fn from_json_str(body: &str) -> Result<Self, DataKittenError> {
        let value = parse_descriptor(body, DescriptorSyntax::Json, "<inline>")?;
        Self::from_value(&value, None)
    }

    /// Parses a JSON descriptor from raw bytes.
    ///
    /// Useful for fuzzing without requiring UTF-8 upfront.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, DataKittenError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|source| DataKittenError::DescriptorParse {
                url: "<inline>".to_string(),
                message: source.to_string(),
            })?;
        if !value.is_object() {
            return Err(DataKittenError::DescriptorParse {
                url: "<inline>".to_string(),
                message: "descriptor is not an object".to_string(),
            });
        }
        Self::from_value(&value, None)
    }

    /// Declared package version.
    pub fn version(&self) -> Option<&str> {
        self.descriptor.version.as_deref()
    }

    fn resolve(&self, path: &str) -> Option<String> {
        if url::Url::parse(path).is_ok() {
            return Some(path.to_string());
        }
        self.base_url
            .as_ref()
            .and_then(|base| base.join(path).ok())
            .map(|url| url.to_string())
    }

    fn agents_with_role(&self, role: &str) -> Vec<Agent> {
        self.descriptor
            .contributors
            .iter()
            .flatten()
            .map(AgentEntry::to_agent)
            .filter(|agent| {
                agent
                    .role
                    .as_deref()
                    .map(|value| value.eq_ignore_ascii_case(role))
                    .unwrap_or(false)
            })
            .collect()
    }
}

impl LicenseEntry {
    fn to_license(&self) -> License {
        match self {
            LicenseEntry::Text(id) => License::from_id(id.trim()),
            LicenseEntry::Object {
                name,
                id,
                kind,
                title,
                path,
                url,
            } => {
                let id = name.clone().or_else(|| id.clone()).or_else(|| kind.clone());
                License {
                    abbr: id.clone(),
                    id,
                    name: title.clone(),
                    uri: path.clone().or_else(|| url.clone()),
                }
            }
        }
    }
}

impl AgentEntry {
    fn to_agent(&self) -> Agent {
        match self {
            AgentEntry::Text(text) => parse_person(text),
            AgentEntry::Object {
                name,
                title,
                email,
                path,
                web,
                url,
                role,
            } => Agent {
                name: title.clone().or_else(|| name.clone()),
                email: email.clone(),
                homepage: path.clone().or_else(|| web.clone()).or_else(|| url.clone()),
                role: role.clone(),
            },
        }
    }
}

/// Parses the npm-style person shorthand `Name <email> (url)`.
pub fn parse_person(text: &str) -> Agent {
    let mut rest = text.trim().to_string();
    let mut email = None;
    let mut homepage = None;

    if let (Some(open), Some(close)) = (rest.find('('), rest.rfind(')')) {
        if open < close {
            homepage = Some(rest[open + 1..close].trim().to_string());
            rest.replace_range(open..=close, "");
        }
    }
    if let (Some(open), Some(close)) = (rest.find('<'), rest.rfind('>')) {
        if open < close {
            email = Some(rest[open + 1..close].trim().to_string());
            rest.replace_range(open..=close, "");
        }
    }

    let name = rest.trim();
    Agent {
        name: (!name.is_empty()).then(|| name.to_string()),
        email: email.filter(|value| !value.is_empty()),
        homepage: homepage.filter(|value| !value.is_empty()),
        role: None,
    }
}

impl MetadataAdapter for Datapackage {
    fn identifier(&self) -> Option<String> {
        self.descriptor
            .name
            .clone()
            .or_else(|| self.descriptor.id.clone())
    }

    fn data_title(&self) -> Option<String> {
        self.descriptor.title.clone()
    }

    fn description(&self) -> Option<String> {
        self.descriptor.description.clone()
    }

    fn keywords(&self) -> Vec<String> {
        self.descriptor.keywords.clone().unwrap_or_default()
    }

    fn documentation_url(&self) -> Option<String> {
        self.descriptor.homepage.clone()
    }

    fn release_type(&self) -> Option<ReleaseType> {
        let has_data = self.descriptor.resources.iter().flatten().any(|resource| {
            resource.path.is_some() || resource.url.is_some() || resource.data.is_some()
        });
        has_data.then_some(ReleaseType::OneOff)
    }

    fn issued(&self) -> Option<NaiveDate> {
        self.descriptor.created.as_deref().and_then(parse_date)
    }

    fn modified(&self) -> Option<NaiveDate> {
        self.descriptor
            .last_modified
            .as_deref()
            .or(self.descriptor.modified.as_deref())
            .and_then(parse_date)
    }

    fn landing_page(&self) -> Option<String> {
        self.descriptor.homepage.clone()
    }

    fn temporal(&self) -> Option<Temporal> {
        let entry = self.descriptor.temporal.as_ref()?;
        Temporal {
            start: entry.start.as_deref().and_then(parse_date),
            end: entry.end.as_deref().and_then(parse_date),
        }
        .non_empty()
    }

    fn sources(&self) -> Vec<Source> {
        self.descriptor
            .sources
            .iter()
            .flatten()
            .map(|source| Source {
                label: source.title.clone().or_else(|| source.name.clone()),
                resource: source.path.clone().or_else(|| source.web.clone()),
                email: source.email.clone(),
            })
            .collect()
    }

    fn maintainers(&self) -> Vec<Agent> {
        let mut agents: Vec<Agent> = self
            .descriptor
            .maintainers
            .iter()
            .flatten()
            .map(AgentEntry::to_agent)
            .collect();
        agents.extend(self.agents_with_role("maintainer"));
        agents
    }

    fn publishers(&self) -> Vec<Agent> {
        let mut agents: Vec<Agent> = self
            .descriptor
            .publishers
            .iter()
            .flatten()
            .map(AgentEntry::to_agent)
            .collect();
        agents.extend(self.agents_with_role("publisher"));
        if agents.is_empty() {
            if let Some(author) = &self.descriptor.author {
                agents.push(author.to_agent());
            }
        }
        agents
    }

    fn licenses(&self) -> Vec<License> {
        match (&self.descriptor.licenses, &self.descriptor.license) {
            (Some(licenses), _) if !licenses.is_empty() => {
                licenses.iter().map(LicenseEntry::to_license).collect()
            }
            (_, Some(license)) => vec![license.to_license()],
            _ => Vec::new(),
        }
    }

    fn rights(&self) -> Option<Rights> {
        self.descriptor.rights.clone()
    }

    fn contributors(&self) -> Vec<Agent> {
        self.descriptor
            .contributors
            .iter()
            .flatten()
            .map(AgentEntry::to_agent)
            .collect()
    }

    fn language(&self) -> Option<String> {
        self.descriptor.language.clone()
    }

    fn theme(&self) -> Option<String> {
        self.descriptor.theme.clone()
    }

    fn distributions(&self) -> Vec<Distribution> {
        self.descriptor
            .resources
            .iter()
            .flatten()
            .map(|resource| {
                let path = resource
                    .path
                    .as_ref()
                    .and_then(PathEntry::first)
                    .map(str::to_string)
                    .or_else(|| resource.url.clone());
                let download_url = path.as_deref().and_then(|path| self.resolve(path));
                Distribution {
                    title: resource.title.clone().or_else(|| resource.name.clone()),
                    description: resource.description.clone(),
                    access_url: download_url.clone(),
                    download_url,
                    path,
                    format: resource.format.clone(),
                    media_type: resource.mediatype.clone(),
                    byte_size: size_field(resource.bytes.as_ref()),
                    encoding: resource.encoding.clone(),
                    issued: resource.created.as_deref().and_then(parse_date),
                    modified: resource.last_modified.as_deref().and_then(parse_date),
                    schema: resource.schema.clone(),
                }
            })
            .collect()
    }

    fn update_frequency(&self) -> Option<String> {
        self.descriptor.update_frequency.clone()
    }

    fn spatial(&self) -> Option<Value> {
        self.descriptor.spatial.clone()
    }
}

// ============================================================================
// Detection
// ============================================================================

/// Candidate descriptor URLs for the dataset, in lookup order.
pub fn candidate_urls(context: &DetectionContext<'_>) -> Vec<String> {
    match context.origin {
        Some(Origin::Git) => match context.host {
            Some((host, repo)) => DESCRIPTOR_FILES
                .iter()
                .map(|file| host.raw_file_url(repo, file))
                .collect(),
            None => Vec::new(),
        },
        Some(Origin::Web) => {
            let access_url = context.resource.url();
            let Some(parsed) = context.resource.parsed_url() else {
                return Vec::new();
            };
            let path = parsed.path().to_ascii_lowercase();
            if path.ends_with("datapackage.json")
                || path.ends_with("datapackage.yaml")
                || path.ends_with("datapackage.yml")
            {
                return vec![access_url.to_string()];
            }

            let mut directory = parsed;
            if !directory.path().ends_with('/') {
                let with_slash = format!("{}/", directory.path());
                directory.set_path(&with_slash);
            }
            directory.set_query(None);
            directory.set_fragment(None);
            directory
                .join(DESCRIPTOR_FILES[0])
                .map(|url| vec![url.to_string()])
                .unwrap_or_default()
        }
        None => Vec::new(),
    }
}

/// Locates, fetches and parses the descriptor.
pub fn detect(context: &DetectionContext<'_>) -> Option<DetectedFormat> {
    candidate_urls(context).into_iter().find_map(|candidate| {
        trace!(url = %candidate, "datapackage candidate");
        let body = fetch_candidate(context, &candidate)?;
        let syntax = DescriptorSyntax::from_path(&candidate);
        let parsed = parse_descriptor(&body, syntax, &candidate)
            .and_then(|value| {
                Datapackage::from_value(&value, Some(candidate.as_str())).map(|dp| (value, dp))
            });
        match parsed {
            Ok((metadata, datapackage)) => Some(DetectedFormat {
                format: PublishingFormat::Datapackage,
                metadata,
                adapter: Box::new(datapackage),
            }),
            Err(error) => {
                debug!(%error, "datapackage descriptor rejected");
                None
            }
        }
    })
}

fn fetch_candidate(context: &DetectionContext<'_>, candidate: &str) -> Option<String> {
    if candidate == context.resource.url() {
        return context.resource.body().map(str::to_string);
    }
    match context
        .resource
        .fetcher()
        .fetch(candidate)
        .and_then(|response| response.into_body(candidate))
    {
        Ok(body) => Some(body),
        Err(error) => {
            debug!(url = candidate, %error, "no descriptor");
            None
        }
    }
}
