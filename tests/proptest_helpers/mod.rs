#![allow(dead_code)]

use datakitten::Dataset;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use serde_json::{json, Map, Value};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Addresses of every shape the detectors look at, plus noise.
pub fn arb_address() -> BoxedStrategy<String> {
    let segment = "[a-z0-9][a-z0-9._-]{0,11}";
    prop_oneof![
        (segment, segment).prop_map(|(owner, repo)| format!("https://github.com/{owner}/{repo}")),
        (segment, segment).prop_map(|(owner, repo)| format!("git://gitlab.com/{owner}/{repo}.git")),
        (segment, segment).prop_map(|(owner, repo)| format!("git@bitbucket.org:{owner}/{repo}.git")),
        (segment, segment).prop_map(|(host, path)| format!("https://{host}.example/{path}")),
        (segment, segment).prop_map(|(host, id)| format!("https://{host}.example/dataset/{id}")),
        ".{0,40}",
    ]
    .boxed()
}

/// A data package descriptor with a name, optional title and keywords,
/// and relative resource paths.
pub fn arb_descriptor() -> BoxedStrategy<Value> {
    (
        "[a-z][a-z0-9-]{0,15}",
        proptest::option::of("[A-Za-z ]{1,30}"),
        proptest::collection::vec("[a-z]{1,10}", 0..4),
        proptest::collection::vec("[a-z]{1,8}\\.csv", 0..5),
    )
        .prop_map(|(name, title, keywords, paths)| {
            let mut descriptor = Map::new();
            descriptor.insert("name".to_string(), json!(name));
            if let Some(title) = title {
                descriptor.insert("title".to_string(), json!(title));
            }
            descriptor.insert("keywords".to_string(), json!(keywords));
            let resources: Vec<Value> = paths.iter().map(|path| json!({"path": path})).collect();
            descriptor.insert("resources".to_string(), Value::Array(resources));
            Value::Object(descriptor)
        })
        .boxed()
}

/// Checks the facade's defaulting rules on any dataset.
pub fn assert_facade_consistent(dataset: &Dataset) -> Result<(), String> {
    if dataset.supported() && dataset.metadata().is_none() {
        return Err(format!("{} is supported without metadata", dataset.url()));
    }
    if dataset.supported() != (dataset.origin().is_some() && dataset.publishing_format().is_some())
    {
        return Err(format!("{}: supported disagrees with detection", dataset.url()));
    }
    if dataset.host().is_some() && dataset.origin().is_none() {
        return Err(format!("{} has a host without an origin", dataset.url()));
    }
    if dataset.files() != dataset.distributions() || dataset.resources() != dataset.distributions()
    {
        return Err(format!("{}: distribution aliases disagree", dataset.url()));
    }
    if dataset.release_date() != dataset.issued() {
        return Err(format!("{}: release_date disagrees with issued", dataset.url()));
    }
    if dataset.publishing_format().is_none()
        && !(dataset.licenses().is_empty()
            && dataset.maintainers().is_empty()
            && dataset.publishers().is_empty()
            && dataset.contributors().is_empty()
            && dataset.sources().is_empty()
            && dataset.distributions().is_empty())
    {
        return Err(format!("{}: lists filled without a format", dataset.url()));
    }
    Ok(())
}
