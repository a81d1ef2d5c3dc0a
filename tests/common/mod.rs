#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use datakitten::fetcher::{Fetcher, StaticFetcher};
use datakitten::Dataset;

pub const REPO_URL: &str = "git://github.com/theodi/dataset-metadata-survey.git";
pub const RAW_DATAPACKAGE: &str =
    "https://raw.githubusercontent.com/theodi/dataset-metadata-survey/HEAD/datapackage.json";
pub const RAW_DATAPACKAGE_YAML: &str =
    "https://raw.githubusercontent.com/theodi/dataset-metadata-survey/HEAD/datapackage.yaml";
pub const GITHUB_REPO_API: &str = "https://api.github.com/repos/theodi/dataset-metadata-survey";
pub const GITHUB_COMMITS_API: &str =
    "https://api.github.com/repos/theodi/dataset-metadata-survey/commits";

pub fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("read fixture {}: {e}", path.display()))
}

/// A fetcher serving the GitHub-hosted survey repository.
pub fn github_fetcher() -> StaticFetcher {
    StaticFetcher::new()
        .with_body(RAW_DATAPACKAGE, load_fixture("datapackage.json"))
        .with_body(GITHUB_REPO_API, load_fixture("github_repo.json"))
        .with_body(GITHUB_COMMITS_API, load_fixture("github_commits.json"))
}

pub fn load_with(url: &str, fetcher: StaticFetcher) -> (Dataset, Arc<StaticFetcher>) {
    let fetcher = Arc::new(fetcher);
    let shared: Arc<dyn Fetcher> = fetcher.clone();
    (Dataset::with_fetcher(url, shared), fetcher)
}
