use std::cell::OnceCell;
use std::sync::Arc;

use serde_json::Value;

use super::{HostEnrichment, RepoRef};
use crate::fetcher::{fetch_json, Fetcher};
use crate::model::ChangeEntry;

const GITHUB_API: &str = "https://api.github.com";

/// Best-effort enrichment from the GitHub REST API.
///
/// Nothing is fetched until an accessor asks for it; the repository
/// document and the commit list are each fetched at most once.
pub struct GitHubRepository {
    repo: RepoRef,
    fetcher: Arc<dyn Fetcher>,
    info: OnceCell<Option<Value>>,
    commits: OnceCell<Vec<ChangeEntry>>,
}

impl GitHubRepository {
    pub fn new(repo: RepoRef, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            repo,
            fetcher,
            info: OnceCell::new(),
            commits: OnceCell::new(),
        }
    }

    /// URL of the repository document.
    pub fn api_url(&self) -> String {
        format!("{GITHUB_API}/repos/{}/{}", self.repo.owner, self.repo.name)
    }

    /// URL of the commit list.
    pub fn commits_url(&self) -> String {
        format!("{}/commits", self.api_url())
    }

    fn info(&self) -> Option<&Value> {
        self.info
            .get_or_init(|| fetch_json(self.fetcher.as_ref(), &self.api_url()))
            .as_ref()
    }

    fn info_str(&self, key: &str) -> Option<String> {
        self.info()
            .and_then(|info| info.get(key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

impl HostEnrichment for GitHubRepository {
    fn title(&self) -> Option<String> {
        self.info_str("name")
    }

    fn description(&self) -> Option<String> {
        self.info_str("description")
    }

    fn keywords(&self) -> Vec<String> {
        self.info()
            .and_then(|info| info.get("topics"))
            .and_then(Value::as_array)
            .map(|topics| {
                topics
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn landing_page(&self) -> Option<String> {
        self.info_str("homepage")
            .or_else(|| self.info_str("html_url"))
    }

    fn change_history(&self) -> Vec<ChangeEntry> {
        self.commits
            .get_or_init(|| {
                fetch_json(self.fetcher.as_ref(), &self.commits_url())
                    .as_ref()
                    .map(extract_commits)
                    .unwrap_or_default()
            })
            .clone()
    }
}

fn extract_commits(commits_json: &Value) -> Vec<ChangeEntry> {
    let Some(items) = commits_json.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| {
            let commit = item.get("commit");
            let author = commit.and_then(|commit| commit.get("author"));
            ChangeEntry {
                id: item.get("sha").and_then(Value::as_str).map(str::to_string),
                message: commit
                    .and_then(|commit| commit.get("message"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                author: author
                    .and_then(|author| author.get("name"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                timestamp: author
                    .and_then(|author| author.get("date"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::StaticFetcher;

    fn repo() -> RepoRef {
        RepoRef {
            host: "github.com".to_string(),
            owner: "theodi".to_string(),
            name: "survey".to_string(),
        }
    }

    #[test]
    fn repository_fields_are_extracted_once() {
        let fetcher = Arc::new(StaticFetcher::new().with_body(
            "https://api.github.com/repos/theodi/survey",
            r#"{"name": "survey", "description": "  A survey  ", "homepage": "",
                "html_url": "https://github.com/theodi/survey", "topics": ["open-data"]}"#,
        ));
        let github = GitHubRepository::new(repo(), fetcher.clone());

        assert_eq!(github.title().as_deref(), Some("survey"));
        assert_eq!(github.description().as_deref(), Some("A survey"));
        assert_eq!(
            github.landing_page().as_deref(),
            Some("https://github.com/theodi/survey")
        );
        assert_eq!(github.keywords(), vec!["open-data".to_string()]);
        assert_eq!(fetcher.calls("https://api.github.com/repos/theodi/survey"), 1);
    }

    #[test]
    fn missing_repository_yields_defaults() {
        let github = GitHubRepository::new(repo(), Arc::new(StaticFetcher::new()));
        assert_eq!(github.title(), None);
        assert!(github.keywords().is_empty());
        assert!(github.change_history().is_empty());
    }

    #[test]
    fn commits_become_change_entries() {
        let commits = serde_json::json!([
            {
                "sha": "abc123",
                "commit": {
                    "message": "Add data",
                    "author": {"name": "Ada", "date": "2014-03-01T10:00:00Z"}
                }
            },
            {"sha": "def456"}
        ]);

        let entries = extract_commits(&commits);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id.as_deref(), Some("abc123"));
        assert_eq!(entries[0].message.as_deref(), Some("Add data"));
        assert_eq!(entries[0].author.as_deref(), Some("Ada"));
        assert_eq!(entries[1].message, None);
    }
}
