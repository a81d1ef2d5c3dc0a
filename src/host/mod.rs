//! Host detection and host-specific enrichment.
//!
//! A host can only be identified inside a known origin. Today only git
//! repositories are matched against forge hosts. Hosts contribute two
//! things: a raw-content URL scheme, used to locate descriptor files without
//! cloning, and optional API enrichment (see [`HostEnrichment`]).

pub mod github;
pub mod repo;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

pub use github::GitHubRepository;
pub use repo::{parse_repo_ref, RepoRef};

use crate::fetcher::Fetcher;
use crate::model::ChangeEntry;
use crate::origin::Origin;

/// A specific hosting platform layered on top of an origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Host {
    GitHub,
    GitLab,
    Bitbucket,
}

impl Host {
    /// All hosts in detection priority order.
    pub const ALL: [Host; 3] = [Host::GitHub, Host::GitLab, Host::Bitbucket];

    /// Stable lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Host::GitHub => "github",
            Host::GitLab => "gitlab",
            Host::Bitbucket => "bitbucket",
        }
    }

    /// The canonical host name of the forge.
    pub fn domain(&self) -> &'static str {
        match self {
            Host::GitHub => "github.com",
            Host::GitLab => "gitlab.com",
            Host::Bitbucket => "bitbucket.org",
        }
    }

    /// Which origins this host can appear under.
    pub fn serves(&self, origin: Origin) -> bool {
        match self {
            Host::GitHub | Host::GitLab | Host::Bitbucket => origin == Origin::Git,
        }
    }

    /// URL of `path` at the default branch, served as raw content.
    pub fn raw_file_url(&self, repo: &RepoRef, path: &str) -> String {
        let path = path.trim_start_matches('/');
        match self {
            Host::GitHub => format!(
                "https://raw.githubusercontent.com/{}/{}/HEAD/{}",
                repo.owner, repo.name, path
            ),
            Host::GitLab => format!(
                "https://gitlab.com/{}/{}/-/raw/HEAD/{}",
                repo.owner, repo.name, path
            ),
            Host::Bitbucket => format!(
                "https://bitbucket.org/{}/{}/raw/HEAD/{}",
                repo.owner, repo.name, path
            ),
        }
    }

    /// Builds the API enrichment for this host, if it has one.
    pub fn enrichment(
        &self,
        repo: &RepoRef,
        fetcher: Arc<dyn Fetcher>,
    ) -> Option<Box<dyn HostEnrichment>> {
        match self {
            Host::GitHub => Some(Box::new(GitHubRepository::new(repo.clone(), fetcher))),
            Host::GitLab | Host::Bitbucket => None,
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifies the host of `access_url` within `origin`.
///
/// Returns the host together with the parsed repository coordinates.
pub fn detect_host(origin: Option<Origin>, access_url: &str) -> Option<(Host, RepoRef)> {
    let origin = origin?;
    let repo = match parse_repo_ref(access_url) {
        Ok(repo) => repo,
        Err(error) => {
            debug!(url = access_url, %error, "no repository coordinates");
            return None;
        }
    };
    let host = Host::ALL
        .into_iter()
        .filter(|host| host.serves(origin))
        .find(|host| host.domain() == repo.host)?;
    debug!(url = access_url, %host, repo = %repo.slug(), "host detection");
    Some((host, repo))
}

/// Metadata a host can supply from its own API.
///
/// Every method has an empty default. Implementations fetch lazily and
/// cache what they fetched.
pub trait HostEnrichment {
    fn title(&self) -> Option<String> {
        None
    }

    fn description(&self) -> Option<String> {
        None
    }

    fn keywords(&self) -> Vec<String> {
        Vec::new()
    }

    fn landing_page(&self) -> Option<String> {
        None
    }

    fn change_history(&self) -> Vec<ChangeEntry> {
        Vec::new()
    }
}
