//! Origin detection: what kind of system serves the dataset.

use std::fmt;

use tracing::debug;

use crate::fetcher::Resource;

/// Forges whose `https://host/owner/repo` URLs are treated as git
/// repositories even without a `.git` suffix.
pub(crate) const KNOWN_FORGES: [&str; 3] = ["github.com", "gitlab.com", "bitbucket.org"];

/// The storage or versioning system hosting the dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// A git repository.
    Git,
    /// A document addressed by an http(s) URL.
    Web,
}

impl Origin {
    /// All origins in detection priority order.
    pub const ALL: [Origin; 2] = [Origin::Git, Origin::Web];

    /// Stable lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Origin::Git => "git",
            Origin::Web => "web",
        }
    }

    /// Whether `resource` belongs to this origin.
    ///
    /// Both checks look at the address only. Reachability is left to the
    /// format detectors, so a failing landing page still counts as web.
    pub fn matches(&self, resource: &Resource) -> bool {
        match self {
            Origin::Git => is_git_address(resource.url()),
            Origin::Web => is_http_url(resource.url()),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies `resource`; the first origin in [`Origin::ALL`] that matches
/// wins.
pub fn detect_origin(resource: &Resource) -> Option<Origin> {
    let origin = Origin::ALL
        .into_iter()
        .find(|origin| origin.matches(resource));
    debug!(url = resource.url(), origin = ?origin, "origin detection");
    origin
}

/// True for addresses that name a git repository.
pub fn is_git_address(address: &str) -> bool {
    let address = address.trim();
    if is_scp_like(address) {
        return true;
    }

    let Ok(url) = url::Url::parse(address) else {
        return false;
    };

    match url.scheme() {
        "git" | "git+ssh" | "ssh" | "git+https" => true,
        "http" | "https" | "file" => {
            let path = url.path().trim_end_matches('/');
            if path.ends_with(".git") {
                return true;
            }
            let on_forge = url
                .host_str()
                .map(|host| {
                    let host = host.to_ascii_lowercase();
                    let host = host.strip_prefix("www.").unwrap_or(&host);
                    KNOWN_FORGES.contains(&host)
                })
                .unwrap_or(false);
            on_forge && path.split('/').filter(|seg| !seg.is_empty()).count() == 2
        }
        _ => false,
    }
}

/// Recognizes `user@host:owner/repo(.git)` addresses used by ssh remotes.
pub(crate) fn is_scp_like(address: &str) -> bool {
    if address.contains("://") {
        return false;
    }
    let Some((user_host, path)) = address.split_once(':') else {
        return false;
    };
    let Some((user, host)) = user_host.split_once('@') else {
        return false;
    };
    !user.is_empty() && !host.is_empty() && !path.is_empty() && !path.starts_with('/')
}

fn is_http_url(address: &str) -> bool {
    url::Url::parse(address)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}
