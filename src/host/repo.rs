use crate::error::DataKittenError;
use crate::origin::is_scp_like;

/// Coordinates of a repository on a forge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoRef {
    /// Lowercased host name, without a leading `www.`.
    pub host: String,
    /// Owner path; nested groups are joined with `/`.
    pub owner: String,
    /// Repository name without a `.git` suffix.
    pub name: String,
}

impl RepoRef {
    /// `owner/name`.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Parse a git address (https, git, ssh or scp-like) into repository
/// coordinates.
pub fn parse_repo_ref(input: &str) -> Result<RepoRef, DataKittenError> {
    let trimmed = input.trim();
    let (host, path) = if is_scp_like(trimmed) {
        split_scp_like(trimmed)
    } else {
        let url = url::Url::parse(trimmed).map_err(|source| DataKittenError::InvalidUrl {
            input: input.to_string(),
            source,
        })?;
        let host = url
            .host_str()
            .ok_or_else(|| DataKittenError::DescriptorParse {
                url: input.to_string(),
                message: "repository address is missing a host".to_string(),
            })?
            .to_string();
        (host, url.path().to_string())
    };

    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();

    let segments: Vec<&str> = path.split('/').filter(|seg| !seg.is_empty()).collect();
    let Some((last, owner_segments)) = segments.split_last() else {
        return Err(repo_shape_error(input));
    };
    if owner_segments.is_empty() {
        return Err(repo_shape_error(input));
    }

    let name = last.strip_suffix(".git").unwrap_or(last);
    if name.is_empty() {
        return Err(repo_shape_error(input));
    }

    Ok(RepoRef {
        host,
        owner: owner_segments.join("/"),
        name: name.to_string(),
    })
}

fn split_scp_like(address: &str) -> (String, String) {
    let (user_host, path) = address.split_once(':').unwrap_or((address, ""));
    let host = user_host
        .split_once('@')
        .map(|(_, host)| host)
        .unwrap_or(user_host);
    (host.to_string(), path.to_string())
}

fn repo_shape_error(input: &str) -> DataKittenError {
    DataKittenError::DescriptorParse {
        url: input.to_string(),
        message: "expected repository address like https://host/<owner>/<repo>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_https_address() {
        let repo = parse_repo_ref("https://github.com/theodi/dataset-metadata-survey.git")
            .expect("parse");
        assert_eq!(repo.host, "github.com");
        assert_eq!(repo.owner, "theodi");
        assert_eq!(repo.name, "dataset-metadata-survey");
        assert_eq!(repo.slug(), "theodi/dataset-metadata-survey");
    }

    #[test]
    fn parse_git_scheme_and_www_host() {
        let repo = parse_repo_ref("git://www.GitHub.com/theodi/survey.git").expect("parse");
        assert_eq!(repo.host, "github.com");
        assert_eq!(repo.slug(), "theodi/survey");
    }

    #[test]
    fn parse_scp_like_address() {
        let repo = parse_repo_ref("git@gitlab.com:group/sub/project.git").expect("parse");
        assert_eq!(repo.host, "gitlab.com");
        assert_eq!(repo.owner, "group/sub");
        assert_eq!(repo.name, "project");
    }

    #[test]
    fn single_segment_is_error() {
        let err = parse_repo_ref("https://github.com/theodi").expect_err("should fail");
        match err {
            DataKittenError::DescriptorParse { message, .. } => {
                assert!(message.contains("expected repository address"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_url_is_error() {
        let err = parse_repo_ref("::nonsense").expect_err("should fail");
        assert!(matches!(err, DataKittenError::InvalidUrl { .. }));
    }
}
