use regex::Regex;
use std::sync::OnceLock;

use crate::error::{CINotifyError, Result};

const REVISION_PATTERN: &str =
    r"^https://([^/\s]+)/([^/\s]+)/([^/\s]+)/commit/([A-Fa-f0-9]+)(?:[/?#]\S*)?$";

/// A commit located by its web URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRef {
    pub host: String,
    pub owner: String,
    pub repo: String,
    pub sha: String,
}

fn revision_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(REVISION_PATTERN).expect("revision pattern is valid"))
}

/// Parses `https://<host>/<owner>/<repo>/commit/<hex-sha>`.
///
/// # Errors
///
/// Returns [`CINotifyError::Parse`] if the URL does not match.
pub fn parse_revision_uri(revision_url: &str) -> Result<RevisionRef> {
    let caps = revision_regex().captures(revision_url).ok_or_else(|| {
        CINotifyError::Parse(format!(
            "Failed to parse commit '{revision_url}' against pattern: {REVISION_PATTERN}"
        ))
    })?;

    Ok(RevisionRef {
        host: caps[1].to_string(),
        owner: caps[2].to_string(),
        repo: caps[3].to_string(),
        sha: caps[4].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_revision_uri() {
        let rev =
            parse_revision_uri("https://github.com/my-repo/my-project/commit/a1b2c3d4e5f6").unwrap();

        assert_eq!(rev.host, "github.com");
        assert_eq!(rev.owner, "my-repo");
        assert_eq!(rev.repo, "my-project");
        assert_eq!(rev.sha, "a1b2c3d4e5f6");
    }

    #[test]
    fn test_parse_enterprise_host() {
        let rev =
            parse_revision_uri("https://git.example.com/platform/api/commit/ABCDEF0123").unwrap();
        assert_eq!(rev.host, "git.example.com");
        assert_eq!(rev.sha, "ABCDEF0123");
    }

    #[test]
    fn test_parse_with_trailing_fragment() {
        let rev = parse_revision_uri("https://github.com/acme/api/commit/a1b2c3#diff").unwrap();
        assert_eq!(rev.sha, "a1b2c3");
    }

    #[test]
    fn test_non_matching_urls() {
        for url in [
            "not a url",
            "http://github.com/acme/api/commit/a1b2c3",
            "https://github.com/acme/commit/a1b2c3",
            "https://github.com/acme/api/commit/not-hex",
            "https://github.com/acme/api/tree/main",
            "",
        ] {
            let result = parse_revision_uri(url);
            assert!(
                matches!(result, Err(CINotifyError::Parse(_))),
                "expected parse error for '{url}'"
            );
        }
    }
}
