//! Repository identity extraction and page-type exclusion.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::ResolveError;

/// Host whose repository pages are recognised by default.
pub const DEFAULT_HOST: &str = "github.com";

/// Sub-path segments that mark non-overview repository pages.
pub const DEFAULT_EXCLUDED_SEGMENTS: &[&str] = &[
    "issues", "pull", "pulls", "actions", "settings", "wiki", "releases", "packages",
];

/// `owner/repo` pair identifying a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// `owner/repo`, the key both sources are queried with.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Decides whether a page URL should be resolved, and for which repository.
#[derive(Debug, Clone)]
pub struct PageFilter {
    host: String,
    excluded: Vec<String>,
    pattern: Option<Regex>,
}

impl Default for PageFilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_HOST,
            DEFAULT_EXCLUDED_SEGMENTS.iter().map(|s| s.to_string()),
        )
    }
}

impl PageFilter {
    pub fn new(host: &str, excluded: impl IntoIterator<Item = String>) -> Self {
        let pattern = Regex::new(&format!(r"(?i:{})/([^/]+)/([^/]+)", regex::escape(host))).ok();
        Self {
            host: host.to_string(),
            excluded: excluded.into_iter().collect(),
            pattern,
        }
    }

    /// Replace the excluded segment set.
    pub fn with_excluded(mut self, excluded: impl IntoIterator<Item = String>) -> Self {
        self.excluded = excluded.into_iter().collect();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    /// Extract the repository a page URL points at.
    ///
    /// The repo name is cut at the first `?` or `#`.
    pub fn repo_from_url(&self, url: &str) -> Option<RepoId> {
        let caps = self.pattern.as_ref()?.captures(url)?;
        let owner = caps.get(1)?.as_str();
        let repo = cut_query(caps.get(2)?.as_str());
        if owner.contains(['?', '#']) || repo.is_empty() {
            return None;
        }
        Some(RepoId::new(owner, repo))
    }

    /// Classify a page URL: the repository to resolve, or the reason to skip.
    pub fn classify(&self, url: &str) -> Result<RepoId, ResolveError> {
        let pattern = self.pattern.as_ref().ok_or(ResolveError::NoRepository)?;
        let caps = pattern.captures(url).ok_or(ResolveError::NoRepository)?;
        let repo = self.repo_from_url(url).ok_or(ResolveError::NoRepository)?;

        // Anything after a query or fragment in the repo segment is not path.
        let raw_repo = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        if raw_repo.contains(['?', '#']) {
            return Ok(repo);
        }

        let rest = caps.get(0).map(|m| &url[m.end()..]).unwrap_or_default();
        let hit = cut_query(rest)
            .split('/')
            .filter(|segment| !segment.is_empty())
            .find(|segment| self.excluded.iter().any(|ex| ex == segment));
        match hit {
            Some(segment) => Err(ResolveError::ExcludedPage {
                segment: segment.to_string(),
            }),
            None => Ok(repo),
        }
    }
}

fn cut_query(s: &str) -> &str {
    s.split(['?', '#']).next().unwrap_or_default()
}
