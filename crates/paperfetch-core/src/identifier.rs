//! Paper identifiers and the endpoint paths they select.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing arXiv version suffix, e.g. the `v2` in `1805.09547v2`.
static VERSION_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"v\d+$").unwrap());

/// A paper identifier in one of two disjoint id spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PaperIdentifier {
    /// An arXiv id, already stripped of its version suffix.
    Arxiv(String),
    /// Semantic Scholar's own paper id.
    SemanticScholar(String),
}

impl PaperIdentifier {
    /// Build an arXiv identifier, normalizing away any version suffix.
    pub fn arxiv(id: &str) -> Self {
        PaperIdentifier::Arxiv(trim_version(id.trim()).to_string())
    }

    pub fn semantic_scholar(id: &str) -> Self {
        PaperIdentifier::SemanticScholar(id.trim().to_string())
    }

    /// Path of the REST lookup for this identifier, relative to the API host.
    pub fn api_path(&self) -> String {
        match self {
            PaperIdentifier::Arxiv(id) => format!("/v1/paper/arXiv:{}", id),
            PaperIdentifier::SemanticScholar(id) => format!("/v1/paper/{}", id),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PaperIdentifier::Arxiv(id) | PaperIdentifier::SemanticScholar(id) => id,
        }
    }
}

impl fmt::Display for PaperIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaperIdentifier::Arxiv(id) => write!(f, "arXiv:{}", id),
            PaperIdentifier::SemanticScholar(id) => write!(f, "S2:{}", id),
        }
    }
}

/// Strip a trailing `v<digits>` version suffix from an arXiv id.
///
/// Idempotent: an id without a suffix is returned unchanged.
pub fn trim_version(arxiv_id: &str) -> &str {
    match VERSION_SUFFIX_RE.find(arxiv_id) {
        Some(m) => &arxiv_id[..m.start()],
        None => arxiv_id,
    }
}

/// Abstract-page URL for an arXiv id, or `None` when the id is absent or blank.
pub fn arxiv_abs_url(base: &str, arxiv_id: Option<&str>) -> Option<String> {
    arxiv_id
        .filter(|id| !id.trim().is_empty())
        .map(|id| format!("{}/{}", base.trim_end_matches('/'), id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_version_suffix() {
        assert_eq!(trim_version("1805.09547v2"), "1805.09547");
        assert_eq!(trim_version("1805.09547v13"), "1805.09547");
    }

    #[test]
    fn trim_is_idempotent() {
        let once = trim_version("1805.09547v2");
        assert_eq!(trim_version(once), once);
        assert_eq!(trim_version("1805.09547"), "1805.09547");
    }

    #[test]
    fn trim_old_style_ids() {
        assert_eq!(trim_version("hep-th/9901001v1"), "hep-th/9901001");
        // A bare "v" without digits is part of the id.
        assert_eq!(trim_version("math.AGv"), "math.AGv");
    }

    #[test]
    fn api_paths_follow_the_tag() {
        assert_eq!(
            PaperIdentifier::arxiv("1805.09547v1").api_path(),
            "/v1/paper/arXiv:1805.09547"
        );
        assert_eq!(
            PaperIdentifier::semantic_scholar("d0d084fb94c54a9d7cb468cacb6f69d257d3ca49").api_path(),
            "/v1/paper/d0d084fb94c54a9d7cb468cacb6f69d257d3ca49"
        );
    }

    #[test]
    fn id_spaces_are_disjoint() {
        assert_ne!(
            PaperIdentifier::arxiv("1805.09547"),
            PaperIdentifier::semantic_scholar("1805.09547")
        );
    }

    #[test]
    fn arxiv_url_only_when_present() {
        assert_eq!(
            arxiv_abs_url("https://arxiv.org/abs", Some("1805.09547")).as_deref(),
            Some("https://arxiv.org/abs/1805.09547")
        );
        assert_eq!(arxiv_abs_url("https://arxiv.org/abs", Some("")), None);
        assert_eq!(arxiv_abs_url("https://arxiv.org/abs", None), None);
    }
}
